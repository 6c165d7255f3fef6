//! Modifier and key types for the pointer/keyboard API.

use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A key as reported by the host, reduced to what the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Character(char),
    Delete,
    Backspace,
    Escape,
    Other(String),
}

impl Key {
    /// Map a DOM-style key name (`"a"`, `"Delete"`, `"Escape"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" | "Del" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Other(name.to_string()),
                }
            }
        }
    }
}

/// What a key press asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    SetTool(ToolKind),
    Undo,
    Redo,
    DeleteSelection,
    CancelGesture,
}

/// Resolve a key press to an editor action.
pub fn shortcut_for(key: &Key, modifiers: Modifiers) -> Option<ShortcutAction> {
    match key {
        Key::Delete | Key::Backspace => Some(ShortcutAction::DeleteSelection),
        Key::Escape => Some(ShortcutAction::CancelGesture),
        Key::Character(c) if modifiers.command() => match c.to_ascii_lowercase() {
            'z' if modifiers.shift => Some(ShortcutAction::Redo),
            'z' => Some(ShortcutAction::Undo),
            'y' => Some(ShortcutAction::Redo),
            _ => None,
        },
        Key::Character(c) if !modifiers.alt => {
            ToolKind::from_shortcut(*c).map(ShortcutAction::SetTool)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("r"), Key::Character('r'));
        assert_eq!(Key::from_name("Delete"), Key::Delete);
        assert_eq!(Key::from_name("ArrowUp"), Key::Other("ArrowUp".to_string()));
    }

    #[test]
    fn test_tool_shortcuts_need_no_command() {
        let r = Key::Character('r');
        assert_eq!(
            shortcut_for(&r, Modifiers::NONE),
            Some(ShortcutAction::SetTool(ToolKind::Rectangle))
        );
        assert_eq!(shortcut_for(&r, Modifiers::CTRL), None);
    }

    #[test]
    fn test_undo_redo_shortcuts() {
        let z = Key::Character('z');
        let y = Key::Character('y');
        let ctrl_shift = Modifiers {
            shift: true,
            ..Modifiers::CTRL
        };
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(shortcut_for(&z, Modifiers::CTRL), Some(ShortcutAction::Undo));
        assert_eq!(shortcut_for(&z, meta), Some(ShortcutAction::Undo));
        assert_eq!(shortcut_for(&z, ctrl_shift), Some(ShortcutAction::Redo));
        assert_eq!(shortcut_for(&y, Modifiers::CTRL), Some(ShortcutAction::Redo));
        assert_eq!(shortcut_for(&z, Modifiers::NONE), None);
    }

    #[test]
    fn test_delete_keys() {
        assert_eq!(
            shortcut_for(&Key::Backspace, Modifiers::NONE),
            Some(ShortcutAction::DeleteSelection)
        );
        assert_eq!(
            shortcut_for(&Key::Escape, Modifiers::NONE),
            Some(ShortcutAction::CancelGesture)
        );
    }
}
