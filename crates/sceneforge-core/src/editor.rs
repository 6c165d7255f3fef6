//! Editor state, the command dispatcher and the pointer/keyboard API.
//!
//! [`Editor`] owns the document, viewport, tool state and history. Every
//! mutation goes through [`Editor::dispatch`]; the pointer and key handlers
//! translate gestures into commands.

use crate::camera::{Viewport, zoom_about};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::{EngineError, EngineResult};
use crate::history::History;
use crate::input::{Key, Modifiers, ShortcutAction, shortcut_for};
use crate::manipulation::{FlipAxis, Gesture, GestureKind, TransformOptions, flip_objects};
use crate::selection::{
    Handle, HandleKind, hit_test_handles, hit_test_point, objects_in_rect, selection_handles,
};
use crate::shapes::{
    CreationDefaults, ObjectId, ObjectKind, ObjectPatch, SceneObject, SerializableColor,
};
use crate::snap::snap_point;
use crate::tools::{DrawState, ToolKind};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Everything the rendering and persistence collaborators read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub document: Document,
    pub active_tool: ToolKind,
    pub viewport: Viewport,
    pub active_fill_color: SerializableColor,
    pub active_stroke_color: SerializableColor,
    pub active_stroke_width: f64,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub canvas_size: Size,
}

impl EditorState {
    fn new(config: &EditorConfig) -> Self {
        let defaults = CreationDefaults::default();
        Self {
            document: Document::new(),
            active_tool: ToolKind::default(),
            viewport: Viewport::with_bounds(config.min_zoom, config.max_zoom),
            active_fill_color: defaults.fill,
            active_stroke_color: defaults.stroke,
            active_stroke_width: defaults.stroke_width,
            show_grid: true,
            snap_to_grid: false,
            canvas_size: Size::new(config.canvas_width, config.canvas_height),
        }
    }

    fn creation_defaults(&self) -> CreationDefaults {
        CreationDefaults {
            fill: self.active_fill_color,
            stroke: self.active_stroke_color,
            stroke_width: self.active_stroke_width,
        }
    }
}

/// The closed set of state mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    AddObject {
        kind: ObjectKind,
        x: f64,
        y: f64,
        #[serde(default)]
        overrides: ObjectPatch,
    },
    UpdateObject {
        id: ObjectId,
        patch: ObjectPatch,
    },
    DeleteObjects {
        ids: Vec<ObjectId>,
    },
    ReorderObject {
        from: usize,
        to: usize,
    },
    SelectObjects {
        ids: Vec<ObjectId>,
    },
    ToggleSelection {
        id: ObjectId,
    },
    DuplicateObject {
        id: ObjectId,
    },
    BringToFront {
        id: ObjectId,
    },
    SendToBack {
        id: ObjectId,
    },
    BringForward {
        id: ObjectId,
    },
    SendBackward {
        id: ObjectId,
    },
    FlipSelection {
        axis: FlipAxis,
    },
    SetTool {
        tool: ToolKind,
    },
    SetViewport {
        #[serde(default)]
        zoom: Option<f64>,
        #[serde(default)]
        pan: Option<Vec2>,
    },
    ToggleGrid,
    ToggleSnap,
    /// Hex color string (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    SetActiveFillColor {
        color: String,
    },
    SetActiveStrokeColor {
        color: String,
    },
    SetActiveStrokeWidth {
        width: f64,
    },
    Undo,
    Redo,
    CommitSnapshot,
}

impl Command {
    /// Whether the command records a history snapshot when it changes something.
    pub fn commits_history(&self) -> bool {
        matches!(
            self,
            Command::AddObject { .. }
                | Command::DeleteObjects { .. }
                | Command::ReorderObject { .. }
                | Command::DuplicateObject { .. }
                | Command::BringToFront { .. }
                | Command::SendToBack { .. }
                | Command::BringForward { .. }
                | Command::SendBackward { .. }
                | Command::FlipSelection { .. }
                | Command::CommitSnapshot
        )
    }
}

/// What a dispatched command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A new object was added.
    Created(ObjectId),
    /// State changed.
    Applied,
    /// Nothing to do (stale id, empty history, no-op value).
    Unchanged,
}

/// Pointer interaction in progress.
#[derive(Debug, Clone)]
enum Interaction {
    Idle,
    /// Last pointer position in screen space.
    Panning { last: Point },
    /// Corners in screen space.
    Marquee { start: Point, current: Point },
    Drawing { draw: DrawState, preview: SceneObject },
    Transforming(Gesture),
}

/// The editor engine: an explicitly owned document/state core.
#[derive(Debug, Clone)]
pub struct Editor {
    state: EditorState,
    history: History,
    config: EditorConfig,
    interaction: Interaction,
    modifiers: Modifiers,
}

impl Default for Editor {
    fn default() -> Self {
        let config = EditorConfig::default();
        Self {
            state: EditorState::new(&config),
            history: History::new(Vec::new(), config.history_limit),
            config,
            interaction: Interaction::Idle,
            modifiers: Modifiers::NONE,
        }
    }
}

impl Editor {
    /// Create an editor with a validated configuration.
    pub fn new(config: EditorConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            state: EditorState::new(&config),
            history: History::new(Vec::new(), config.history_limit),
            config,
            interaction: Interaction::Idle,
            modifiers: Modifiers::NONE,
        })
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Objects back to front.
    pub fn objects(&self) -> &[SceneObject] {
        self.state.document.objects()
    }

    pub fn selected_ids(&self) -> &[ObjectId] {
        self.state.document.selected_ids()
    }

    /// Selected objects in z-order.
    pub fn selected_objects(&self) -> Vec<&SceneObject> {
        self.state.document.selected_objects()
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.state.document.get(id)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.state.viewport
    }

    pub fn active_tool(&self) -> ToolKind {
        self.state.active_tool
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The shape being drawn, if a shape tool drag is in progress.
    pub fn preview(&self) -> Option<&SceneObject> {
        match &self.interaction {
            Interaction::Drawing { preview, .. } => Some(preview),
            _ => None,
        }
    }

    /// The marquee rectangle in document space, if one is being dragged.
    pub fn marquee(&self) -> Option<Rect> {
        match self.interaction {
            Interaction::Marquee { start, current } => Some(Rect::from_points(
                self.state.viewport.screen_to_document(start),
                self.state.viewport.screen_to_document(current),
            )),
            _ => None,
        }
    }

    /// Transform handles for the current selection (document space).
    pub fn handles(&self) -> Vec<Handle> {
        selection_handles(&self.transformable_selection(), self.config.rotate_handle_offset)
    }

    /// Whether a pointer gesture is in progress.
    pub fn is_interacting(&self) -> bool {
        !matches!(self.interaction, Interaction::Idle)
    }

    fn transformable_selection(&self) -> Vec<&SceneObject> {
        self.state
            .document
            .selected_objects()
            .into_iter()
            .filter(|o| !o.locked)
            .collect()
    }

    fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            min_size: self.config.min_object_size,
            strategy: self.config.resize_strategy,
            snap_to_grid: self.state.snap_to_grid,
            grid_size: self.config.grid_size,
        }
    }

    fn commit(&mut self) {
        self.history.commit(self.state.document.snapshot());
    }

    /// Apply a command to the editor state.
    pub fn dispatch(&mut self, command: Command) -> EngineResult<DispatchOutcome> {
        log::debug!("Dispatch {:?}", command);
        // A running transform is finished before anything else is committed
        if command.commits_history() && matches!(self.interaction, Interaction::Transforming(_)) {
            self.pointer_up();
        }
        let outcome = match command {
            Command::AddObject { kind, x, y, overrides } => {
                let defaults = self.state.creation_defaults();
                let document = &mut self.state.document;
                let object = SceneObject::create(
                    kind,
                    Point::new(x, y),
                    document.next_ordinal(),
                    &defaults,
                    &overrides,
                );
                let id = document.add(object);
                self.commit();
                DispatchOutcome::Created(id)
            }
            Command::UpdateObject { id, patch } => changed(self.state.document.update(id, &patch)),
            Command::DeleteObjects { ids } => {
                if self.state.document.delete(&ids) > 0 {
                    self.commit();
                    DispatchOutcome::Applied
                } else {
                    DispatchOutcome::Unchanged
                }
            }
            Command::ReorderObject { from, to } => {
                self.state.document.reorder(from, to)?;
                if from == to {
                    DispatchOutcome::Unchanged
                } else {
                    self.commit();
                    DispatchOutcome::Applied
                }
            }
            Command::SelectObjects { ids } => {
                self.state.document.select(&ids);
                DispatchOutcome::Applied
            }
            Command::ToggleSelection { id } => {
                let document = &mut self.state.document;
                let before = document.selected_ids().len();
                document.toggle_selection(id);
                changed(before != document.selected_ids().len())
            }
            Command::DuplicateObject { id } => match self.state.document.duplicate(id) {
                Some(copy) => {
                    self.commit();
                    DispatchOutcome::Created(copy)
                }
                None => DispatchOutcome::Unchanged,
            },
            Command::BringToFront { id } => self.reordered(|d| d.bring_to_front(id)),
            Command::SendToBack { id } => self.reordered(|d| d.send_to_back(id)),
            Command::BringForward { id } => self.reordered(|d| d.bring_forward(id)),
            Command::SendBackward { id } => self.reordered(|d| d.send_backward(id)),
            Command::FlipSelection { axis } => {
                let flipped = flip_objects(&self.transformable_selection(), axis);
                if flipped.is_empty() {
                    DispatchOutcome::Unchanged
                } else {
                    for object in &flipped {
                        self.state
                            .document
                            .update(object.id(), &ObjectPatch::transform_of(object));
                    }
                    self.commit();
                    DispatchOutcome::Applied
                }
            }
            Command::SetTool { tool } => {
                if matches!(self.interaction, Interaction::Drawing { .. }) {
                    self.interaction = Interaction::Idle;
                }
                self.state.active_tool = tool;
                DispatchOutcome::Applied
            }
            Command::SetViewport { zoom, pan } => {
                let viewport = &mut self.state.viewport;
                if let Some(zoom) = zoom {
                    viewport.set_zoom(zoom);
                }
                if let Some(pan) = pan.filter(|p| p.is_finite()) {
                    viewport.pan = pan;
                }
                DispatchOutcome::Applied
            }
            Command::ToggleGrid => {
                self.state.show_grid = !self.state.show_grid;
                DispatchOutcome::Applied
            }
            Command::ToggleSnap => {
                self.state.snap_to_grid = !self.state.snap_to_grid;
                DispatchOutcome::Applied
            }
            Command::SetActiveFillColor { color } => {
                self.state.active_fill_color = SerializableColor::from_hex(&color)?;
                DispatchOutcome::Applied
            }
            Command::SetActiveStrokeColor { color } => {
                self.state.active_stroke_color = SerializableColor::from_hex(&color)?;
                DispatchOutcome::Applied
            }
            Command::SetActiveStrokeWidth { width } => {
                if !width.is_finite() {
                    return Err(EngineError::InvalidConfig(format!(
                        "stroke width must be finite, got {}",
                        width
                    )));
                }
                self.state.active_stroke_width = width.max(0.0);
                DispatchOutcome::Applied
            }
            Command::Undo => {
                self.abort_interaction();
                match self.history.undo() {
                    Some(snapshot) => {
                        self.state.document.restore(snapshot);
                        DispatchOutcome::Applied
                    }
                    None => DispatchOutcome::Unchanged,
                }
            }
            Command::Redo => {
                self.abort_interaction();
                match self.history.redo() {
                    Some(snapshot) => {
                        self.state.document.restore(snapshot);
                        DispatchOutcome::Applied
                    }
                    None => DispatchOutcome::Unchanged,
                }
            }
            Command::CommitSnapshot => {
                self.commit();
                DispatchOutcome::Applied
            }
        };
        Ok(outcome)
    }

    fn reordered(&mut self, op: impl FnOnce(&mut Document) -> bool) -> DispatchOutcome {
        if op(&mut self.state.document) {
            self.commit();
            DispatchOutcome::Applied
        } else {
            DispatchOutcome::Unchanged
        }
    }

    /// Dispatch an internally generated command whose failure is not actionable.
    fn apply(&mut self, command: Command) {
        if let Err(err) = self.dispatch(command) {
            log::warn!("Internal command failed: {}", err);
        }
    }

    fn apply_patches(&mut self, patches: Vec<(ObjectId, ObjectPatch)>) {
        for (id, patch) in patches {
            self.apply(Command::UpdateObject { id, patch });
        }
    }

    /// Update the modifier state used by an ongoing drag.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Pointer pressed at a screen position.
    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
        if self.is_interacting() {
            self.pointer_up();
        }
        self.modifiers = modifiers;
        let doc = self.state.viewport.screen_to_document(screen);
        let tool = self.state.active_tool;

        if tool == ToolKind::Hand || (tool == ToolKind::Select && modifiers.shift) {
            self.interaction = Interaction::Panning { last: screen };
            return;
        }

        match tool {
            ToolKind::Select => self.select_down(doc, screen, modifiers),
            ToolKind::Text => {
                self.apply(Command::AddObject {
                    kind: ObjectKind::Text,
                    x: doc.x,
                    y: doc.y,
                    overrides: ObjectPatch::default(),
                });
                self.apply(Command::SetTool {
                    tool: ToolKind::Select,
                });
            }
            _ if tool.draws_by_drag() => {
                let start = snap_point(doc, self.state.snap_to_grid, self.config.grid_size);
                let draw = DrawState::new(tool, start);
                if let Some(preview) = self.build_preview(&draw) {
                    self.interaction = Interaction::Drawing { draw, preview };
                }
            }
            _ => {}
        }
    }

    fn select_down(&mut self, doc: Point, screen: Point, modifiers: Modifiers) {
        let tolerance = self.config.handle_tolerance / self.state.viewport.zoom;

        if let Some(handle) = hit_test_handles(&self.handles(), doc, tolerance) {
            let kind = match handle {
                HandleKind::Rotate => GestureKind::Rotate,
                HandleKind::Endpoint(index) => GestureKind::Endpoint(index),
                resize => GestureKind::Resize(resize),
            };
            let targets: Vec<SceneObject> = self
                .transformable_selection()
                .into_iter()
                .cloned()
                .collect();
            self.start_gesture(kind, doc, targets);
            return;
        }

        let document = &self.state.document;
        let hit = hit_test_point(
            document.objects(),
            document.selected_ids(),
            doc,
            self.config.hit_test_mode,
            tolerance,
        );

        match hit {
            Some(id) if modifiers.command() => {
                self.apply(Command::ToggleSelection { id });
            }
            Some(id) => {
                if !self.state.document.is_selected(id) {
                    self.apply(Command::SelectObjects { ids: vec![id] });
                }
                // The object under the pointer leads so the drag offset is taken from it
                let mut targets: Vec<SceneObject> = self
                    .transformable_selection()
                    .into_iter()
                    .cloned()
                    .collect();
                if let Some(pos) = targets.iter().position(|o| o.id() == id) {
                    targets.swap(0, pos);
                }
                self.start_gesture(GestureKind::Move, doc, targets);
            }
            None => {
                self.apply(Command::SelectObjects { ids: Vec::new() });
                self.interaction = Interaction::Marquee {
                    start: screen,
                    current: screen,
                };
            }
        }
    }

    fn start_gesture(&mut self, kind: GestureKind, doc: Point, targets: Vec<SceneObject>) {
        match Gesture::begin(kind, doc, targets) {
            Some(gesture) => self.interaction = Interaction::Transforming(gesture),
            None => log::debug!("No unlocked targets for {:?}", kind),
        }
    }

    fn build_preview(&self, draw: &DrawState) -> Option<SceneObject> {
        let kind = draw.tool.object_kind()?;
        let (origin, _, _) = draw.placement();
        Some(SceneObject::create(
            kind,
            origin,
            self.state.document.next_ordinal(),
            &self.state.creation_defaults(),
            &draw.overrides(),
        ))
    }

    /// Pointer moved to a screen position.
    pub fn pointer_move(&mut self, screen: Point) {
        let doc = self.state.viewport.screen_to_document(screen);
        let options = self.transform_options();
        let shift = self.modifiers.shift;

        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::Panning { last } => {
                let delta = screen - *last;
                *last = screen;
                let pan = self.state.viewport.pan + delta;
                self.apply(Command::SetViewport {
                    zoom: None,
                    pan: Some(pan),
                });
            }
            Interaction::Marquee { current, .. } => {
                *current = screen;
            }
            Interaction::Drawing { draw, .. } => {
                draw.current = snap_point(doc, self.state.snap_to_grid, self.config.grid_size);
                let draw = *draw;
                if let Some(preview) = self.build_preview(&draw) {
                    self.interaction = Interaction::Drawing { draw, preview };
                }
            }
            Interaction::Transforming(gesture) => {
                let patches = gesture.update(doc, shift, &options);
                self.apply_patches(patches);
            }
        }
    }

    /// Pointer released. Finishes whatever gesture is in progress.
    pub fn pointer_up(&mut self) {
        let interaction = std::mem::replace(&mut self.interaction, Interaction::Idle);

        match interaction {
            Interaction::Idle | Interaction::Panning { .. } => {}
            Interaction::Marquee { start, current } => {
                let viewport = &self.state.viewport;
                let rect = Rect::from_points(
                    viewport.screen_to_document(start),
                    viewport.screen_to_document(current),
                );
                let ids = objects_in_rect(self.objects(), rect);
                self.apply(Command::SelectObjects { ids });
            }
            Interaction::Drawing { draw, preview } => {
                if draw.exceeds(self.config.min_draw_size) {
                    self.apply(Command::AddObject {
                        kind: preview.kind(),
                        x: preview.geometry.x,
                        y: preview.geometry.y,
                        overrides: draw.overrides(),
                    });
                    self.apply(Command::SetTool {
                        tool: ToolKind::Select,
                    });
                }
            }
            Interaction::Transforming(gesture) => {
                let baked = gesture.finish(self.objects());
                self.apply_patches(baked);
                if gesture.changed(self.objects()) {
                    self.apply(Command::CommitSnapshot);
                }
                log::debug!("Gesture {:?} ended", gesture.kind());
            }
        }
    }

    /// Wheel over a screen position. Positive `delta_y` zooms out.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let factor = if delta_y > 0.0 {
            self.config.wheel_zoom_out
        } else {
            self.config.wheel_zoom_in
        };
        let viewport = &self.state.viewport;
        let new_zoom = viewport.clamp_zoom(viewport.zoom * factor);
        let pan = zoom_about(viewport.zoom, new_zoom, screen, viewport.pan);
        self.apply(Command::SetViewport {
            zoom: Some(new_zoom),
            pan: Some(pan),
        });
    }

    /// Handle a key press. Returns true if it mapped to an action.
    pub fn key_down(&mut self, key: &Key, modifiers: Modifiers) -> bool {
        let Some(action) = shortcut_for(key, modifiers) else {
            return false;
        };
        match action {
            ShortcutAction::SetTool(tool) => self.apply(Command::SetTool { tool }),
            ShortcutAction::Undo => self.apply(Command::Undo),
            ShortcutAction::Redo => self.apply(Command::Redo),
            ShortcutAction::DeleteSelection => {
                let ids = self.selected_ids().to_vec();
                self.apply(Command::DeleteObjects { ids });
            }
            ShortcutAction::CancelGesture => self.cancel_gesture(),
        }
        true
    }

    /// Abandon the current gesture. Transforms are restored without touching history.
    pub fn cancel_gesture(&mut self) {
        self.abort_interaction();
    }

    fn abort_interaction(&mut self) {
        let interaction = std::mem::replace(&mut self.interaction, Interaction::Idle);
        if let Interaction::Transforming(gesture) = interaction {
            self.apply_patches(gesture.cancel());
        }
    }
}

fn changed(applied: bool) -> DispatchOutcome {
    if applied {
        DispatchOutcome::Applied
    } else {
        DispatchOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResizeStrategy;

    fn add(editor: &mut Editor, kind: ObjectKind, x: f64, y: f64) -> ObjectId {
        match editor.dispatch(Command::AddObject {
            kind,
            x,
            y,
            overrides: ObjectPatch::default(),
        }) {
            Ok(DispatchOutcome::Created(id)) => id,
            other => panic!("Expected a created object, got {:?}", other),
        }
    }

    fn add_rect(editor: &mut Editor, x: f64, y: f64) -> ObjectId {
        add(editor, ObjectKind::Rectangle, x, y)
    }

    fn geometry(editor: &Editor, id: ObjectId) -> crate::shapes::Geometry {
        editor.object(id).map(|o| o.geometry).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_defaults() {
        let editor = Editor::default();
        let state = editor.state();
        assert_eq!(state.active_tool, ToolKind::Select);
        assert_eq!(state.active_fill_color.to_hex(), "#ff6b35");
        assert_eq!(state.active_stroke_color.to_hex(), "#ffffff");
        assert!(state.show_grid);
        assert!(!state.snap_to_grid);
        assert!(close(state.canvas_size.width, 800.0));
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EditorConfig {
            min_object_size: 0.0,
            ..EditorConfig::default()
        };
        assert!(matches!(Editor::new(config), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_add_uses_active_style_and_selects() {
        let mut editor = Editor::default();
        editor
            .dispatch(Command::SetActiveFillColor {
                color: "#112233".to_string(),
            })
            .unwrap();
        editor
            .dispatch(Command::SetActiveStrokeWidth { width: 4.0 })
            .unwrap();
        let id = add_rect(&mut editor, 10.0, 20.0);
        let object = editor.object(id).unwrap();
        assert_eq!(object.appearance.fill.map(|c| c.to_hex()), Some("#112233".to_string()));
        assert!(close(object.appearance.stroke_width, 4.0));
        assert_eq!(editor.selected_ids(), &[id]);
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_undo_redo_roundtrip_of_two_adds() {
        let mut editor = Editor::default();
        add_rect(&mut editor, 0.0, 0.0);
        add(&mut editor, ObjectKind::Ellipse, 50.0, 60.0);
        let after_adds = editor.objects().to_vec();

        editor.dispatch(Command::Undo).unwrap();
        editor.dispatch(Command::Undo).unwrap();
        assert!(editor.objects().is_empty());
        assert!(editor.selected_ids().is_empty());

        editor.dispatch(Command::Redo).unwrap();
        editor.dispatch(Command::Redo).unwrap();
        assert_eq!(editor.objects(), after_adds.as_slice());
        assert!(editor.selected_ids().is_empty());
    }

    #[test]
    fn test_commit_after_undo_discards_redo_branch() {
        let mut editor = Editor::default();
        add_rect(&mut editor, 0.0, 0.0);
        let b = add_rect(&mut editor, 10.0, 0.0);
        editor.dispatch(Command::Undo).unwrap();
        let c = add(&mut editor, ObjectKind::Ellipse, 20.0, 0.0);

        assert_eq!(editor.dispatch(Command::Redo).unwrap(), DispatchOutcome::Unchanged);
        assert!(editor.object(b).is_none());
        assert!(editor.object(c).is_some());
        assert_eq!(editor.objects().len(), 2);
    }

    #[test]
    fn test_drag_adds_exactly_one_history_entry() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 100.0, 100.0);
        let before = editor.history().len();

        editor.pointer_down(Point::new(150.0, 150.0), Modifiers::NONE);
        for i in 1..=50 {
            editor.pointer_move(Point::new(150.0 + i as f64, 150.0));
        }
        editor.pointer_up();

        assert_eq!(editor.history().len(), before + 1);
        let moved = geometry(&editor, id);
        assert!(close(moved.x, 150.0));
        assert!(close(moved.y, 100.0));

        editor.dispatch(Command::Undo).unwrap();
        let restored = geometry(&editor, id);
        assert!(close(restored.x, 100.0));
        assert!(close(restored.y, 100.0));
    }

    #[test]
    fn test_click_without_drag_adds_no_history() {
        let mut editor = Editor::default();
        add_rect(&mut editor, 0.0, 0.0);
        let before = editor.history().len();
        editor.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
        editor.pointer_up();
        assert_eq!(editor.history().len(), before);
    }

    #[test]
    fn test_resize_floor_through_handles() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 0.0, 0.0);

        for handle in editor.handles().into_iter().filter(|h| h.kind != HandleKind::Rotate) {
            let (hx, hy) = handle.kind.resize_factors().unwrap();
            editor.dispatch(Command::SelectObjects { ids: vec![id] }).unwrap();
            editor.pointer_down(handle.position, Modifiers::NONE);
            editor.pointer_move(handle.position + Vec2::new(-hx * 1000.0, -hy * 1000.0));
            editor.pointer_up();

            let g = geometry(&editor, id);
            assert!(g.width >= 5.0 - 1e-9, "{:?}", handle.kind);
            assert!(g.height >= 5.0 - 1e-9, "{:?}", handle.kind);
            editor.dispatch(Command::Undo).unwrap();
        }
    }

    #[test]
    fn test_delete_prunes_selection() {
        let mut editor = Editor::default();
        let a = add_rect(&mut editor, 0.0, 0.0);
        let b = add_rect(&mut editor, 10.0, 0.0);
        editor.dispatch(Command::SelectObjects { ids: vec![a, b] }).unwrap();
        editor.dispatch(Command::DeleteObjects { ids: vec![a] }).unwrap();
        assert_eq!(editor.selected_ids(), &[b]);
    }

    #[test]
    fn test_marquee_selects_fully_contained() {
        let mut editor = Editor::default();
        let inside = add_rect(&mut editor, 0.0, 0.0);
        add_rect(&mut editor, 150.0, 0.0);

        editor.pointer_down(Point::new(-10.0, -10.0), Modifiers::NONE);
        assert!(editor.selected_ids().is_empty());
        editor.pointer_move(Point::new(120.0, 120.0));
        let marquee = editor.marquee().unwrap();
        assert!(close(marquee.x1, 120.0));
        editor.pointer_up();

        assert_eq!(editor.selected_ids(), &[inside]);
        assert!(editor.marquee().is_none());
    }

    #[test]
    fn test_reorder_to_top_is_deterministic() {
        let mut editor = Editor::default();
        let ids: Vec<_> = (0..4).map(|i| add_rect(&mut editor, i as f64, 0.0)).collect();
        editor
            .dispatch(Command::ReorderObject { from: 0, to: 3 })
            .unwrap();
        let order: Vec<_> = editor.objects().iter().map(|o| o.id()).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[3], ids[0]]);

        // The moved object now wins hit-testing where all four overlap
        editor.dispatch(Command::SelectObjects { ids: vec![] }).unwrap();
        editor.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
        editor.pointer_up();
        assert_eq!(editor.selected_ids(), &[ids[0]]);
    }

    #[test]
    fn test_reorder_out_of_range_errors() {
        let mut editor = Editor::default();
        add_rect(&mut editor, 0.0, 0.0);
        let before = editor.history().len();
        let result = editor.dispatch(Command::ReorderObject { from: 0, to: 5 });
        assert!(matches!(result, Err(EngineError::IndexOutOfRange { index: 5, len: 1 })));
        assert_eq!(editor.history().len(), before);
    }

    #[test]
    fn test_locked_object_is_not_dragged() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 0.0, 0.0);
        editor
            .dispatch(Command::UpdateObject {
                id,
                patch: ObjectPatch {
                    locked: Some(true),
                    ..ObjectPatch::default()
                },
            })
            .unwrap();
        editor.dispatch(Command::SelectObjects { ids: vec![] }).unwrap();

        // Not hit-testable by click while unselected
        editor.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
        editor.pointer_move(Point::new(80.0, 80.0));
        editor.pointer_up();
        assert!(editor.selected_ids().is_empty());
        assert!(close(geometry(&editor, id).x, 0.0));

        // Selected but locked: clickable, still not draggable
        editor.dispatch(Command::SelectObjects { ids: vec![id] }).unwrap();
        assert!(editor.handles().is_empty());
        editor.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
        editor.pointer_move(Point::new(80.0, 80.0));
        editor.pointer_up();
        assert!(close(geometry(&editor, id).x, 0.0));
        assert_eq!(editor.selected_ids(), &[id]);
    }

    #[test]
    fn test_command_click_toggles_selection() {
        let mut editor = Editor::default();
        let a = add_rect(&mut editor, 0.0, 0.0);
        let b = add_rect(&mut editor, 200.0, 0.0);
        assert_eq!(editor.selected_ids(), &[b]);

        editor.pointer_down(Point::new(50.0, 50.0), Modifiers::CTRL);
        editor.pointer_up();
        assert_eq!(editor.selected_ids(), &[b, a]);

        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        editor.pointer_down(Point::new(250.0, 50.0), meta);
        editor.pointer_up();
        assert_eq!(editor.selected_ids(), &[a]);
    }

    #[test]
    fn test_group_drag_moves_every_selected_object() {
        let mut editor = Editor::default();
        let a = add_rect(&mut editor, 0.0, 0.0);
        let b = add_rect(&mut editor, 200.0, 0.0);
        editor.dispatch(Command::SelectObjects { ids: vec![a, b] }).unwrap();

        editor.pointer_down(Point::new(250.0, 50.0), Modifiers::NONE);
        editor.pointer_move(Point::new(260.0, 70.0));
        editor.pointer_up();

        assert!(close(geometry(&editor, a).x, 10.0));
        assert!(close(geometry(&editor, b).y, 20.0));
        assert_eq!(editor.selected_ids(), &[a, b]);
    }

    #[test]
    fn test_shift_drag_pans_with_select_tool() {
        let mut editor = Editor::default();
        editor.pointer_down(Point::new(10.0, 10.0), Modifiers::SHIFT);
        editor.pointer_move(Point::new(30.0, 50.0));
        editor.pointer_move(Point::new(40.0, 50.0));
        editor.pointer_up();
        let pan = editor.viewport().pan;
        assert!(close(pan.x, 30.0));
        assert!(close(pan.y, 40.0));
    }

    #[test]
    fn test_hand_tool_pans() {
        let mut editor = Editor::default();
        editor.dispatch(Command::SetTool { tool: ToolKind::Hand }).unwrap();
        let id = add_rect(&mut editor, 0.0, 0.0);
        editor.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
        editor.pointer_move(Point::new(60.0, 45.0));
        editor.pointer_up();
        assert!(close(editor.viewport().pan.x, 10.0));
        assert!(close(geometry(&editor, id).x, 0.0));
    }

    #[test]
    fn test_draw_rectangle_creates_and_returns_to_select() {
        let mut editor = Editor::default();
        editor
            .dispatch(Command::SetTool {
                tool: ToolKind::Rectangle,
            })
            .unwrap();
        editor.pointer_down(Point::new(100.0, 100.0), Modifiers::NONE);
        editor.pointer_move(Point::new(40.0, 160.0));
        let preview = editor.preview().unwrap();
        assert!(close(preview.geometry.x, 40.0));
        assert!(close(preview.geometry.width, 60.0));
        editor.pointer_up();

        assert_eq!(editor.objects().len(), 1);
        let object = &editor.objects()[0];
        assert_eq!(object.kind(), ObjectKind::Rectangle);
        assert!(close(object.geometry.height, 60.0));
        assert_eq!(object.name, "Rectangle 1");
        assert_eq!(editor.active_tool(), ToolKind::Select);
        assert!(editor.preview().is_none());
    }

    #[test]
    fn test_tiny_draw_creates_nothing() {
        let mut editor = Editor::default();
        editor
            .dispatch(Command::SetTool {
                tool: ToolKind::Ellipse,
            })
            .unwrap();
        editor.pointer_down(Point::new(100.0, 100.0), Modifiers::NONE);
        editor.pointer_move(Point::new(103.0, 104.0));
        editor.pointer_up();
        assert!(editor.objects().is_empty());
        assert_eq!(editor.active_tool(), ToolKind::Ellipse);
    }

    #[test]
    fn test_draw_star_uses_preset() {
        let mut editor = Editor::default();
        editor.dispatch(Command::SetTool { tool: ToolKind::Star }).unwrap();
        editor.pointer_down(Point::new(0.0, 0.0), Modifiers::NONE);
        editor.pointer_move(Point::new(100.0, 100.0));
        editor.pointer_up();
        match &editor.objects()[0].data {
            crate::shapes::ShapeData::Polygon { points } => assert_eq!(points.len(), 10),
            other => panic!("Expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_text_tool_click_adds_text() {
        let mut editor = Editor::default();
        editor.key_down(&Key::Character('t'), Modifiers::NONE);
        assert_eq!(editor.active_tool(), ToolKind::Text);
        editor.pointer_down(Point::new(30.0, 40.0), Modifiers::NONE);
        editor.pointer_up();
        assert_eq!(editor.objects()[0].kind(), ObjectKind::Text);
        assert_eq!(editor.active_tool(), ToolKind::Select);
    }

    #[test]
    fn test_wheel_zooms_about_cursor() {
        let mut editor = Editor::default();
        let cursor = Point::new(300.0, 200.0);
        let before = editor.viewport().screen_to_document(cursor);
        editor.wheel(cursor, -1.0);
        assert!(close(editor.viewport().zoom, 1.1));
        let after = editor.viewport().screen_to_document(cursor);
        assert!(close(before.x, after.x));
        assert!(close(before.y, after.y));

        editor.wheel(cursor, 1.0);
        assert!(close(editor.viewport().zoom, 0.99));
    }

    #[test]
    fn test_viewport_zoom_is_clamped() {
        let mut editor = Editor::default();
        editor
            .dispatch(Command::SetViewport {
                zoom: Some(50.0),
                pan: None,
            })
            .unwrap();
        assert!(close(editor.viewport().zoom, 5.0));
        for _ in 0..100 {
            editor.wheel(Point::ZERO, 1.0);
        }
        assert!(close(editor.viewport().zoom, 0.1));
    }

    #[test]
    fn test_hit_testing_under_zoom_and_pan() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 0.0, 0.0);
        editor.dispatch(Command::SelectObjects { ids: vec![] }).unwrap();
        editor
            .dispatch(Command::SetViewport {
                zoom: Some(2.0),
                pan: Some(Vec2::new(100.0, 0.0)),
            })
            .unwrap();
        // Document (50, 50) is at screen (200, 100)
        editor.pointer_down(Point::new(200.0, 100.0), Modifiers::NONE);
        editor.pointer_up();
        assert_eq!(editor.selected_ids(), &[id]);
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 0.0, 0.0);
        assert!(editor.key_down(&Key::Delete, Modifiers::NONE));
        assert!(editor.object(id).is_none());

        editor.key_down(&Key::Character('z'), Modifiers::CTRL);
        assert!(editor.object(id).is_some());

        let redo = Modifiers {
            shift: true,
            ..Modifiers::CTRL
        };
        editor.key_down(&Key::Character('Z'), redo);
        assert!(editor.object(id).is_none());

        assert!(!editor.key_down(&Key::Other("F5".to_string()), Modifiers::NONE));
    }

    #[test]
    fn test_structural_command_mid_drag_finishes_the_drag() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 0.0, 0.0);
        let before = editor.history().len();

        editor.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
        editor.pointer_move(Point::new(80.0, 50.0));
        let added = add(&mut editor, ObjectKind::Ellipse, 300.0, 300.0);
        assert!(!editor.is_interacting());
        editor.pointer_move(Point::new(120.0, 50.0));
        editor.pointer_up();

        assert_eq!(editor.history().len(), before + 2);
        assert!(close(geometry(&editor, id).x, 30.0));

        editor.dispatch(Command::Undo).unwrap();
        assert!(editor.object(added).is_none());
        assert!(close(geometry(&editor, id).x, 30.0));
        editor.dispatch(Command::Undo).unwrap();
        assert!(close(geometry(&editor, id).x, 0.0));
    }

    #[test]
    fn test_escape_cancels_transform() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 0.0, 0.0);
        let before = editor.history().len();
        editor.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
        editor.pointer_move(Point::new(90.0, 90.0));
        assert!(close(geometry(&editor, id).x, 40.0));

        editor.key_down(&Key::Escape, Modifiers::NONE);
        assert!(close(geometry(&editor, id).x, 0.0));
        assert!(!editor.is_interacting());
        editor.pointer_up();
        assert_eq!(editor.history().len(), before);
    }

    #[test]
    fn test_rotate_handle_with_shift_snaps() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 0.0, 0.0);
        let rotate = editor
            .handles()
            .into_iter()
            .find(|h| h.kind == HandleKind::Rotate)
            .unwrap();
        editor.pointer_down(rotate.position, Modifiers::SHIFT);
        // Shift on the select tool pans, so set it after the press
        assert!(!matches!(editor.interaction, Interaction::Transforming(_)));
        editor.pointer_up();

        editor.pointer_down(rotate.position, Modifiers::NONE);
        editor.set_modifiers(Modifiers::SHIFT);
        editor.pointer_move(Point::new(160.0, 48.0));
        editor.pointer_up();
        assert!(close(geometry(&editor, id).rotation, 90.0));
    }

    #[test]
    fn test_scale_strategy_is_baked_on_release() {
        let config = EditorConfig {
            resize_strategy: ResizeStrategy::Scale,
            ..EditorConfig::default()
        };
        let mut editor = Editor::new(config).unwrap();
        let id = add_rect(&mut editor, 0.0, 0.0);
        let corner = editor
            .handles()
            .into_iter()
            .find(|h| h.kind == HandleKind::Corner(crate::selection::Corner::BottomRight))
            .unwrap();
        editor.pointer_down(corner.position, Modifiers::NONE);
        editor.pointer_move(Point::new(200.0, 150.0));
        assert!(close(geometry(&editor, id).scale_x, 2.0));
        editor.pointer_up();

        let g = geometry(&editor, id);
        assert!(close(g.scale_x, 1.0));
        assert!(close(g.scale_y, 1.0));
        assert!(close(g.width, 200.0));
        assert!(close(g.height, 150.0));
        assert!(close(g.x, 0.0));
    }

    #[test]
    fn test_line_endpoint_drag() {
        let mut editor = Editor::default();
        let id = add(&mut editor, ObjectKind::Line, 0.0, 0.0);
        let handles = editor.handles();
        assert_eq!(handles.len(), 2);
        editor.pointer_down(handles[1].position, Modifiers::NONE);
        editor.pointer_move(Point::new(100.0, 80.0));
        editor.pointer_up();
        let g = geometry(&editor, id);
        assert!(close(g.width, 100.0));
        assert!(close(g.height, 80.0));
    }

    #[test]
    fn test_snap_to_grid_during_move() {
        let mut editor = Editor::default();
        editor.dispatch(Command::ToggleSnap).unwrap();
        let id = add_rect(&mut editor, 0.0, 0.0);
        editor.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
        editor.pointer_move(Point::new(77.0, 61.0));
        editor.pointer_up();
        let g = geometry(&editor, id);
        assert!(close(g.x, 20.0));
        assert!(close(g.y, 20.0));
    }

    #[test]
    fn test_invalid_color_is_an_error() {
        let mut editor = Editor::default();
        let result = editor.dispatch(Command::SetActiveStrokeColor {
            color: "blue".to_string(),
        });
        assert!(matches!(result, Err(EngineError::InvalidColor(_))));
        assert_eq!(editor.state().active_stroke_color.to_hex(), "#ffffff");
    }

    #[test]
    fn test_stale_ids_are_noops() {
        let mut editor = Editor::default();
        let ghost = uuid::Uuid::new_v4();
        let outcome = editor
            .dispatch(Command::UpdateObject {
                id: ghost,
                patch: ObjectPatch::position(1.0, 1.0),
            })
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Unchanged);
        assert_eq!(
            editor.dispatch(Command::DeleteObjects { ids: vec![ghost] }).unwrap(),
            DispatchOutcome::Unchanged
        );
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_commands_from_json() {
        let mut editor = Editor::default();
        let command: Command = serde_json::from_str(
            r#"{
                "type": "add_object",
                "kind": "blob",
                "x": 5.0,
                "y": 6.0,
                "overrides": { "width": 30.0 }
            }"#,
        )
        .unwrap();
        let id = match editor.dispatch(command).unwrap() {
            DispatchOutcome::Created(id) => id,
            other => panic!("Expected a created object, got {:?}", other),
        };
        let object = editor.object(id).unwrap();
        assert_eq!(object.kind(), ObjectKind::Rectangle);
        assert!(close(object.geometry.width, 30.0));

        let toggle: Command = serde_json::from_str(r#"{ "type": "toggle_grid" }"#).unwrap();
        editor.dispatch(toggle).unwrap();
        assert!(!editor.state().show_grid);
    }

    #[test]
    fn test_duplicate_and_z_order_commands() {
        let mut editor = Editor::default();
        let a = add_rect(&mut editor, 0.0, 0.0);
        let b = add_rect(&mut editor, 10.0, 0.0);
        let copy = match editor.dispatch(Command::DuplicateObject { id: a }).unwrap() {
            DispatchOutcome::Created(id) => id,
            other => panic!("Expected a created object, got {:?}", other),
        };
        assert_eq!(editor.object(copy).map(|o| o.name.as_str()), Some("Rectangle 1 Copy"));
        assert_eq!(editor.objects().last().map(|o| o.id()), Some(copy));

        editor.dispatch(Command::SendToBack { id: b }).unwrap();
        assert_eq!(editor.objects()[0].id(), b);
        assert_eq!(
            editor.dispatch(Command::SendBackward { id: b }).unwrap(),
            DispatchOutcome::Unchanged
        );
    }

    #[test]
    fn test_flip_selection_commits() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 0.0, 0.0);
        let before = editor.history().len();
        editor
            .dispatch(Command::FlipSelection {
                axis: FlipAxis::Vertical,
            })
            .unwrap();
        assert!(close(geometry(&editor, id).scale_y, -1.0));
        assert_eq!(editor.history().len(), before + 1);
    }

    #[test]
    fn test_each_drag_grows_default_history_by_one() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 0.0, 0.0);
        for i in 0..120 {
            let before = editor.history().len();
            let x = i as f64;
            editor.pointer_down(Point::new(x + 50.0, 50.0), Modifiers::NONE);
            editor.pointer_move(Point::new(x + 51.0, 50.0));
            editor.pointer_up();
            assert_eq!(editor.history().len(), before + 1);
        }
        assert!(close(geometry(&editor, id).x, 120.0));
    }

    #[test]
    fn test_history_limit_from_config() {
        let config = EditorConfig {
            history_limit: Some(3),
            ..EditorConfig::default()
        };
        let mut editor = Editor::new(config).unwrap();
        for i in 0..5 {
            add_rect(&mut editor, i as f64, 0.0);
        }
        assert_eq!(editor.history().len(), 3);
        editor.dispatch(Command::Undo).unwrap();
        editor.dispatch(Command::Undo).unwrap();
        assert_eq!(editor.dispatch(Command::Undo).unwrap(), DispatchOutcome::Unchanged);
        assert_eq!(editor.objects().len(), 3);
    }
}
