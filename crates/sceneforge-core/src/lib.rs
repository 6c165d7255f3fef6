//! SceneForge Core Library
//!
//! Platform-agnostic document model, undo history, hit-testing and transform
//! engine for the SceneForge canvas editor. Rendering is left to the host.

pub mod camera;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod manipulation;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod tools;

pub use camera::Viewport;
pub use config::{EditorConfig, HitTestMode, ResizeStrategy};
pub use document::Document;
pub use editor::{Command, DispatchOutcome, Editor, EditorState};
pub use error::{EngineError, EngineResult};
pub use history::History;
pub use input::{Key, Modifiers};
pub use manipulation::{FlipAxis, Gesture, GestureKind};
pub use selection::{Handle, HandleKind};
pub use shapes::{ObjectId, ObjectKind, ObjectPatch, SceneObject, SerializableColor};
pub use snap::{GRID_SIZE, SnapResult, snap_point, snap_to_grid};
pub use tools::ToolKind;
