// Editor layer: modes, undo, default layout and the scene file format

pub mod history;
pub mod layout;
pub mod scene_editor;
pub mod scene_file;
pub mod transition;

pub use scene_editor::{EditorMode, SceneEditor};
