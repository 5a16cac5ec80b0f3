// Water town scene editor core.
// The renderer in main.rs only reads from `editor::SceneEditor`; everything
// here runs headless, which is how the tests drive it.

pub mod config;
pub mod editor;
pub mod engine;
pub mod error;

pub use error::{EditorError, Result};
