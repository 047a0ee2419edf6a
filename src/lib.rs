pub mod bake;
pub mod error;
pub mod resource_system;
pub mod scene;

pub use bake::{bake_scene, BakedScene, ExportOptions};
pub use error::{ExportError, Result};
pub use scene::{SceneDescription, SceneProvider};
