pub mod glyph;
pub mod layout;
pub mod render;
pub mod scene;

pub use layout::{Bounds, Layout};
pub use render::{FrameStats, Renderer, SceneRenderer, Shape, SkiaRenderer};
pub use scene::{SaveStatus, SceneState};
