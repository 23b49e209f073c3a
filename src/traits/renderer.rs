use crate::context::SceneContext;
use crate::error::RenderError;

/// Draws one frame of the scene as seen by the context's camera
pub trait SceneDrawer {
    fn draw(&mut self, scene: &SceneContext) -> Result<(), RenderError>;
}
