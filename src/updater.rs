//! Per-frame work: animation, hover picking, orbit damping and the draw call,
//! plus the owner that decides whether another frame gets scheduled.

use crate::context::SceneContext;
use crate::error::RenderError;
use crate::frame::{FrameInfo, FrameIterator};
use crate::raycast::Raycaster;
use crate::traits::SceneDrawer;

/// Scale factor applied to the model while the pointer is over it
pub const HOVER_SCALE: f32 = 1.2;

#[derive(Debug, Default)]
pub struct FrameUpdater {
    raycaster: Raycaster,
    hovered: bool,
}

impl FrameUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last tick found the pointer over the model
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// One frame: advance animation, pick, apply hover scale, damp the
    /// orbit camera, draw.
    pub fn tick(
        &mut self,
        ctx: &mut SceneContext,
        delta: f32,
        drawer: &mut dyn SceneDrawer,
    ) -> Result<(), RenderError> {
        if let Some(mixer) = &mut ctx.mixer {
            mixer.update(delta, &mut ctx.graph);
        }
        ctx.graph.update_world_matrices();
        ctx.graph.update_skins();

        if self.update_hover(ctx).is_some() {
            ctx.graph.update_world_matrices();
        }

        ctx.input
            .apply_to_controls(&mut ctx.controls, &ctx.camera, &ctx.viewport);
        ctx.controls.update(&mut ctx.camera);

        drawer.draw(ctx)
    }

    /// Casts the pointer ray against the model and sets its scale. Returns
    /// `None` without touching anything while no model is loaded.
    pub fn update_hover(&mut self, ctx: &mut SceneContext) -> Option<bool> {
        let model = ctx.model()?;

        self.raycaster
            .set_from_camera(ctx.input.pointer().ndc(), &ctx.camera);
        let hit = self.raycaster.hits_object(&ctx.graph, model.node);

        if hit != self.hovered {
            log::debug!("pointer {} model", if hit { "entered" } else { "left" });
        }
        self.hovered = hit;

        let factor = if hit { HOVER_SCALE } else { 1.0 };
        ctx.graph.node_mut(model.node).transform.scale = model.base_scale * factor;
        Some(hit)
    }
}

/// What happened to a frame handed to `RenderLoop::report`
#[derive(Debug)]
pub enum FrameOutcome {
    Presented,
    /// Recoverable; the frame was dropped
    Skipped(RenderError),
    /// Fatal; the loop is no longer running
    Stopped(RenderError),
}

/// Owns frame scheduling. While running it hands out one `FrameInfo` per
/// refresh; after `stop` it hands out nothing.
#[derive(Debug, Default)]
pub struct RenderLoop {
    frames: FrameIterator,
    running: bool,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if !self.running {
            self.frames.reset();
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            log::info!("Render loop stopped after {} frames", self.frames.frame_number());
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Next frame's timing, or `None` once stopped
    pub fn next_frame(&mut self) -> Option<FrameInfo> {
        if !self.running {
            return None;
        }
        self.frames.next()
    }

    /// Applies the render failure policy to a frame result
    pub fn report(&mut self, result: Result<(), RenderError>) -> FrameOutcome {
        match result {
            Ok(()) => FrameOutcome::Presented,
            Err(error) if error.is_fatal() => {
                log::error!("Render error: {}", error);
                self.stop();
                FrameOutcome::Stopped(error)
            }
            Err(error) => {
                if error.needs_reconfigure() {
                    log::debug!("Skipping frame: {}", error);
                } else {
                    log::warn!("Skipping frame: {}", error);
                }
                FrameOutcome::Skipped(error)
            }
        }
    }
}
