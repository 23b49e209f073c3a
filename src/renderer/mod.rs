//! wgpu forward renderer: optional skybox, lit meshes, egui on top.

mod gpu;
mod mesh_pass;
mod skybox;
mod textures;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use winit::window::Window;

use crate::context::SceneContext;
use crate::error::RenderError;
use crate::traits::{OutputSurface, SceneDrawer};

use gpu::Gpu;
use mesh_pass::MeshPass;
use skybox::SkyboxPass;
use ui::UiLayer;

pub struct Renderer {
    gpu: Gpu,
    depth_view: wgpu::TextureView,
    mesh_pass: MeshPass,
    skybox: Option<SkyboxPass>,
    ui: UiLayer,
    logical_size: (u32, u32),
    pixel_ratio: f32,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let gpu = Gpu::new(window.clone()).await?;
        let depth_view = gpu.create_depth_view();
        let mesh_pass = MeshPass::new(&gpu.device, &gpu.queue, gpu.config.format);
        let ui = UiLayer::new(&window, &gpu.device, gpu.config.format);

        let pixel_ratio = window.scale_factor() as f32;
        let logical_size = (
            (gpu.config.width as f32 / pixel_ratio).round() as u32,
            (gpu.config.height as f32 / pixel_ratio).round() as u32,
        );

        Ok(Self {
            gpu,
            depth_view,
            mesh_pass,
            skybox: None,
            ui,
            logical_size,
            pixel_ratio,
        })
    }

    /// Returns true when the UI consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.ui.handle_event(window, event)
    }

    /// Builds the UI drawn with the next frame
    pub fn run_ui(&mut self, window: &Window, build: impl FnMut(&egui::Context)) {
        self.ui.run(window, build);
    }

    /// Recovers from a lost or outdated surface
    pub fn reconfigure(&mut self) {
        self.gpu.reconfigure();
    }

    fn apply_buffer_size(&mut self) {
        let (width, height) = self.buffer_size();
        if (width, height) != (self.gpu.config.width, self.gpu.config.height) {
            self.gpu.resize(width, height);
            self.depth_view = self.gpu.create_depth_view();
            log::debug!("Surface resized to {}x{}", width, height);
        }
    }

    fn ensure_skybox(&mut self, scene: &SceneContext) {
        if self.skybox.is_some() {
            return;
        }
        if let Some(images) = scene.skybox() {
            let pass = SkyboxPass::new(&self.gpu.device, &self.gpu.queue, self.gpu.config.format, images);
            self.mesh_pass.set_environment(&self.gpu.device, pass.cube_view());
            self.skybox = Some(pass);
        }
    }
}

impl OutputSurface for Renderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.logical_size = (width, height);
        self.apply_buffer_size();
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
        self.apply_buffer_size();
    }

    fn buffer_size(&self) -> (u32, u32) {
        (
            ((self.logical_size.0 as f32 * self.pixel_ratio).round() as u32).max(1),
            ((self.logical_size.1 as f32 * self.pixel_ratio).round() as u32).max(1),
        )
    }
}

impl SceneDrawer for Renderer {
    fn draw(&mut self, scene: &SceneContext) -> Result<(), RenderError> {
        self.ensure_skybox(scene);

        let device = &self.gpu.device;
        let queue = &self.gpu.queue;
        self.mesh_pass.prepare(device, queue, scene);
        if let Some(skybox) = &self.skybox {
            skybox.prepare(queue, &scene.camera);
        }

        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(skybox) = &self.skybox {
                skybox.draw(&mut render_pass);
            }
            self.mesh_pass.draw(&mut render_pass);
        }

        let size = [self.gpu.config.width, self.gpu.config.height];
        self.ui.paint(device, queue, &mut encoder, &view, size);

        queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
