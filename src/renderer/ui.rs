use winit::window::Window;

/// Tessellated egui output waiting for the next draw
struct PendingUi {
    primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

/// egui context, winit adapter and wgpu painter
pub struct UiLayer {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    pending: Option<PendingUi>,
}

impl UiLayer {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            ctx,
            state,
            renderer,
            pending: None,
        }
    }

    /// Returns true when egui consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Builds this frame's UI; painted by the next `paint`
    pub fn run(&mut self, window: &Window, build: impl FnMut(&egui::Context)) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, build);

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let primitives = self.ctx.tessellate(full_output.shapes, pixels_per_point);

        let mut textures_delta = full_output.textures_delta;
        if let Some(previous) = self.pending.take() {
            // A frame was skipped; keep its texture updates
            let mut merged = previous.textures_delta;
            merged.append(textures_delta);
            textures_delta = merged;
        }

        self.pending = Some(PendingUi {
            primitives,
            textures_delta,
            pixels_per_point,
        });
    }

    /// Draws the pending UI on top of `view`
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        for (id, image_delta) in &pending.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: pending.pixels_per_point,
        };

        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &pending.primitives,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            self.renderer
                .render(&mut render_pass, &pending.primitives, &screen_descriptor);
        }

        for id in &pending.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
