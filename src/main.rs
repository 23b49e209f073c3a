use std::sync::Arc;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use hover_scene::cli::Cli;
use hover_scene::config::SceneConfig;
use hover_scene::context::SceneContext;
use hover_scene::core::Throttled;
use hover_scene::debug_panel::DebugPanel;
use hover_scene::input::Viewport;
use hover_scene::loaders::{face_paths, AssetLoader, CubeImages, ModelAsset, PendingLoad};
use hover_scene::overlay::{LoadingOverlay, LOADING_TEXT};
use hover_scene::renderer::Renderer;
use hover_scene::updater::{FrameOutcome, FrameUpdater, RenderLoop};

// === Constants ===

const FPS_UPDATE_INTERVAL: f32 = 1.0;
const INITIAL_WINDOW_WIDTH: u32 = 800;
const INITIAL_WINDOW_HEIGHT: u32 = 600;

// === Frame Rate ===

struct FpsCounter {
    timer: Throttled,
    frames: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            timer: Throttled::new(FPS_UPDATE_INTERVAL),
            frames: 0,
        }
    }

    /// Returns the average rate each time the interval elapses
    fn frame(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.timer.pending() + delta;
        if !self.timer.try_tick(delta) {
            return None;
        }
        let fps = self.frames as f32 / elapsed.max(f32::EPSILON);
        self.frames = 0;
        Some(fps)
    }
}

// === Application ===

struct Viewer {
    window: Arc<Window>,
    renderer: Renderer,
    scene: SceneContext,
}

struct App {
    config: SceneConfig,
    no_ui: bool,
    viewer: Option<Viewer>,
    loader: AssetLoader,
    model_load: Option<PendingLoad<ModelAsset>>,
    skybox_load: Option<PendingLoad<CubeImages>>,
    updater: FrameUpdater,
    render_loop: RenderLoop,
    overlay: LoadingOverlay,
    panel: DebugPanel,
    fps: FpsCounter,
}

impl App {
    fn new(config: SceneConfig, no_ui: bool) -> Self {
        let mut loader = AssetLoader::new();
        let model_load = Some(loader.load_model(config.model.clone()));
        let skybox_load = config
            .skybox
            .as_ref()
            .map(|dir| loader.load_skybox(face_paths(dir, &config.skybox_extension)));

        Self {
            panel: DebugPanel::for_config(&config),
            config,
            no_ui,
            viewer: None,
            loader,
            model_load,
            skybox_load,
            updater: FrameUpdater::new(),
            render_loop: RenderLoop::new(),
            overlay: LoadingOverlay::new(LOADING_TEXT),
            fps: FpsCounter::new(),
        }
    }

    fn create_viewer(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Viewer> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title("Hover Scene")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        INITIAL_WINDOW_WIDTH,
                        INITIAL_WINDOW_HEIGHT,
                    )),
            )?,
        );

        let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;

        let scale_factor = window.scale_factor();
        let logical = window.inner_size().to_logical::<f32>(scale_factor);
        let viewport = Viewport::new(logical.width, logical.height, scale_factor as f32);
        let mut scene = SceneContext::new(&self.config, viewport)?;
        scene.resize(logical.width, logical.height, scale_factor as f32, &mut renderer);

        Ok(Viewer {
            window,
            renderer,
            scene,
        })
    }

    fn poll_loads(
        loader: &mut AssetLoader,
        model_load: &mut Option<PendingLoad<ModelAsset>>,
        skybox_load: &mut Option<PendingLoad<CubeImages>>,
        scene: &mut SceneContext,
    ) {
        if let Some(mut pending) = model_load.take() {
            match loader.poll(&mut pending) {
                Some(Ok(asset)) => {
                    scene.set_model(asset);
                }
                // Already logged by the loading manager
                Some(Err(_)) => {}
                None => *model_load = Some(pending),
            }
        }

        if let Some(mut pending) = skybox_load.take() {
            match loader.poll(&mut pending) {
                Some(Ok(images)) => scene.set_skybox(images),
                Some(Err(_)) => {}
                None => *skybox_load = Some(pending),
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        let Some(frame) = self.render_loop.next_frame() else {
            return;
        };

        Self::poll_loads(
            &mut self.loader,
            &mut self.model_load,
            &mut self.skybox_load,
            &mut viewer.scene,
        );
        if self.loader.manager_mut().take_on_load() {
            log::info!("All assets resolved, revealing scene");
            self.overlay.start();
        }
        self.overlay.advance(frame.delta);

        if !self.no_ui {
            let panel = &self.panel;
            let overlay = &self.overlay;
            let scene = &mut viewer.scene;
            viewer.renderer.run_ui(&viewer.window, |egui_ctx| {
                panel.show(egui_ctx, scene);
                overlay.show(egui_ctx);
            });
        }

        let result = self
            .updater
            .tick(&mut viewer.scene, frame.delta, &mut viewer.renderer);

        match self.render_loop.report(result) {
            FrameOutcome::Presented => {
                if let Some(fps) = self.fps.frame(frame.delta) {
                    log::debug!("FPS: {:.1}", fps);
                    if !self.no_ui {
                        println!("FPS: {:.1}", fps);
                    }
                }
            }
            FrameOutcome::Skipped(error) => {
                if error.needs_reconfigure() {
                    viewer.renderer.reconfigure();
                }
            }
            FrameOutcome::Stopped(_) => event_loop.exit(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        match self.create_viewer(event_loop) {
            Ok(viewer) => {
                self.viewer = Some(viewer);
                self.render_loop.start();
            }
            Err(e) => {
                log::error!("Failed to initialize viewer: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let Some(viewer) = &mut self.viewer {
            if !self.no_ui && viewer.renderer.handle_event(&viewer.window, &event) {
                viewer.scene.input.process_consumed_event(&event);
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                self.render_loop.stop();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::KeyH),
                        repeat: false,
                        ..
                    },
                ..
            } => self.panel.toggle(),
            WindowEvent::Resized(size) => {
                if let Some(viewer) = &mut self.viewer {
                    let scale_factor = viewer.window.scale_factor();
                    let logical = size.to_logical::<f32>(scale_factor);
                    viewer.scene.resize(
                        logical.width,
                        logical.height,
                        scale_factor as f32,
                        &mut viewer.renderer,
                    );
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                if let Some(viewer) = &mut self.viewer {
                    let viewport = viewer.scene.viewport;
                    viewer
                        .scene
                        .input
                        .process_event(&other, viewer.window.scale_factor(), &viewport);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.render_loop.is_running() {
            return;
        }
        if let Some(viewer) = &self.viewer {
            viewer.window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.scene_config()?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, cli.no_ui);

    if !cli.no_ui {
        println!(
            "Hover Scene ({:?}) - Controls: drag to orbit, right-drag to pan, scroll to zoom, H for debug panel, Escape to quit",
            cli.variant
        );
    }
    event_loop.run_app(&mut app)?;

    Ok(())
}
