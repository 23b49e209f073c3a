use std::collections::HashSet;

use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;

/// Device pixel ratios above this are clamped when sizing the output buffer
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Last known pointer position in normalized device coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    /// `x = (cx / w) * 2 - 1`, `y = -(cy / h) * 2 + 1`. Positions outside the
    /// viewport yield values outside [-1, 1].
    pub fn from_client(client_x: f32, client_y: f32, viewport: &Viewport) -> Self {
        Self {
            x: (client_x / viewport.width) * 2.0 - 1.0,
            y: -(client_y / viewport.height) * 2.0 + 1.0,
        }
    }

    pub fn ndc(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Logical viewport size plus the pixel ratio used for the output buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: device_pixel_ratio.clamp(f32::EPSILON, MAX_PIXEL_RATIO),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Drawing buffer size in physical pixels
    pub fn buffer_size(&self) -> (u32, u32) {
        (
            ((self.width * self.pixel_ratio).round() as u32).max(1),
            ((self.height * self.pixel_ratio).round() as u32).max(1),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Orbit rotate
    Primary,
    /// Orbit pan
    Secondary,
}

/// Pointer tracking plus the orbit gestures accumulated since the last
/// `apply_to_controls`
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    pointer: PointerState,
    last_client: Option<(f32, f32)>,
    pressed: HashSet<PointerButton>,
    rotate_delta: (f32, f32),
    pan_delta: (f32, f32),
    scroll: f32,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn is_down(&self, button: PointerButton) -> bool {
        self.pressed.contains(&button)
    }

    /// Pointer move in logical client pixels
    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32, viewport: &Viewport) {
        self.pointer = PointerState::from_client(client_x, client_y, viewport);

        if let Some((last_x, last_y)) = self.last_client {
            let delta = (client_x - last_x, client_y - last_y);
            if self.is_down(PointerButton::Primary) {
                self.rotate_delta.0 += delta.0;
                self.rotate_delta.1 += delta.1;
            } else if self.is_down(PointerButton::Secondary) {
                self.pan_delta.0 += delta.0;
                self.pan_delta.1 += delta.1;
            }
        }
        self.last_client = Some((client_x, client_y));
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        if pressed {
            self.pressed.insert(button);
        } else {
            self.pressed.remove(&button);
        }
    }

    /// Wheel delta with positive values meaning "scroll down"
    pub fn wheel(&mut self, delta_y: f32) {
        self.scroll += delta_y;
    }

    /// Feeds accumulated gestures into the controls and clears them
    pub fn apply_to_controls(
        &mut self,
        controls: &mut OrbitControls,
        camera: &PerspectiveCamera,
        viewport: &Viewport,
    ) {
        let (rx, ry) = std::mem::take(&mut self.rotate_delta);
        if rx != 0.0 || ry != 0.0 {
            controls.rotate(rx, ry, viewport.height);
        }

        let (px, py) = std::mem::take(&mut self.pan_delta);
        if px != 0.0 || py != 0.0 {
            controls.pan(px, py, viewport.height, camera);
        }

        let scroll = std::mem::take(&mut self.scroll);
        if scroll != 0.0 {
            controls.dolly(scroll);
        }
    }

    /// Winit adapter. Physical cursor positions are converted to logical pixels
    /// with `scale_factor` so they match the logical viewport.
    pub fn process_event(&mut self, event: &WindowEvent, scale_factor: f64, viewport: &Viewport) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(scale_factor);
                self.pointer_moved(logical.x, logical.y, viewport);
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_client = None;
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = Self::map_button(*button) {
                    self.button(button, *state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => -*y as f32,
                };
                self.wheel(dy);
            }
            _ => {}
        }
    }

    /// Handles an event the UI layer consumed. Only button releases are kept,
    /// so a drag that ends over the UI does not leave its button held.
    pub fn process_consumed_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseInput {
            state: ElementState::Released,
            button,
            ..
        } = event
        {
            if let Some(button) = Self::map_button(*button) {
                self.button(button, false);
            }
        }
    }

    fn map_button(button: MouseButton) -> Option<PointerButton> {
        match button {
            MouseButton::Left => Some(PointerButton::Primary),
            MouseButton::Right => Some(PointerButton::Secondary),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_formula_corners() {
        let viewport = Viewport::new(800.0, 600.0, 1.0);
        assert_eq!(PointerState::from_client(0.0, 0.0, &viewport), PointerState { x: -1.0, y: 1.0 });
        assert_eq!(
            PointerState::from_client(800.0, 600.0, &viewport),
            PointerState { x: 1.0, y: -1.0 }
        );
        assert_eq!(PointerState::from_client(400.0, 300.0, &viewport).ndc(), Vec2::ZERO);
    }

    #[test]
    fn pointer_outside_viewport_is_not_clamped() {
        let viewport = Viewport::new(100.0, 100.0, 1.0);
        let p = PointerState::from_client(150.0, -50.0, &viewport);
        assert_eq!(p.x, 2.0);
        assert_eq!(p.y, 2.0);
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let viewport = Viewport::new(800.0, 600.0, 3.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!(viewport.buffer_size(), (1600, 1200));
    }

    #[test]
    fn drag_without_button_only_moves_pointer() {
        let viewport = Viewport::default();
        let mut tracker = InputTracker::new();
        tracker.pointer_moved(10.0, 10.0, &viewport);
        tracker.pointer_moved(50.0, 10.0, &viewport);
        assert_eq!(tracker.rotate_delta, (0.0, 0.0));
    }

    #[test]
    fn primary_drag_rotates_camera() {
        let viewport = Viewport::default();
        let mut tracker = InputTracker::new();
        let mut controls = OrbitControls::new();
        let mut camera = PerspectiveCamera::default();

        tracker.pointer_moved(10.0, 10.0, &viewport);
        tracker.button(PointerButton::Primary, true);
        tracker.pointer_moved(60.0, 10.0, &viewport);
        tracker.apply_to_controls(&mut controls, &camera, &viewport);

        assert!(controls.update(&mut camera));
        assert_eq!(tracker.rotate_delta, (0.0, 0.0));
    }

    fn mouse(state: ElementState, button: MouseButton) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: winit::event::DeviceId::dummy(),
            state,
            button,
        }
    }

    #[test]
    fn release_over_ui_ends_the_drag() {
        let viewport = Viewport::default();
        let mut tracker = InputTracker::new();

        tracker.pointer_moved(10.0, 10.0, &viewport);
        tracker.process_event(&mouse(ElementState::Pressed, MouseButton::Left), 1.0, &viewport);
        assert!(tracker.is_down(PointerButton::Primary));

        tracker.process_consumed_event(&mouse(ElementState::Released, MouseButton::Left));
        assert!(!tracker.is_down(PointerButton::Primary));

        tracker.pointer_moved(80.0, 40.0, &viewport);
        assert_eq!(tracker.rotate_delta, (0.0, 0.0));
    }

    #[test]
    fn consumed_press_is_ignored() {
        let mut tracker = InputTracker::new();
        tracker.process_consumed_event(&mouse(ElementState::Pressed, MouseButton::Right));
        assert!(!tracker.is_down(PointerButton::Secondary));
    }

    #[test]
    fn wheel_accumulates_until_applied() {
        let viewport = Viewport::default();
        let mut tracker = InputTracker::new();
        let mut controls = OrbitControls::new();
        let mut camera = PerspectiveCamera::default();

        tracker.wheel(-1.0);
        tracker.apply_to_controls(&mut controls, &camera, &viewport);
        controls.update(&mut camera);

        assert!(camera.position.length() < 3.0);
        assert_eq!(tracker.scroll, 0.0);
    }
}
