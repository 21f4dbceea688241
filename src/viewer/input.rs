//! Pointer and keyboard input for the viewer.
//!
//! Raw winit events are folded into a handful of [`InputEvent`]s:
//!
//! - left button press/release drives the tree (and selects photos);
//! - right button drag orbits the camera;
//! - the wheel zooms;
//! - Escape closes the memory card.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// What the app should react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Left button went down at this NDC position.
    Press(Vec2),
    /// Left button came up.
    Release,
    /// Orbit drag, in pixels.
    Drag(Vec2),
    /// Wheel movement; positive is toward the scene.
    Scroll(f32),
    Escape,
}

/// Convert a pixel position to normalized device coordinates.
///
/// Origin is at center of window. X increases to the right, Y increases upward.
pub fn to_ndc(position: Vec2, window_size: (u32, u32)) -> Vec2 {
    let (w, h) = window_size;
    if w == 0 || h == 0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        (position.x / w as f32) * 2.0 - 1.0,
        1.0 - (position.y / h as f32) * 2.0,
    )
}

/// Normalize a wheel delta to "lines".
pub fn scroll_lines(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => *y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
    }
}

/// Input state tracking for the viewer.
#[derive(Debug)]
pub struct Input {
    cursor: Vec2,
    orbiting: bool,
    window_size: (u32, u32),
}

impl Input {
    pub fn new() -> Self {
        Self {
            cursor: Vec2::ZERO,
            orbiting: false,
            window_size: (800, 600),
        }
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Cursor in normalized device coordinates.
    pub fn cursor_ndc(&self) -> Vec2 {
        to_ndc(self.cursor, self.window_size)
    }

    /// Whether the camera is being dragged.
    pub fn is_orbiting(&self) -> bool {
        self.orbiting
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::MouseInput { state, button, .. } => match (button, state) {
                (MouseButton::Left, ElementState::Pressed) => Some(InputEvent::Press(self.cursor_ndc())),
                (MouseButton::Left, ElementState::Released) => Some(InputEvent::Release),
                (MouseButton::Right, state) => {
                    self.orbiting = *state == ElementState::Pressed;
                    None
                }
                _ => None,
            },

            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                let delta = new_pos - self.cursor;
                self.cursor = new_pos;
                self.orbiting.then_some(InputEvent::Drag(delta))
            }

            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Scroll(scroll_lines(delta))),

            WindowEvent::KeyboardInput { event, .. } => {
                let escape = event.physical_key == PhysicalKey::Code(KeyCode::Escape);
                (escape && event.state == ElementState::Pressed).then_some(InputEvent::Escape)
            }

            _ => None,
        }
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
