//! egui layer drawn over the tree.
//!
//! One [`UiLayer::run`] per redraw produces a [`UiFrame`]; the renderer then
//! uploads it, draws it in its own pass after the scene and finally releases
//! the textures egui no longer needs.

use std::sync::Arc;

use egui::{Color32, Shadow, Stroke, Visuals};
use winit::event::WindowEvent;
use winit::window::Window;

const CARD_FILL: Color32 = Color32::from_rgba_premultiplied(4, 28, 19, 235);
const GOLD_TRIM: Color32 = Color32::from_rgb(201, 162, 39);
const GOLD_SELECTION: Color32 = Color32::from_rgb(140, 110, 20);

/// Tessellated output of one UI pass.
pub struct UiFrame {
    primitives: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

pub struct UiLayer {
    ctx: egui::Context,
    winit: egui_winit::State,
    painter: egui_wgpu::Renderer,
}

fn holiday_visuals() -> Visuals {
    let mut visuals = Visuals::dark();
    visuals.window_shadow = Shadow::NONE;
    visuals.popup_shadow = Shadow::NONE;
    visuals.window_fill = CARD_FILL;
    visuals.panel_fill = Color32::TRANSPARENT;
    visuals.window_stroke = Stroke::new(1.0, GOLD_TRIM);
    visuals.selection.bg_fill = GOLD_SELECTION;
    visuals
}

impl UiLayer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: &Arc<Window>) -> Self {
        let ctx = egui::Context::default();
        ctx.set_visuals(holiday_visuals());

        let winit = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        // No depth buffer and no MSAA: the layer is its own pass over the scene
        let painter = egui_wgpu::Renderer::new(device, format, None, 1, false);

        Self { ctx, winit, painter }
    }

    /// Feed a window event to egui. `true` when egui wants it for itself.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit.on_window_event(window, event).consumed
    }

    /// Whether a press at the current pointer position lands on the overlay.
    pub fn pointer_over_ui(&self) -> bool {
        self.ctx.is_pointer_over_area() || self.ctx.wants_pointer_input()
    }

    pub fn run(&mut self, window: &Window, build: impl FnMut(&egui::Context)) -> UiFrame {
        let input = self.winit.take_egui_input(window);
        let output = self.ctx.run(input, build);
        self.winit.handle_platform_output(window, output.platform_output);

        UiFrame {
            primitives: self.ctx.tessellate(output.shapes, output.pixels_per_point),
            textures: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        }
    }

    /// Upload the frame's textures and vertex data.
    ///
    /// The returned command buffers must be submitted ahead of `encoder`.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        frame: &UiFrame,
        screen: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, delta) in &frame.textures.set {
            self.painter.update_texture(device, queue, *id, delta);
        }
        self.painter
            .update_buffers(device, queue, encoder, &frame.primitives, screen)
    }

    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'static>,
        frame: &UiFrame,
        screen: &egui_wgpu::ScreenDescriptor,
    ) {
        self.painter.render(pass, &frame.primitives, screen);
    }

    /// Drop textures egui released during `frame`. Call after submitting.
    pub fn release(&mut self, frame: &UiFrame) {
        for id in &frame.textures.free {
            self.painter.free_texture(id);
        }
    }
}
