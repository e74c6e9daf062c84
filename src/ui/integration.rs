use std::sync::Arc;
use winit::window::Window;

/// egui glue: winit input in, wgpu paint jobs out.
pub struct EguiIntegration {
    pub ctx: egui::Context,
    state: egui_winit::State,
    pub renderer: egui_wgpu::Renderer,
}

impl EguiIntegration {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: Arc<Window>) -> Self {
        let ctx = egui::Context::default();
        let viewport_id = ctx.viewport_id();
        let state = egui_winit::State::new(ctx.clone(), viewport_id, &window, None, None, None);
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self { ctx, state, renderer }
    }

    /// Feed a window event to egui. Returns true when egui consumed it and the
    /// dome should not see it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Whether a press at the current pointer position belongs to a panel.
    pub fn is_pointer_over_panel(&self) -> bool {
        self.ctx.is_pointer_over_area() || self.ctx.wants_pointer_input()
    }

    pub fn wants_keyboard_input(&self) -> bool {
        self.ctx.wants_keyboard_input()
    }

    /// Run one egui pass over `build_ui` and hand platform output back to winit.
    pub fn run(&mut self, window: &Window, build_ui: impl FnMut(&egui::Context)) -> egui::FullOutput {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, build_ui);
        self.state.handle_platform_output(window, full_output.platform_output.clone());
        full_output
    }

    /// Tessellate, update textures and buffers. Returns paint jobs for the egui render pass.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        screen: &egui_wgpu::ScreenDescriptor,
        full_output: &egui::FullOutput,
    ) -> Vec<egui::ClippedPrimitive> {
        let paint_jobs = self.ctx.tessellate(full_output.shapes.clone(), full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer.update_buffers(device, queue, encoder, &paint_jobs, screen);

        paint_jobs
    }

    /// Free textures that egui no longer needs.
    pub fn cleanup(&mut self, full_output: &egui::FullOutput) {
        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
