// src/ui/overlay.rs
//! ImGui overlay shown while the scene is loading
//!
//! Wraps the ImGui context, its winit platform glue and the wgpu renderer.
//! The overlay takes no input; it only draws a centered status message on
//! top of whatever the frame already contains.

use std::time::Instant;

use imgui::{Condition, Context, FontConfig, FontSource, WindowFlags};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::window::Window;

use crate::error::{Error, Result};

pub const LOADING_TEXT: &str = "Loading...";

pub struct LoadingOverlay {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
}

impl LoadingOverlay {
    /// Sets up ImGui with locked DPI and the default font
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: 28.0,
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
        }
    }

    pub fn update_display_size(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    /// Builds the overlay for this frame and records it into `encoder`
    ///
    /// Loads the existing contents of `color_attachment` so the overlay sits
    /// on top of the cleared frame.
    pub fn draw(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        window: &Window,
        color_attachment: &TextureView,
        message: &str,
    ) -> Result<()> {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        self.platform
            .prepare_frame(self.context.io_mut(), window)
            .map_err(|e| Error::Overlay(format!("failed to prepare frame: {}", e)))?;

        let ui = self.context.frame();
        let [width, height] = ui.io().display_size;
        ui.window("loading")
            .position([width * 0.5, height * 0.5], Condition::Always)
            .position_pivot([0.5, 0.5])
            .flags(
                WindowFlags::NO_DECORATION
                    | WindowFlags::NO_MOVE
                    | WindowFlags::NO_INPUTS
                    | WindowFlags::NO_BACKGROUND
                    | WindowFlags::ALWAYS_AUTO_RESIZE
                    | WindowFlags::NO_SAVED_SETTINGS,
            )
            .build(|| {
                ui.text_colored([1.0, 1.0, 1.0, 1.0], message);
            });
        self.platform.prepare_render(ui, window);

        let draw_data = self.context.render();
        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return Ok(());
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Loading Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.renderer
            .render(draw_data, queue, device, &mut render_pass)
            .map_err(|e| Error::Overlay(format!("failed to render: {:?}", e)))
    }
}
