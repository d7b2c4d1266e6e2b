//! WGPU-based rendering engine for metalcube
//!
//! Owns the surface, device and queue, the depth buffer, the global and
//! environment bindings and the standard shading pipeline.

use wgpu::{Device, Queue, TextureFormat};

use crate::{
    error::Result,
    gfx::{
        resources::{
            environment::EnvironmentMap,
            global_bindings::{update_global_ubo, EnvironmentBindings, GlobalBindings, GlobalUBO},
            texture_resource::TextureResource,
        },
        scene::{DrawMesh, Scene, SceneLayouts},
    },
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const STANDARD_PIPELINE: &str = "Standard";

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Device,
    queue: Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    environment_bindings: EnvironmentBindings,
    scene_layouts: SceneLayouts,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Picks a non-sRGB surface format; the standard shader encodes gamma
    /// itself.
    ///
    /// # Errors
    /// Fails when no surface, adapter or device can be created, or when the
    /// standard pipeline does not build.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);
        let environment_bindings = EnvironmentBindings::new(&device);
        let scene_layouts = SceneLayouts::new(&device);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("standard", include_str!("standard.wgsl"));
        pipeline_manager.register_pipeline(
            STANDARD_PIPELINE,
            PipelineConfig::default()
                .with_label(STANDARD_PIPELINE)
                .with_shader("standard")
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_format(format)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    scene_layouts.transform.layout.clone(),
                    scene_layouts.material.layout.clone(),
                    environment_bindings.bind_group_layout().clone(),
                ]),
        );
        pipeline_manager.create_all_pipelines()?;
        log::debug!("{:?}", pipeline_manager.get_stats());

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            environment_bindings,
            scene_layouts,
        })
    }

    /// Uploads `map` and binds it for image-based lighting
    pub fn set_environment(&mut self, map: &EnvironmentMap) {
        let texture = TextureResource::create_environment_cube(&self.device, &self.queue, map);
        self.environment_bindings
            .set_environment(&self.device, texture, map.max_lod());
        log::info!("Environment '{}' bound", map.label());
    }

    pub fn has_environment(&self) -> bool {
        self.environment_bindings.is_loaded()
    }

    /// Uploads new scene resources and this frame's world matrices and globals
    pub fn prepare_scene(&mut self, scene: &mut Scene) {
        scene.sync_gpu(&self.device, &self.queue, &self.scene_layouts);
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            scene.camera.uniform,
            &scene.lighting,
            self.environment_bindings.max_lod(),
        );
    }

    /// Draws every visible mesh of `scene` over a black background
    ///
    /// Without a bound environment only the clear runs.
    pub fn render_scene(&mut self, scene: &Scene) -> Result<()> {
        let Some(frame) = self.acquire_frame()? else {
            return Ok(());
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let bindings = (
                self.pipeline_manager.pipeline(STANDARD_PIPELINE),
                self.global_bindings.bind_group(),
                self.environment_bindings.bind_group(),
            );
            if let (Some(pipeline), Some(globals), Some(environment)) = bindings {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, globals, &[]);
                render_pass.set_bind_group(3, environment, &[]);

                for item in scene.draw_items() {
                    let Some(material) = item.material.bind_group() else {
                        log::debug!(
                            "Skipping '{}': material '{}' has no GPU resources",
                            item.mesh.name,
                            item.material.name
                        );
                        continue;
                    };
                    render_pass.set_bind_group(1, &item.object.transform_bind_group, &[]);
                    render_pass.set_bind_group(2, material, &[]);
                    render_pass.draw_mesh(item.mesh);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Clears to black and lets `overlay` draw on top
    pub fn render_placeholder<F>(&mut self, overlay: F) -> Result<()>
    where
        F: FnOnce(&Device, &Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView) -> Result<()>,
    {
        let Some(frame) = self.acquire_frame()? else {
            return Ok(());
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Placeholder Encoder"),
            });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        overlay(&self.device, &self.queue, &mut encoder, &view)?;

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Next surface texture, or `None` when this frame should be skipped
    fn acquire_frame(&mut self) -> Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface texture timed out, skipping frame");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero sizes (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Returns current surface dimensions
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.format
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::Immediate
    }
}
