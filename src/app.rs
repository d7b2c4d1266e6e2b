//! Window, event loop and the per-frame sequence
//!
//! Each redraw ticks the clock, polls the environment loader, runs the
//! frame callbacks and then draws either the scene or the loading overlay.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

use crate::{
    animation::{FrameClock, FrameLoop},
    config::AppConfig,
    error::{Error, Result},
    gfx::{resources::EnvironmentMap, scene::Scene, RenderEngine},
    loader::{EnvironmentLoader, LoadState},
    showcase::Showcase,
    ui::{LoadingOverlay, LOADING_TEXT},
};

pub struct MetalcubeApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    overlay: Option<LoadingOverlay>,
    scene: Scene,
    clock: FrameClock,
    frame_loop: FrameLoop,
    showcase: Option<Showcase>,
    loader: Option<EnvironmentLoader>,
    error: Option<Error>,
}

impl MetalcubeApp {
    /// Starts loading the environment and registers the frame callbacks
    ///
    /// The window and GPU are created once the event loop resumes.
    pub fn new(config: AppConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;

        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let scene = Scene::new(&config.scene, &config.environment, aspect);
        let frame_loop = FrameLoop::new();
        let showcase = Showcase::new(&config.scene, &frame_loop);
        let loader =
            EnvironmentLoader::spawn(config.environment.preset, config.environment.face_size);

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                overlay: None,
                scene,
                clock: FrameClock::new(),
                frame_loop,
                showcase: Some(showcase),
                loader: Some(loader),
                error: None,
            },
        })
    }

    /// Runs until the window closes, returning the first fatal error
    pub fn run(mut self) -> Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop.run_app(&mut self.app_state)?;

        match self.app_state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn window_attributes(&self) -> WindowAttributes {
        let window = &self.config.window;
        let mut attributes = WindowAttributes::default()
            .with_title(window.title.clone())
            .with_inner_size(LogicalSize::new(window.width, window.height))
            .with_maximized(window.maximized);
        if window.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        attributes
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = Arc::new(event_loop.create_window(self.window_attributes())?);
        let (width, height) = window.inner_size().into();

        let render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.config.vsync,
        ))?;

        let overlay = LoadingOverlay::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );

        let (width, height) = render_engine.size();
        self.scene.resize(width, height);

        self.overlay = Some(overlay);
        self.render_engine = Some(render_engine);
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        log::error!("{}", error);
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<()> {
        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return Ok(());
        };

        let frame = self.clock.tick();

        if let Some(loader) = self.loader.as_mut() {
            match loader.poll() {
                LoadState::Loading => {}
                LoadState::Ready(map) => {
                    render_engine.set_environment(&map);
                    self.loader = None;
                }
                LoadState::Failed(e) => {
                    log::error!(
                        "Environment '{}' failed to load: {}; using a neutral one",
                        loader.preset(),
                        e
                    );
                    let map = EnvironmentMap::neutral(self.config.environment.face_size);
                    render_engine.set_environment(&map);
                    self.loader = None;
                }
            }
        }

        let mounted = match self.showcase.as_mut() {
            Some(showcase) if render_engine.has_environment() => {
                if !showcase.is_mounted() {
                    showcase.mount(&mut self.scene);
                }
                true
            }
            _ => false,
        };

        self.frame_loop.tick(&frame, &mut self.scene.graph);
        self.scene.update();
        render_engine.prepare_scene(&mut self.scene);

        if mounted {
            return render_engine.render_scene(&self.scene);
        }

        match self.overlay.as_mut() {
            Some(overlay) => render_engine.render_placeholder(|device, queue, encoder, view| {
                overlay.draw(device, queue, encoder, window, view, LOADING_TEXT)
            }),
            None => render_engine.render_placeholder(|_, _, _, _| Ok(())),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init_graphics(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.render_engine.is_none() {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.update_display_size(width, height);
                }
                self.scene.resize(width, height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut showcase) = self.showcase.take() {
            showcase.unmount(&mut self.scene);
        }
        self.loader = None;
        log::info!("Exiting after {} frames", self.clock.frame_count());
    }
}
