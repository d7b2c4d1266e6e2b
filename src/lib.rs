// src/lib.rs
//! metalcube
//!
//! A white metallic cube spinning inside a gently floating group, lit by an
//! ambient light, a directional light and a procedural environment map.
//! Rendering uses wgpu, windowing winit.

pub mod animation;
pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod loader;
pub mod showcase;
pub mod ui;
pub mod wgpu_utils;

pub use app::MetalcubeApp;
pub use config::AppConfig;
pub use error::{Error, Result};

/// Opens the window and runs until it is closed
pub fn run(config: AppConfig) -> Result<()> {
    MetalcubeApp::new(config)?.run()
}
