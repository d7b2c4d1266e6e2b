//! Error types for metalcube

use thiserror::Error;

/// Main error type for metalcube operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("pipeline error: {0}")]
    Pipeline(String),

    #[error("overlay error: {0}")]
    Overlay(String),

    #[error("environment face size must be a power of two from 4 to 1024, got {0}")]
    InvalidEnvironmentSize(u32),

    #[error("environment worker stopped before producing a map")]
    EnvironmentWorker,
}

/// Result type alias for metalcube operations
pub type Result<T> = std::result::Result<T, Error>;
