//! # Graphics Module
//!
//! Camera, geometry, GPU resources, the scene graph and the render engine
//! that draws it.
//!
//! - **Camera** ([`camera`]) - fixed perspective camera
//! - **Geometry** ([`geometry`]) - procedural box meshes
//! - **Rendering** ([`rendering`]) - pipelines and the frame loop on the GPU side
//! - **Resources** ([`resources`]) - materials, environment maps and bindings
//! - **Scene** ([`scene`]) - node hierarchy, meshes and lights
//!
//! ```no_run
//! use metalcube::config::{EnvironmentConfig, SceneConfig};
//! use metalcube::gfx::scene::Scene;
//!
//! let scene = Scene::new(&SceneConfig::default(), &EnvironmentConfig::default(), 16.0 / 9.0);
//! assert!(scene.graph.is_empty());
//! ```

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::PerspectiveCamera;
pub use rendering::render_engine::RenderEngine;
