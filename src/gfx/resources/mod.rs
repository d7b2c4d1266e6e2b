// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, uniform blocks, materials and the environment map.

pub mod environment;
pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use environment::{EnvironmentMap, EnvironmentPreset};
pub use global_bindings::{update_global_ubo, EnvironmentBindings, GlobalBindings, GlobalUBO};
pub use material::{MaterialManager, StandardMaterial};
pub use texture_resource::TextureResource;
