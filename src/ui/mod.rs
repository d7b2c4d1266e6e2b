//! # User Interface Module
//!
//! Dear ImGui integration. The only UI is the [`LoadingOverlay`] drawn while
//! the environment map is being generated.

pub mod overlay;

pub use overlay::{LoadingOverlay, LOADING_TEXT};
