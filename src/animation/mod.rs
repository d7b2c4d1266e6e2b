//! Per-frame animation
//!
//! [`FrameClock`] measures time, [`FrameLoop`] dispatches it to the
//! registered callbacks and [`Spin`] / [`FloatMotion`] are the callbacks the
//! showcase scene uses.

pub mod clock;
pub mod float;
pub mod frame_loop;
pub mod spin;

pub use clock::FrameClock;
pub use float::{FloatMotion, FloatPose};
pub use frame_loop::{FrameLoop, FrameState, Subscription};
pub use spin::Spin;
