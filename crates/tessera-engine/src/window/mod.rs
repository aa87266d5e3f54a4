//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, starts GPU initialization and drives
//! the frame loop from redraw requests.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
