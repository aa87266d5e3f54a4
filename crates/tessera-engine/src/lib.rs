//! Tessera engine crate.
//!
//! Acquires a wgpu device, surface and render pipeline once in the background,
//! then renders a single-pass frame per redraw until told to stop.

pub mod device;
pub mod logging;
pub mod render;
pub mod shader;
pub mod window;
