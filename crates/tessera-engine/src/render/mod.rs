//! Frame rendering.
//!
//! A [`FramePlan`] describes the GPU work of one frame. The [`FrameLoop`]
//! waits for the GPU context, replays the plan once per scheduled frame and
//! asks the host for the next one.

mod frame_loop;
mod plan;

pub use frame_loop::{FrameControl, FrameLoop, FrameScheduler, StopToken};
pub use plan::{CLEAR_COLOR, ColorAttachment, ColorPass, DrawCall, FramePlan};
