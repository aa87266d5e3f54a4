use std::ops::Range;

/// Clear color of the frame pass.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.3,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

/// One color attachment, written to the frame's surface view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorAttachment {
    pub ops: wgpu::Operations<wgpu::Color>,
}

/// The single color pass of a frame.
///
/// Attachments map one-to-one onto the pipeline's color targets.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPass {
    pub attachments: Vec<ColorAttachment>,
}

/// One non-indexed draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}

/// GPU work recorded for every frame: one pass with one color attachment,
/// the pipeline bound, one draw.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub pass: ColorPass,
    pub draw: DrawCall,
}

impl FramePlan {
    /// Clears to [`CLEAR_COLOR`], keeps the result, draws three vertices once.
    pub fn triangle() -> Self {
        Self {
            pass: ColorPass {
                attachments: vec![ColorAttachment {
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                }],
            },
            draw: DrawCall {
                vertices: 0..3,
                instances: 0..1,
            },
        }
    }
}

impl Default for FramePlan {
    fn default() -> Self {
        Self::triangle()
    }
}
