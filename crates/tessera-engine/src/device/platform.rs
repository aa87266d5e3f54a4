use std::future::Future;

use crate::render::FramePlan;
use crate::shader::LoadedStage;

use super::{GpuContext, GpuError};

/// Everything needed to build the render pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineDesc<'a> {
    pub vertex: &'a LoadedStage,
    pub fragment: &'a LoadedStage,
    /// Format of the single color target.
    pub format: wgpu::TextureFormat,
    pub topology: wgpu::PrimitiveTopology,
}

/// Graphics platform the context manager acquires resources from.
///
/// Resource steps take `&mut self` and run on the initialization thread.
/// Frame steps are associated functions over the published [`GpuContext`].
pub trait Platform: Sized {
    type Surface: Send + Sync + 'static;
    type Adapter: Send + Sync + 'static;
    type Device: Send + Sync + 'static;
    type Presentation: Send + Sync + 'static;
    type Pipeline: Send + Sync + 'static;
    type Frame;

    fn resolve_surface(&mut self) -> Result<Self::Surface, GpuError>;

    /// Resolves to `None` when no suitable adapter exists.
    fn request_adapter(
        &mut self,
        surface: &Self::Surface,
    ) -> impl Future<Output = Option<Self::Adapter>>;

    fn request_device(
        &mut self,
        adapter: &Self::Adapter,
    ) -> impl Future<Output = Result<Self::Device, GpuError>>;

    fn preferred_format(
        &self,
        surface: &Self::Surface,
        adapter: &Self::Adapter,
    ) -> Option<wgpu::TextureFormat>;

    fn configure(
        &mut self,
        surface: &Self::Surface,
        adapter: &Self::Adapter,
        device: &Self::Device,
        format: wgpu::TextureFormat,
    ) -> Result<Self::Presentation, GpuError>;

    fn create_pipeline(
        &mut self,
        device: &Self::Device,
        desc: &PipelineDesc<'_>,
    ) -> Result<Self::Pipeline, GpuError>;

    /// Acquires the next presentable texture and an encoder for it.
    fn acquire_frame(ctx: &GpuContext<Self>) -> Result<Self::Frame, GpuError>;

    /// Records `plan` into the frame.
    fn encode_frame(ctx: &GpuContext<Self>, frame: &mut Self::Frame, plan: &FramePlan);

    /// Submits the frame's single command buffer and presents it.
    fn submit_frame(ctx: &GpuContext<Self>, frame: Self::Frame);
}
