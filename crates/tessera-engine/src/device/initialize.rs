use crate::shader::{LoadedStage, ShaderConfig, ShaderLoader, ShaderStage};

use super::{ContextSlots, GpuError, PipelineDesc, Platform, Resource};

/// Acquires every GPU resource in order, filling `slots` as each step lands.
///
/// Only the two shader loads overlap. Any failure ends the attempt; the slots
/// keep whatever was acquired up to that point.
pub async fn initialize<P, L>(
    platform: &mut P,
    loader: &L,
    shaders: &ShaderConfig,
    slots: &mut ContextSlots<P>,
) -> Result<(), GpuError>
where
    P: Platform,
    L: ShaderLoader,
{
    let surface = slots.surface.insert(platform.resolve_surface()?);
    log::debug!("surface resolved");

    let Some(adapter) = platform.request_adapter(surface).await else {
        return Err(GpuError::AdapterNotFound);
    };
    let adapter = slots.adapter.insert(adapter);
    log::debug!("adapter acquired");

    let device = slots.device.insert(platform.request_device(adapter).await?);
    log::debug!("device acquired");

    let format = platform
        .preferred_format(surface, adapter)
        .ok_or(GpuError::Unavailable(Resource::Format))?;
    slots.format = Some(format);
    slots.presentation = Some(platform.configure(surface, adapter, device, format)?);
    log::debug!("surface configured with {format:?}");

    let (vertex, fragment) = futures::try_join!(
        load_stage(loader, &shaders.vertex),
        load_stage(loader, &shaders.fragment)
    )?;

    let desc = PipelineDesc {
        vertex: &vertex,
        fragment: &fragment,
        format,
        topology: wgpu::PrimitiveTopology::TriangleList,
    };
    slots.pipeline = Some(platform.create_pipeline(device, &desc)?);
    log::debug!("render pipeline built");

    Ok(())
}

async fn load_stage<L: ShaderLoader>(
    loader: &L,
    stage: &ShaderStage,
) -> Result<LoadedStage, GpuError> {
    let source = loader.load(&stage.path).await?;
    Ok(LoadedStage::new(stage, source))
}
