use winit::dpi::PhysicalSize;

use super::GpuError;

/// Picks the surface format from the formats a surface reports.
///
/// The first entry is the platform's preferred format.
pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = formats.first().copied()?;

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| formats.contains(f)) {
            return Some(f);
        }
    }

    Some(first)
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Surface extent for a window size; a surface cannot be zero-sized.
pub(crate) fn surface_extent(size: PhysicalSize<u32>) -> Result<PhysicalSize<u32>, GpuError> {
    if size.width == 0 || size.height == 0 {
        return Err(GpuError::Surface(
            format!("window has zero size ({}x{})", size.width, size.height).into(),
        ));
    }
    Ok(size)
}
