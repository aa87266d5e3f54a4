use super::{GpuError, Platform, Resource};

/// Resources being acquired, filled in order during initialization.
///
/// Nothing outside the initializer sees this type half-filled: it is turned
/// into a [`GpuContext`] only once [`check`](Self::check) passes.
pub struct ContextSlots<P: Platform> {
    pub surface: Option<P::Surface>,
    pub adapter: Option<P::Adapter>,
    pub device: Option<P::Device>,
    pub presentation: Option<P::Presentation>,
    pub format: Option<wgpu::TextureFormat>,
    pub pipeline: Option<P::Pipeline>,
}

impl<P: Platform> Default for ContextSlots<P> {
    fn default() -> Self {
        Self {
            surface: None,
            adapter: None,
            device: None,
            presentation: None,
            format: None,
            pipeline: None,
        }
    }
}

impl<P: Platform> ContextSlots<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, resource: Resource) -> bool {
        match resource {
            Resource::Surface => self.surface.is_some(),
            Resource::Adapter => self.adapter.is_some(),
            Resource::Device => self.device.is_some(),
            Resource::Presentation => self.presentation.is_some(),
            Resource::Format => self.format.is_some(),
            Resource::Pipeline => self.pipeline.is_some(),
        }
    }

    /// Returns the first missing resource in diagnostic order.
    pub fn first_missing(&self) -> Option<Resource> {
        Resource::ALL.into_iter().find(|r| !self.is_set(*r))
    }

    /// Validates that every resource is present.
    ///
    /// The error names the earliest missing resource in the order surface,
    /// adapter, device, presentation context, format, pipeline; not
    /// necessarily the step that failed.
    pub fn check(&self) -> Result<(), GpuError> {
        match self.first_missing() {
            Some(missing) => Err(GpuError::Unavailable(missing)),
            None => Ok(()),
        }
    }

    /// Converts fully populated slots into a [`GpuContext`].
    pub fn into_context(self) -> Result<GpuContext<P>, GpuError> {
        self.check()?;

        let (
            Some(surface),
            Some(adapter),
            Some(device),
            Some(presentation),
            Some(format),
            Some(pipeline),
        ) = (
            self.surface,
            self.adapter,
            self.device,
            self.presentation,
            self.format,
            self.pipeline,
        )
        else {
            // `check` passed, so every slot is filled.
            return Err(GpuError::Unavailable(Resource::Surface));
        };

        Ok(GpuContext {
            surface,
            adapter,
            device,
            presentation,
            format,
            pipeline,
        })
    }
}

/// Fully initialized GPU resources, read-only once published.
pub struct GpuContext<P: Platform> {
    pub surface: P::Surface,
    pub adapter: P::Adapter,
    pub device: P::Device,
    pub presentation: P::Presentation,
    pub format: wgpu::TextureFormat,
    pub pipeline: P::Pipeline,
}
