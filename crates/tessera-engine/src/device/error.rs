use std::fmt;
use std::path::PathBuf;

/// Boxed platform error carried as a `source`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// GPU resources acquired during initialization.
///
/// Declaration order is the diagnostic order used by
/// [`ContextSlots::check`](super::ContextSlots::check).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Resource {
    Surface,
    Adapter,
    Device,
    Presentation,
    Format,
    Pipeline,
}

impl Resource {
    /// All resources, in diagnostic order.
    pub const ALL: [Resource; 6] = [
        Resource::Surface,
        Resource::Adapter,
        Resource::Device,
        Resource::Presentation,
        Resource::Format,
        Resource::Pipeline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Resource::Surface => "surface",
            Resource::Adapter => "adapter",
            Resource::Device => "device",
            Resource::Presentation => "presentation context",
            Resource::Format => "surface format",
            Resource::Pipeline => "render pipeline",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while acquiring GPU resources or rendering a frame.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    /// A required resource is missing.
    #[error("GPU {0} not available")]
    Unavailable(Resource),

    /// The platform returned no adapter.
    #[error("GPU not supported")]
    AdapterNotFound,

    #[error("failed to create presentation surface")]
    Surface(#[source] BoxError),

    #[error("failed to create GPU device")]
    Device(#[source] BoxError),

    /// A shader source could not be read.
    #[error("failed to load shader `{}`", path.display())]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to acquire frame")]
    Frame(#[source] BoxError),
}
