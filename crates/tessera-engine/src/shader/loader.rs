use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use futures::channel::oneshot;

use crate::device::GpuError;

/// Resolves a shader path to its source text.
pub trait ShaderLoader {
    fn load(&self, path: &Path) -> impl Future<Output = Result<String, GpuError>>;
}

/// Reads shader files relative to a root directory.
///
/// Each read runs on its own short-lived thread, so loads awaited together
/// proceed concurrently.
#[derive(Debug, Clone)]
pub struct FsShaderLoader {
    root: PathBuf,
}

impl FsShaderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ShaderLoader for FsShaderLoader {
    fn load(&self, path: &Path) -> impl Future<Output = Result<String, GpuError>> {
        let full = self.root.join(path);
        let (tx, rx) = oneshot::channel();

        let spawned = thread::Builder::new()
            .name("tessera-shader-load".to_string())
            .spawn({
                let full = full.clone();
                move || {
                    let _ = tx.send(std::fs::read_to_string(&full));
                }
            });

        async move {
            let _reader = spawned.map_err(|source| GpuError::ShaderLoad {
                path: full.clone(),
                source,
            })?;

            let read = rx.await.unwrap_or_else(|_| {
                Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "shader read thread exited without a result",
                ))
            });

            match read {
                Ok(source) => {
                    log::debug!("loaded shader {} ({} bytes)", full.display(), source.len());
                    Ok(source)
                }
                Err(source) => Err(GpuError::ShaderLoad { path: full, source }),
            }
        }
    }
}

/// Serves shader sources registered in memory, e.g. from `include_str!`.
#[derive(Debug, Clone, Default)]
pub struct MemoryShaderLoader {
    sources: HashMap<PathBuf, String>,
}

impl MemoryShaderLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) {
        self.sources.insert(path.into(), source.into());
    }
}

impl ShaderLoader for MemoryShaderLoader {
    fn load(&self, path: &Path) -> impl Future<Output = Result<String, GpuError>> {
        let found = self.sources.get(path).cloned().ok_or_else(|| GpuError::ShaderLoad {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "shader not registered"),
        });
        async move { found }
    }
}
