use std::path::PathBuf;

/// One shader stage: where its source lives and which entry point to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStage {
    /// Path handed to the [`ShaderLoader`](super::ShaderLoader).
    pub path: PathBuf,

    /// Entry point name. `None` selects the module's only entry point for the stage.
    pub entry_point: Option<String>,
}

impl ShaderStage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entry_point: None,
        }
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }
}

/// The two stages of the render pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderConfig {
    /// Directory the filesystem loader resolves stage paths against.
    pub root: PathBuf,
    pub vertex: ShaderStage,
    pub fragment: ShaderStage,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("shaders"),
            vertex: ShaderStage::new("triangle.vert.wgsl"),
            fragment: ShaderStage::new("red.frag.wgsl"),
        }
    }
}

/// A stage whose source text has been loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedStage {
    pub path: PathBuf,
    pub source: String,
    pub entry_point: Option<String>,
}

impl LoadedStage {
    pub fn new(stage: &ShaderStage, source: String) -> Self {
        Self {
            path: stage.path.clone(),
            source,
            entry_point: stage.entry_point.clone(),
        }
    }
}
