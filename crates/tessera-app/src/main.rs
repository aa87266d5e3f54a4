use std::path::PathBuf;

use anyhow::Result;
use tessera_engine::device::GpuInit;
use tessera_engine::logging::{LoggingConfig, init_logging};
use tessera_engine::shader::ShaderConfig;
use tessera_engine::window::{Runtime, RuntimeConfig};

/// Overrides the directory the WGSL files are read from.
const SHADER_DIR_ENV: &str = "TESSERA_SHADER_DIR";

fn shader_root() -> PathBuf {
    std::env::var_os(SHADER_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")))
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let shaders = ShaderConfig {
        root: shader_root(),
        ..ShaderConfig::default()
    };
    log::info!("loading shaders from {}", shaders.root.display());

    Runtime::run(
        RuntimeConfig {
            title: "tessera triangle".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        shaders,
    )
}
