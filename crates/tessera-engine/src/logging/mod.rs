//! Logging utilities.
//!
//! Centralizes logger initialization. Engine code only uses the `log` facade;
//! `env_logger` is installed here.

mod init;

pub use init::{DEFAULT_FILTER, LoggingConfig, init_logging};
