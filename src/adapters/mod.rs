// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::init_logging;
