pub mod config;
pub mod errors;
pub mod format;

pub use config::{AppConfig, HistoryConfig, LoggingConfig, ServerConfig, UploadConfig};
pub use errors::{Result, SignboardError};
pub use format::{format_date, format_day, format_size};
