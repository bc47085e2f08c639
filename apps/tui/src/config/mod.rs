mod settings;

pub use settings::{AppConfig, SourceKind, DEFAULT_LOG_FILE};
