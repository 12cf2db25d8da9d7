pub mod config;
pub mod types;

pub use config::{AppConfig, GenAiConfig};
pub use types::Language;
