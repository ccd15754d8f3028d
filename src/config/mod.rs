// Configuration module
// Public interface for configuration loading

pub mod constants;
mod settings;

pub use settings::{ConfigError, GatewayConfig, ModelConfig};
