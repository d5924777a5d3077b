pub mod config;
pub mod roster;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use roster::{ItemRoster, RosterError};
