//! Errors surfaced while loading or writing the config file.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No home directory to place the config in")]
    NoConfigDir,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
