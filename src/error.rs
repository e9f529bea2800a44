use crate::config::ConfigError;
use thiserror::Error;

/// Errors that stop the agent from starting. Nothing raised while the agent
/// is running escapes it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}
