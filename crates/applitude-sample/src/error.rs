use applitude::error::ConfigError;
use applitude::Rejection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Render gate rejected: {0}")]
    NotReady(#[from] Rejection),
}
