use thiserror::Error;

pub type PixelResult<T> = Result<T, PixelError>;

#[derive(Error, Debug)]
pub enum PixelError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Unknown integration: {0}")]
    UnknownIntegration(String),

    #[error("Pixel is not configured: {0}")]
    MissingPixel(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
