#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing required value: {0}")]
    MissingValue(&'static str),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
