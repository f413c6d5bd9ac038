use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Tagged outcome of snapshot import; the caller is expected to surface the
/// message and leave existing state untouched.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("PARSE_ERROR: {0}")]
    Parse(String),
    #[error("SHAPE_ERROR: {0}")]
    Shape(String),
}
