use std::path::Path;
use thiserror::Error;

pub type MinduResult<T> = ::std::result::Result<T, MinduError>;

#[derive(Error, Debug)]
pub enum MinduError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid state error: {0}")]
    InvalidState(String),
    #[error("Unknown input symbol: \"{0}\"")]
    UnknownSymbol(String),
    #[error("Unable to load \"{path}\": {reason}")]
    Load {
        path: String,
        reason: String,
    },
    #[error("Unable to save \"{path}\": {reason}")]
    Save {
        path: String,
        reason: String,
    },
    #[error("Font error: {0}")]
    Font(String),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("Image error")]
    Image(#[from] image::ImageError),
}

impl MinduError {
    pub fn load<P: AsRef<Path>, R: ToString>(path: P, reason: R) -> MinduError {
        MinduError::Load {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn save<P: AsRef<Path>, R: ToString>(path: P, reason: R) -> MinduError {
        MinduError::Save {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> MinduError {
        MinduError::InvalidArgument(msg.into())
    }

    pub fn invalid_state<S: Into<String>>(msg: S) -> MinduError {
        MinduError::InvalidState(msg.into())
    }
}

/// Upper-case extension of `path` (without the dot), if any
pub(crate) fn extension_upper(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_uppercase())
}
