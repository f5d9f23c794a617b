use thiserror::Error;
use mindu_lib::MinduError;

pub type AppResult<T> = ::std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Mindu(#[from] MinduError),
    #[error("SDL error: {0}")]
    Sdl(String),
    #[error("Failed to read config: {0}")]
    Config(#[from] ini::Error),
}

impl AppError {
    pub fn sdl<E: ToString>(e: E) -> AppError {
        AppError::Sdl(e.to_string())
    }
}

impl From<AppError> for MinduError {
    fn from(e: AppError) -> MinduError {
        match e {
            AppError::Mindu(e) => e,
            other => MinduError::Backend(other.to_string()),
        }
    }
}
