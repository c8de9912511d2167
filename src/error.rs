use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("movie {id} not found")]
    NotFound { id: i32 },

    #[error("a movie titled {0:?} is already in the collection")]
    DuplicateTitle(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("movie database unavailable: {0}")]
    LookupUnavailable(String),

    #[error("unexpected response from movie database: {0}")]
    MalformedResponse(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // A body that is not the expected JSON is a shape problem, not an outage.
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::LookupUnavailable(err.to_string())
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
