use thiserror::Error;

/// Authentication failures the caller can act on.
///
/// `InvalidCredentials` and `UnconfirmedAccount` come back from the login
/// endpoint and need different user messaging; `NotAuthenticated` is raised
/// locally before any network call when a write is attempted without a
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account email not confirmed")]
    UnconfirmedAccount,
    #[error("not authenticated")]
    NotAuthenticated,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage rejected write: {0}")]
    Storage(String),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("translation failed: {0}")]
    Translation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Db(#[from] tokio_rusqlite::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// The auth variant, if this error is one.
    pub fn as_auth(&self) -> Option<AuthError> {
        match self {
            AppError::Auth(e) => Some(*e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
