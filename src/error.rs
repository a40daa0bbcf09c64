use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API failed: {status} ({context})")]
    Api { status: u16, context: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    /// A message already phrased for the user, with its cause appended.
    #[error("{message} ({source})")]
    User {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// HTTP status carried by an API failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::User { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Put a user-facing message in front of `cause`.
    pub fn user(message: impl Into<String>, cause: Error) -> Self {
        Error::User {
            message: message.into(),
            source: Box::new(cause),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
