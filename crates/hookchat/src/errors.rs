use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The microphone could not be opened
    #[error("{0}")]
    Permission(String),

    /// An attachment was rejected before it reached the composer
    #[error("{0}")]
    Validation(String),

    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// The reply did not carry a usable `{type, content}` envelope
    #[error("{0}")]
    Format(String),

    /// The request was cancelled after the configured wait; holds the user facing text
    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Network(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        ChatError::Io(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
