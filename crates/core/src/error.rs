/// Result alias that carries the custom [`AnimateError`] type.
pub type Result<T> = std::result::Result<T, AnimateError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum AnimateError {
    /// A playback parameter failed validation. Animations carrying such a
    /// parameter are never built, so no callback is ever invoked for them.
    #[error("invalid animation config: {0}")]
    InvalidConfig(String),
    /// Free-form message for failures outside the animation core, mostly
    /// surfaced by the command line front-end.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration files that could not be parsed.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnimateError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn invalid<T: Into<String>>(reason: T) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

impl From<&str> for AnimateError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for AnimateError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
