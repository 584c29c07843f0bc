use std::fmt;

/// Transient user-facing outcome of a session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Operation succeeded.
    Success(String),
    /// Operation failed; local state was left unchanged.
    Error(String),
}

impl Notification {
    pub(crate) fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Message text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }

    /// Returns true for [`Notification::Error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
