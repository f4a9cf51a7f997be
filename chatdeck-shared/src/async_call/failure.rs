use std::fmt;

/// Message shown when an operation fails without describing why.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// The single failure kind produced by a wrapped operation.
///
/// A failure may or may not carry a human-readable message. Blank messages are
/// normalized to "no description" so that [`OperationFailure::describe`] always
/// yields something worth rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationFailure {
    message: Option<String>,
}

impl OperationFailure {
    /// Creates a failure with the given description.
    ///
    /// An empty or whitespace-only message produces an undescribed failure.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::undescribed()
        } else {
            Self {
                message: Some(message),
            }
        }
    }

    /// Creates a failure that carries no description.
    pub const fn undescribed() -> Self {
        Self { message: None }
    }

    /// Captures any displayable error as a failure.
    pub fn from_display<E: fmt::Display + ?Sized>(error: &E) -> Self {
        Self::new(error.to_string())
    }

    /// The description carried by the failure, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the display string for this failure, falling back to
    /// [`UNEXPECTED_ERROR_MESSAGE`] when no description is present.
    pub fn describe(&self) -> &str {
        self.message.as_deref().unwrap_or(UNEXPECTED_ERROR_MESSAGE)
    }
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl std::error::Error for OperationFailure {}

impl From<String> for OperationFailure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for OperationFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
