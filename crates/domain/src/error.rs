use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A state-machine guard rejected the operation.
    #[error("Cannot {operation} while installation is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: String,
    },

    /// Optimistic concurrency check failed on save.
    #[error("Version conflict on {id}: expected version {expected}")]
    VersionConflict { id: String, expected: u64 },

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl DomainError {
    pub fn invalid_transition(operation: &'static str, state: impl ToString) -> Self {
        Self::InvalidTransition {
            operation,
            state: state.to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
