//! Error handling for the voting booth

/// Result type alias for the voting booth
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the voting booth
///
/// Every variant is recoverable: the presentation layer turns it into a
/// single message and the booth keeps running.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required field is missing or blank, or a ballot is malformed
    #[error("Validation failed: {field}")]
    Validation { field: String },

    /// Name or number collision at registration
    #[error("Duplicate {field}: {value} is already registered")]
    Duplicate { field: String, value: String },

    /// The voter has already cast a ballot
    #[error("Voter {voter} has already voted")]
    DuplicateVote { voter: String },

    /// Lookup of an unknown candidate
    #[error("{what} not found: {id}")]
    NotFound { what: String, id: String },

    /// Voting cannot start with this few candidates
    #[error("At least {required} candidates are required to vote, {actual} registered")]
    NotEnoughCandidates { required: usize, actual: usize },

    /// Wrong admin password
    #[error("Admin password rejected")]
    Unauthorized,

    /// Voting-state errors
    #[error("Voting error: {message}")]
    Voting { message: String },

    /// Persistence backend errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    /// Create a new duplicate registration error
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a new duplicate vote error
    pub fn duplicate_vote(voter: impl Into<String>) -> Self {
        Self::DuplicateVote {
            voter: voter.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(what: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            what: what.into(),
            id: id.to_string(),
        }
    }

    /// Create a new voting error
    pub fn voting(message: impl Into<String>) -> Self {
        Self::Voting {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Convenience macros for creating specific error types
#[macro_export]
macro_rules! voting_error {
    ($msg:expr) => {
        $crate::Error::voting($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::voting(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! storage_error {
    ($msg:expr) => {
        $crate::Error::storage($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::storage(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let validation_err = Error::validation("name");
        assert!(matches!(validation_err, Error::Validation { .. }));

        let duplicate_err = Error::duplicate("number", "101");
        assert!(matches!(duplicate_err, Error::Duplicate { .. }));
        assert_eq!(
            duplicate_err.to_string(),
            "Duplicate number: 101 is already registered"
        );

        let not_found = Error::not_found("Candidate", 42);
        assert_eq!(not_found.to_string(), "Candidate not found: 42");
    }

    #[test]
    fn test_error_macros() {
        let voting_err = voting_error!("no ballots yet");
        assert!(matches!(voting_err, Error::Voting { .. }));

        let storage_err = storage_error!("write failed for {}", "votes");
        match storage_err {
            Error::Storage { message } => assert_eq!(message, "write failed for votes"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
