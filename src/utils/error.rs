use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Authorization denied: {action}")]
    Authorization { action: String },

    #[error("Illegal argument: {message}")]
    Misuse { message: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: Uuid },

    #[error("Constraint violation: {message}")]
    Conflict { message: String },

    #[error("Configuration error in '{field}': {message}")]
    Config { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Persistence,
    Authorization,
    Misuse,
    NotFound,
    Configuration,
}

impl RepoError {
    pub fn misuse(message: impl Into<String>) -> Self {
        Self::Misuse {
            message: message.into(),
        }
    }

    pub fn authorization(action: impl Into<String>) -> Self {
        Self::Authorization {
            action: action.into(),
        }
    }

    pub fn not_found(kind: impl std::fmt::Display, id: Uuid) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            id,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::Misuse { .. } => ErrorCategory::Misuse,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Config { .. } => ErrorCategory::Configuration,
            Self::Conflict { .. } | Self::Io(_) | Self::Serialization(_) => {
                ErrorCategory::Persistence
            }
        }
    }

    pub fn is_authorization(&self) -> bool {
        self.category() == ErrorCategory::Authorization
    }
}

pub type Result<T> = std::result::Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            RepoError::authorization("ADD").category(),
            ErrorCategory::Authorization
        );
        assert_eq!(RepoError::misuse("bad").category(), ErrorCategory::Misuse);
        assert_eq!(
            RepoError::Conflict {
                message: "dup".to_string()
            }
            .category(),
            ErrorCategory::Persistence
        );
        assert_eq!(
            RepoError::not_found("GROUP", Uuid::nil()).category(),
            ErrorCategory::NotFound
        );
    }

    #[test]
    fn test_error_messages() {
        let err = RepoError::not_found("GROUP", Uuid::nil());
        assert_eq!(
            err.to_string(),
            "GROUP not found: 00000000-0000-0000-0000-000000000000"
        );
        assert!(RepoError::authorization("create group").is_authorization());
    }
}
