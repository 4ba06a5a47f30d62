use std::fmt;

use crate::types::DbId;

/// The two entity kinds the service manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Project,
    Task,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Task => "Task",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    /// Empty or whitespace-only where a value is mandatory.
    Required,
    /// More whitespace-separated words than allowed.
    TooLong { max_words: usize },
    /// Status outside `todo` / `doing` / `done`.
    InvalidStatus,
    /// Date not in `YYYY-MM-DD` form.
    BadFormat,
    /// Date strictly before today.
    PastDate,
}

impl ValidationReason {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooLong { .. } => "too_long",
            Self::InvalidStatus => "invalid_status",
            Self::BadFormat => "bad_format",
            Self::PastDate => "past_date",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("is required"),
            Self::TooLong { max_words } => write!(f, "must be at most {max_words} words"),
            Self::InvalidStatus => f.write_str("must be one of: todo, doing, done"),
            Self::BadFormat => f.write_str("must be a date in YYYY-MM-DD format"),
            Self::PastDate => f.write_str("cannot be in the past"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {field} {reason}")]
    Validation {
        field: &'static str,
        reason: ValidationReason,
    },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: Entity, id: DbId },

    #[error("Duplicate {entity} name: '{name}'")]
    Duplicate { entity: Entity, name: String },

    #[error("{entity} limit reached: at most {limit} allowed")]
    LimitReached { entity: Entity, limit: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(field: &'static str, reason: ValidationReason) -> Self {
        Self::Validation { field, reason }
    }

    pub fn project_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: Entity::Project,
            id,
        }
    }

    pub fn task_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: Entity::Task,
            id,
        }
    }
}

/// Failure reported by a storage adapter.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A storage-level unique constraint rejected the write.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A write referenced a parent row that does not exist.
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// Anything else the backend reports (connectivity, syntax, ...).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_are_stable() {
        assert_eq!(ValidationReason::Required.code(), "required");
        assert_eq!(ValidationReason::TooLong { max_words: 30 }.code(), "too_long");
        assert_eq!(ValidationReason::InvalidStatus.code(), "invalid_status");
        assert_eq!(ValidationReason::BadFormat.code(), "bad_format");
        assert_eq!(ValidationReason::PastDate.code(), "past_date");
    }

    #[test]
    fn messages_name_the_field_and_limit() {
        let err = CoreError::validation("name", ValidationReason::TooLong { max_words: 30 });
        assert_eq!(err.to_string(), "Validation failed: name must be at most 30 words");

        let err = CoreError::LimitReached {
            entity: Entity::Task,
            limit: 50,
        };
        assert_eq!(err.to_string(), "Task limit reached: at most 50 allowed");
    }

    #[test]
    fn storage_errors_become_internal() {
        let err: CoreError = StorageError::Backend("connection refused".into()).into();
        assert!(matches!(err, CoreError::Internal(msg) if msg.contains("connection refused")));
    }
}
