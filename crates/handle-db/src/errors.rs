use diesel::result::Error as DieselError;
use handle_vaults::StoreError;
use thiserror::Error;

/// Error type for database pool initialization
#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("cannot init database pool : {0}")]
    Pool(String),
    #[error("cannot run database migrations : {0}")]
    Migration(String),
}

/// Database error carrying the operation it happened in
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to get connection from pool for operation '{operation}': {message}")]
    PoolError { operation: String, message: String },

    #[error("Database interaction failed for operation '{operation}': {message}")]
    InteractionError { operation: String, message: String },

    #[error("Record not found in operation '{operation}'")]
    NotFound { operation: String },

    #[error("Database query error in operation '{operation}': {message}")]
    QueryError { operation: String, message: String },

    #[error("Unique constraint violation in operation '{operation}': {message}")]
    UniqueViolation { operation: String, message: String },
}

impl DatabaseError {
    /// Check if this error is a `NotFound` variant
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn operation(&self) -> &str {
        match self {
            Self::PoolError { operation, .. }
            | Self::InteractionError { operation, .. }
            | Self::NotFound { operation }
            | Self::QueryError { operation, .. }
            | Self::UniqueViolation { operation, .. } => operation,
        }
    }

    /// Attach the operation to an error converted without one.
    #[must_use]
    pub fn with_operation(mut self, context: &str) -> Self {
        match &mut self {
            Self::PoolError { operation, .. }
            | Self::InteractionError { operation, .. }
            | Self::NotFound { operation }
            | Self::QueryError { operation, .. }
            | Self::UniqueViolation { operation, .. } => {
                context.clone_into(operation);
            }
        }
        self
    }
}

impl From<DieselError> for DatabaseError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound {
                operation: String::new(),
            },
            DieselError::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            ) => Self::UniqueViolation {
                operation: String::new(),
                message: info.message().to_string(),
            },
            other => Self::QueryError {
                operation: String::new(),
                message: other.to_string(),
            },
        }
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        Self::backend(err.operation().to_string(), &err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diesel_not_found_gets_operation() {
        let err = DatabaseError::from(DieselError::NotFound).with_operation("load vault 0x01");
        assert!(err.is_not_found());
        assert_eq!(err.operation(), "load vault 0x01");
    }

    #[test]
    fn test_store_error_keeps_operation() {
        let err = DatabaseError::QueryError {
            operation: "save vault 0x01".to_string(),
            message: "boom".to_string(),
        };
        let StoreError::Backend { operation, message } = StoreError::from(err) else {
            panic!("expected a backend error");
        };
        assert_eq!(operation, "save vault 0x01");
        assert!(message.contains("boom"));
    }
}
