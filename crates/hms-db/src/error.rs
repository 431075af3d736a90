//! Database-specific error types and conversions.

use hms_core::error::HmsError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {entity}")]
    Duplicate { entity: String },
}

impl DbError {
    /// Classify a failed statement: unique-index violations become
    /// [`DbError::Duplicate`], everything else [`DbError::Query`].
    pub(crate) fn from_check(err: impl std::fmt::Display, entity: &str) -> Self {
        let msg = err.to_string();
        if msg.contains("already contains") {
            DbError::Duplicate {
                entity: entity.into(),
            }
        } else {
            DbError::Query(msg)
        }
    }
}

impl From<DbError> for HmsError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => HmsError::NotFound { entity, id },
            DbError::Duplicate { entity } => HmsError::AlreadyExists { entity },
            DbError::Hash(msg) => HmsError::Crypto(msg),
            other => HmsError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_index_violation_is_duplicate() {
        let err = DbError::from_check(
            "Database index `idx_user_email` already contains 'a@a.com', with record `user:x`",
            "Email",
        );
        assert!(matches!(err, DbError::Duplicate { ref entity } if entity == "Email"));
        assert!(matches!(
            HmsError::from(err),
            HmsError::AlreadyExists { .. }
        ));
    }

    #[test]
    fn other_failures_are_query_errors() {
        let err = DbError::from_check("Found NONE for field `name`", "Patient");
        assert!(matches!(err, DbError::Query(_)));
        assert!(matches!(HmsError::from(err), HmsError::Database(_)));
    }
}
