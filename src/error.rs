use std::fmt;

use sqlx::error::ErrorKind;

pub type BookResult<T> = Result<T, BookError>;

/// The integrity constraint a rejected write ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Check,
    Unique,
    ForeignKey,
    NotNull,
    /// Value the column type cannot hold (SQLSTATE class 22), e.g. too long
    Data,
    Other,
}

impl From<ErrorKind> for Violation {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::CheckViolation => Violation::Check,
            ErrorKind::UniqueViolation => Violation::Unique,
            ErrorKind::ForeignKeyViolation => Violation::ForeignKey,
            ErrorKind::NotNullViolation => Violation::NotNull,
            _ => Violation::Other,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Violation::Check => "check",
            Violation::Unique => "unique",
            Violation::ForeignKey => "foreign key",
            Violation::NotNull => "not null",
            Violation::Data => "data",
            Violation::Other => "integrity",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookError {
    /// The store refused the write (SQLSTATE class 22 or 23)
    #[error("{violation} constraint {} rejected the write: {message} (SQLSTATE {code})", .constraint.as_deref().unwrap_or("<unnamed>"))]
    Rejected {
        violation: Violation,
        code: String,
        constraint: Option<String>,
        message: String,
    },

    #[error("client {0} not found")]
    NotFound(i32),

    #[error("database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Store(#[source] sqlx::Error),
}

impl BookError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, BookError::Rejected { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, BookError::Unavailable(_))
    }

    /// SQLSTATE of a rejected write
    pub fn code(&self) -> Option<&str> {
        match self {
            BookError::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for BookError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.code().is_some_and(|code| refused_write(&code)) => {
                let data = db.code().is_some_and(|code| code.starts_with("22"));
                BookError::Rejected {
                    violation: if data { Violation::Data } else { db.kind().into() },
                    code: db.code().map(|code| code.into_owned()).unwrap_or_default(),
                    constraint: db.constraint().map(str::to_owned),
                    message: db.message().to_owned(),
                }
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => BookError::Unavailable(err),
            other => BookError::Store(other),
        }
    }
}

/// Integrity constraint violations and data exceptions
fn refused_write(code: &str) -> bool {
    code.starts_with("23") || code.starts_with("22")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failures_are_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(BookError::from(sqlx::Error::Io(io)).is_unavailable());
        assert!(BookError::from(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(BookError::from(sqlx::Error::PoolClosed).is_unavailable());
    }

    #[test]
    fn other_failures_are_store_errors() {
        let err = BookError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, BookError::Store(sqlx::Error::RowNotFound)));
        assert!(!err.is_rejection());
        assert_eq!(err.code(), None);
    }

    #[test]
    fn data_exceptions_and_constraint_violations_are_refusals() {
        assert!(refused_write("22001"));
        assert!(refused_write("23514"));
        assert!(refused_write("23503"));
        assert!(!refused_write("42P01"));
        assert!(!refused_write("08006"));
    }

    #[test]
    fn rejection_message_names_the_constraint() {
        let err = BookError::Rejected {
            violation: Violation::Check,
            code: "23514".to_string(),
            constraint: Some("proper_phone".to_string()),
            message: "new row violates check constraint".to_string(),
        };

        assert_eq!(err.code(), Some("23514"));
        assert_eq!(
            err.to_string(),
            "check constraint proper_phone rejected the write: new row violates check constraint (SQLSTATE 23514)"
        );
    }
}
