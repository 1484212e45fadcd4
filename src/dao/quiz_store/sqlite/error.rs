use thiserror::Error;
use tokio::task::JoinError;

pub type SqliteResult<T> = std::result::Result<T, SqliteDaoError>;

#[derive(Debug, Error)]
pub enum SqliteDaoError {
    #[error("failed to open SQLite database at `{location}`")]
    Open {
        location: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to apply SQLite schema")]
    Migrate {
        #[source]
        source: rusqlite::Error,
    },
    #[error("SQLite connection lock poisoned")]
    Poisoned,
    #[error("blocking SQLite task `{op}` did not complete")]
    Join {
        op: &'static str,
        #[source]
        source: JoinError,
    },
    #[error("SQLite operation `{op}` failed")]
    Query {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl SqliteDaoError {
    /// Whether the failure comes from a UNIQUE, CHECK or FOREIGN KEY constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            SqliteDaoError::Query {
                source: rusqlite::Error::SqliteFailure(inner, _),
                ..
            } if inner.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}
