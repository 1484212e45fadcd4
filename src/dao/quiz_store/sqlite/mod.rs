mod error;
mod migrations;
pub mod store;

pub use error::SqliteDaoError;
pub use store::SqliteQuizStore;

use crate::dao::storage::StorageError;

impl From<SqliteDaoError> for StorageError {
    fn from(err: SqliteDaoError) -> Self {
        if err.is_constraint_violation() {
            return StorageError::conflict(err.to_string());
        }
        StorageError::unavailable(err.to_string(), err)
    }
}
