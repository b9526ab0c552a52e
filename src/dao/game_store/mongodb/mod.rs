mod config;
mod connection;
mod error;
mod models;
/// [`MongoGameStore`] and its reconnection logic.
pub mod store;
mod transaction;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoGameStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        if err.is_connectivity() {
            StorageError::unavailable(err.to_string(), err)
        } else {
            StorageError::operation(err.to_string(), err)
        }
    }
}
