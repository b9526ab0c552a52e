use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures raised by the MongoDB backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection string could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Offending URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The driver refused the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The server never answered while connecting.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings sent before giving up.
        attempts: u32,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A periodic ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// An index could not be created at startup.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Index name.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Listing query failed.
    #[error("failed to list games")]
    ListGames {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Counting query failed.
    #[error("failed to count games")]
    CountGames {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading one game failed.
    #[error("failed to load game `{id}`")]
    LoadGame {
        /// Id of the document involved.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Inserting a game failed.
    #[error("failed to save game `{id}`")]
    SaveGame {
        /// Id of the document involved.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Updating a game failed.
    #[error("failed to update game `{id}`")]
    UpdateGame {
        /// Id of the document involved.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Deleting a game failed.
    #[error("failed to delete game `{id}`")]
    DeleteGame {
        /// Id of the document involved.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading a user failed.
    #[error("failed to load user `{key}`")]
    LoadUser {
        /// Id or email used for the lookup.
        key: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Writing a user failed.
    #[error("failed to save user `{id}`")]
    SaveUser {
        /// Id of the document involved.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Starting, committing or aborting a transaction failed.
    #[error("failed to {step} MongoDB transaction")]
    Transaction {
        /// `start`, `commit` or `abort`.
        step: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}

impl MongoDaoError {
    /// Whether the failure means the database cannot be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            MongoDaoError::InvalidUri { .. }
                | MongoDaoError::ClientConstruction { .. }
                | MongoDaoError::InitialPing { .. }
                | MongoDaoError::HealthPing { .. }
                | MongoDaoError::EnsureIndex { .. }
        )
    }
}
