/// In-process backend.
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    GameChanges, GameDetailEntity, GameEntity, GamePage, GameQuery, UserEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for games and their creators.
pub trait GameStore: Send + Sync {
    /// One page of games plus the number of matches.
    fn list_games(&self, query: GameQuery) -> BoxFuture<'static, StorageResult<GamePage>>;
    /// Load a game with its creator expanded.
    fn find_game_detail(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameDetailEntity>>>;
    /// Load the games among `ids` that still exist, in the order of `ids`.
    fn find_games(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Apply a partial update without upserting. Resolves to whether a game matched.
    fn update_game(
        &self,
        id: Uuid,
        changes: GameChanges,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Load a user by id.
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Load the user owning `email`.
    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Insert `user` unless another user already owns its email. Resolves to the stored user.
    fn register_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<UserEntity>>;
    /// Open a transaction spanning games and users.
    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn StoreTransaction>>>;
    /// Ping the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish a lost connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Writes staged inside a transaction become visible together on [`commit`], or not at all.
///
/// Dropping a transaction without committing discards it.
///
/// [`commit`]: StoreTransaction::commit
pub trait StoreTransaction: Send {
    /// Load the user owning `email` as seen by this transaction.
    fn find_user_by_email(
        &mut self,
        email: String,
    ) -> BoxFuture<'_, StorageResult<Option<UserEntity>>>;
    /// Stage a new game.
    fn insert_game(&mut self, game: GameEntity) -> BoxFuture<'_, StorageResult<()>>;
    /// Resolves to whether a game was removed.
    fn remove_game(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<bool>>;
    /// Append `game_id` to the user's `all_games`.
    fn link_game(&mut self, user_id: Uuid, game_id: Uuid) -> BoxFuture<'_, StorageResult<()>>;
    /// Pull every occurrence of `game_id` from the user's `all_games`.
    fn unlink_game(&mut self, user_id: Uuid, game_id: Uuid)
    -> BoxFuture<'_, StorageResult<()>>;
    /// Publish every staged write, or fail leaving the store untouched.
    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>>;
    /// Discard every staged write.
    fn abort(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>>;
}
