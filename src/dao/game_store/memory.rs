//! In-process storage backend used by tests and by `STORE_BACKEND=memory`.

use std::{cmp::Ordering, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dao::{
    game_store::{GameStore, StoreTransaction},
    models::{
        GameChanges, GameDetailEntity, GameEntity, GamePage, GameQuery, SortField, SortOrder,
        UserEntity,
    },
    storage::{StorageError, StorageResult},
};

/// Store keeping games and users in insertion order behind a single async mutex.
///
/// Transactions buffer their writes and apply them under one lock acquisition at commit, so
/// readers observe either none or all of them.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    games: IndexMap<Uuid, GameEntity>,
    users: IndexMap<Uuid, UserEntity>,
}

impl MemoryGameStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryState {
    fn list_games(&self, query: &GameQuery) -> StorageResult<GamePage> {
        let title_matcher = query
            .filter
            .title_pattern()
            .map(|pattern| case_insensitive(&pattern))
            .transpose()?;

        let mut matching: Vec<&GameEntity> = self
            .games
            .values()
            .filter(|game| {
                query
                    .filter
                    .game_type
                    .as_deref()
                    .is_none_or(|game_type| game.game_type == game_type)
            })
            .filter(|game| {
                title_matcher
                    .as_ref()
                    .is_none_or(|matcher| matcher.is_match(&game.title))
            })
            .collect();

        let total = matching.len() as u64;

        if let Some(sort) = query.sort {
            matching.sort_by(|a, b| {
                let ordering = compare_by(a, b, sort.field);
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let take = query
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        let games = matching.into_iter().skip(skip).take(take).cloned().collect();
        Ok(GamePage { games, total })
    }

    fn find_user_by_email(&self, email: &str) -> Option<UserEntity> {
        self.users.values().find(|user| user.email == email).cloned()
    }
}

fn case_insensitive(pattern: &str) -> StorageResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| StorageError::operation("invalid title filter".into(), err))
}

fn compare_by(a: &GameEntity, b: &GameEntity, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Description => a.description.cmp(&b.description),
        SortField::GameType => a.game_type.cmp(&b.game_type),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::Photo => a.photo.cmp(&b.photo),
    }
}

impl GameStore for MemoryGameStore {
    fn list_games(&self, query: GameQuery) -> BoxFuture<'static, StorageResult<GamePage>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.lock().await.list_games(&query) })
    }

    fn find_game_detail(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameDetailEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let state = inner.lock().await;
            Ok(state.games.get(&id).cloned().map(|game| {
                let creator = game
                    .creator
                    .and_then(|creator_id| state.users.get(&creator_id).cloned());
                GameDetailEntity { game, creator }
            }))
        })
    }

    fn find_games(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let state = inner.lock().await;
            Ok(ids
                .iter()
                .filter_map(|id| state.games.get(id).cloned())
                .collect())
        })
    }

    fn update_game(
        &self,
        id: Uuid,
        changes: GameChanges,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            match state.games.get_mut(&id) {
                Some(game) => {
                    changes.apply_to(game);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.lock().await.users.get(&id).cloned()) })
    }

    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.lock().await.find_user_by_email(&email)) })
    }

    fn register_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut state = inner.lock().await;
            if let Some(existing) = state.find_user_by_email(&user.email) {
                return Ok(existing);
            }
            state.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn StoreTransaction>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(Box::new(MemoryTransaction {
                inner,
                writes: Vec::new(),
            }) as Box<dyn StoreTransaction>)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// A write recorded by a transaction, applied only on commit.
#[derive(Debug, Clone)]
enum StagedWrite {
    InsertGame(GameEntity),
    RemoveGame(Uuid),
    LinkGame { user_id: Uuid, game_id: Uuid },
    UnlinkGame { user_id: Uuid, game_id: Uuid },
}

/// Commit-time conflicts with writes made since the transaction read the store.
#[derive(Debug, Error)]
enum CommitConflict {
    #[error("user `{0}` no longer exists")]
    MissingUser(Uuid),
    #[error("game `{0}` no longer exists")]
    MissingGame(Uuid),
}

impl MemoryState {
    fn apply(&mut self, write: StagedWrite) -> Result<(), CommitConflict> {
        match write {
            StagedWrite::InsertGame(game) => {
                self.games.insert(game.id, game);
            }
            StagedWrite::RemoveGame(id) => {
                self.games
                    .shift_remove(&id)
                    .ok_or(CommitConflict::MissingGame(id))?;
            }
            StagedWrite::LinkGame { user_id, game_id } => {
                let user = self
                    .users
                    .get_mut(&user_id)
                    .ok_or(CommitConflict::MissingUser(user_id))?;
                user.all_games.push(game_id);
            }
            StagedWrite::UnlinkGame { user_id, game_id } => {
                if let Some(user) = self.users.get_mut(&user_id) {
                    user.all_games.retain(|id| *id != game_id);
                }
            }
        }
        Ok(())
    }
}

/// Records writes without holding the store lock; the lock is taken only while committing.
struct MemoryTransaction {
    inner: Arc<Mutex<MemoryState>>,
    writes: Vec<StagedWrite>,
}

impl MemoryTransaction {
    /// Whether the game exists once this transaction's own writes are taken into account.
    async fn game_visible(&self, id: Uuid) -> bool {
        for write in self.writes.iter().rev() {
            match write {
                StagedWrite::InsertGame(game) if game.id == id => return true,
                StagedWrite::RemoveGame(removed) if *removed == id => return false,
                _ => {}
            }
        }
        self.inner.lock().await.games.contains_key(&id)
    }
}

impl StoreTransaction for MemoryTransaction {
    fn find_user_by_email(
        &mut self,
        email: String,
    ) -> BoxFuture<'_, StorageResult<Option<UserEntity>>> {
        Box::pin(async move { Ok(self.inner.lock().await.find_user_by_email(&email)) })
    }

    fn insert_game(&mut self, game: GameEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.writes.push(StagedWrite::InsertGame(game));
            Ok(())
        })
    }

    fn remove_game(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<bool>> {
        Box::pin(async move {
            if !self.game_visible(id).await {
                return Ok(false);
            }
            self.writes.push(StagedWrite::RemoveGame(id));
            Ok(true)
        })
    }

    fn link_game(&mut self, user_id: Uuid, game_id: Uuid) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.writes.push(StagedWrite::LinkGame { user_id, game_id });
            Ok(())
        })
    }

    fn unlink_game(
        &mut self,
        user_id: Uuid,
        game_id: Uuid,
    ) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.writes.push(StagedWrite::UnlinkGame { user_id, game_id });
            Ok(())
        })
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move {
            let MemoryTransaction { inner, writes } = *self;
            let mut live = inner.lock().await;

            let mut next = live.clone();
            for write in writes {
                next.apply(write).map_err(|conflict| {
                    StorageError::operation("transaction commit rejected".into(), conflict)
                })?;
            }
            *live = next;
            Ok(())
        })
    }

    fn abort(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move {
            drop(self);
            Ok(())
        })
    }
}
