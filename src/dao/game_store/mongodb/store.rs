use std::{collections::HashMap, sync::Arc};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Bson, Document, doc},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        GAME_COLLECTION_NAME, MongoGameDocument, MongoUserDocument, USER_COLLECTION_NAME,
        bson_uuid, doc_id, filter_document, set_document, sort_document,
    },
    transaction::MongoTransaction,
};
use crate::dao::{
    game_store::{GameStore, StoreTransaction},
    models::{GameChanges, GameDetailEntity, GameEntity, GamePage, GameQuery, UserEntity},
    storage::StorageResult,
};

/// [`GameStore`] backed by MongoDB, reconnecting in place when the server goes away.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let games = self.games().await;
        for (field, name) in [("gameType", "game_type_idx"), ("title", "game_title_idx")] {
            let mut keys = Document::new();
            keys.insert(field, 1);
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(Some(name.to_owned())).build())
                .build();
            games
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: GAME_COLLECTION_NAME,
                    index: field,
                    source,
                })?;
        }

        // Registration upserts on email; the unique index makes racing upserts converge.
        let users = self.users().await;
        let index = IndexModel::builder()
            .keys(doc! {"email": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("user_email_idx".to_owned()))
                    .unique(true)
                    .build(),
            )
            .build();
        users
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: USER_COLLECTION_NAME,
                index: "email",
                source,
            })?;

        Ok(())
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn users(&self) -> Collection<MongoUserDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoUserDocument>(USER_COLLECTION_NAME)
    }

    async fn list_games(&self, query: GameQuery) -> MongoResult<GamePage> {
        let collection = self.games().await;
        let filter = filter_document(&query.filter);

        let total = collection
            .count_documents(filter.clone())
            .await
            .map_err(|source| MongoDaoError::CountGames { source })?;

        // A zero limit means "no limit" to MongoDB.
        if query.limit == Some(0) {
            return Ok(GamePage {
                games: Vec::new(),
                total,
            });
        }

        let mut find = collection.find(filter).skip(query.skip);
        if let Some(sort) = query.sort {
            find = find.sort(sort_document(sort));
        }
        if let Some(limit) = query.limit {
            find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let documents: Vec<MongoGameDocument> = find
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        Ok(GamePage {
            games: documents.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn find_game_detail(&self, id: Uuid) -> MongoResult<Option<GameDetailEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        let Some(document) = document else {
            return Ok(None);
        };

        let game: GameEntity = document.into();
        let creator = match game.creator {
            Some(creator_id) => self.find_user(creator_id).await?,
            None => None,
        };

        Ok(Some(GameDetailEntity { game, creator }))
    }

    async fn find_games(&self, ids: Vec<Uuid>) -> MongoResult<Vec<GameEntity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<_> = ids.iter().copied().map(bson_uuid).collect();
        let documents: Vec<MongoGameDocument> = self
            .games()
            .await
            .find(doc! {"_id": {"$in": keys}})
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        // Order games according to the requested id list
        let mut by_id: HashMap<Uuid, GameEntity> = documents
            .into_iter()
            .map(|document| {
                let game: GameEntity = document.into();
                (game.id, game)
            })
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn update_game(&self, id: Uuid, changes: GameChanges) -> MongoResult<bool> {
        let collection = self.games().await;
        let set = set_document(&changes);

        if set.is_empty() {
            let count = collection
                .count_documents(doc_id(id))
                .await
                .map_err(|source| MongoDaoError::UpdateGame { id, source })?;
            return Ok(count > 0);
        }

        let result = collection
            .update_one(doc_id(id), doc! {"$set": set})
            .await
            .map_err(|source| MongoDaoError::UpdateGame { id, source })?;

        debug!(%id, matched = result.matched_count, "applied game update");
        Ok(result.matched_count > 0)
    }

    async fn find_user(&self, id: Uuid) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadUser {
                key: id.to_string(),
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn find_user_by_email(&self, email: String) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .await
            .find_one(doc! {"email": email.as_str()})
            .await
            .map_err(|source| MongoDaoError::LoadUser { key: email, source })?;
        Ok(document.map(Into::into))
    }

    async fn register_user(&self, user: UserEntity) -> MongoResult<UserEntity> {
        let id = user.id;
        let all_games: Vec<Bson> = user
            .all_games
            .iter()
            .map(|game_id| Bson::from(bson_uuid(*game_id)))
            .collect();
        let on_insert = doc! {
            "_id": bson_uuid(id),
            "name": user.name.as_str(),
            "avatar": user.avatar.as_str(),
            "allGames": all_games,
        };

        let stored = self
            .users()
            .await
            .find_one_and_update(
                doc! {"email": user.email.as_str()},
                doc! {"$setOnInsert": on_insert},
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::SaveUser { id, source })?;

        Ok(stored.map(Into::into).unwrap_or(user))
    }

    async fn begin(&self) -> MongoResult<MongoTransaction> {
        let (client, database) = {
            let guard = self.inner.state.read().await;
            (guard.client.clone(), guard.database.clone())
        };

        let mut session =
            client
                .start_session()
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    step: "open",
                    source,
                })?;
        session
            .start_transaction()
            .await
            .map_err(|source| MongoDaoError::Transaction {
                step: "start",
                source,
            })?;

        Ok(MongoTransaction::new(session, &database))
    }
}

impl GameStore for MongoGameStore {
    fn list_games(&self, query: GameQuery) -> BoxFuture<'static, StorageResult<GamePage>> {
        let store = self.clone();
        Box::pin(async move { store.list_games(query).await.map_err(Into::into) })
    }

    fn find_game_detail(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameDetailEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game_detail(id).await.map_err(Into::into) })
    }

    fn find_games(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_games(ids).await.map_err(Into::into) })
    }

    fn update_game(
        &self,
        id: Uuid,
        changes: GameChanges,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.update_game(id, changes).await.map_err(Into::into) })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(id).await.map_err(Into::into) })
    }

    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user_by_email(email).await.map_err(Into::into) })
    }

    fn register_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let store = self.clone();
        Box::pin(async move { store.register_user(user).await.map_err(Into::into) })
    }

    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn StoreTransaction>>> {
        let store = self.clone();
        Box::pin(async move {
            let transaction = store.begin().await?;
            Ok(Box::new(transaction) as Box<dyn StoreTransaction>)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
