use futures::future::BoxFuture;
use mongodb::{ClientSession, Collection, Database, bson::doc};
use uuid::Uuid;

use super::{
    error::MongoDaoError,
    models::{
        GAME_COLLECTION_NAME, MongoGameDocument, MongoUserDocument, USER_COLLECTION_NAME,
        bson_uuid, doc_id,
    },
};
use crate::dao::{
    game_store::StoreTransaction,
    models::{GameEntity, UserEntity},
    storage::StorageResult,
};

/// Multi-document transaction bound to a client session.
///
/// The driver aborts an in-progress transaction when its session is dropped.
pub struct MongoTransaction {
    session: ClientSession,
    games: Collection<MongoGameDocument>,
    users: Collection<MongoUserDocument>,
}

impl MongoTransaction {
    pub(super) fn new(session: ClientSession, database: &Database) -> Self {
        Self {
            session,
            games: database.collection(GAME_COLLECTION_NAME),
            users: database.collection(USER_COLLECTION_NAME),
        }
    }
}

impl StoreTransaction for MongoTransaction {
    fn find_user_by_email(
        &mut self,
        email: String,
    ) -> BoxFuture<'_, StorageResult<Option<UserEntity>>> {
        Box::pin(async move {
            let document = self
                .users
                .find_one(doc! {"email": email.as_str()})
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::LoadUser { key: email, source })?;
            Ok(document.map(Into::into))
        })
    }

    fn insert_game(&mut self, game: GameEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let id = game.id;
            let document: MongoGameDocument = game.into();
            self.games
                .insert_one(&document)
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::SaveGame { id, source })?;
            Ok(())
        })
    }

    fn remove_game(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<bool>> {
        Box::pin(async move {
            let result = self
                .games
                .delete_one(doc_id(id))
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::DeleteGame { id, source })?;
            Ok(result.deleted_count > 0)
        })
    }

    fn link_game(&mut self, user_id: Uuid, game_id: Uuid) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.users
                .update_one(
                    doc_id(user_id),
                    doc! {"$push": {"allGames": bson_uuid(game_id)}},
                )
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::SaveUser {
                    id: user_id,
                    source,
                })?;
            Ok(())
        })
    }

    fn unlink_game(
        &mut self,
        user_id: Uuid,
        game_id: Uuid,
    ) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.users
                .update_one(
                    doc_id(user_id),
                    doc! {"$pull": {"allGames": bson_uuid(game_id)}},
                )
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::SaveUser {
                    id: user_id,
                    source,
                })?;
            Ok(())
        })
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move {
            let MongoTransaction { mut session, .. } = *self;
            session
                .commit_transaction()
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    step: "commit",
                    source,
                })?;
            Ok(())
        })
    }

    fn abort(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move {
            let MongoTransaction { mut session, .. } = *self;
            session
                .abort_transaction()
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    step: "abort",
                    source,
                })?;
            Ok(())
        })
    }
}
