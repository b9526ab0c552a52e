//! Business logic behind the game routes. Creation and deletion keep the creator's
//! `all_games` in step with the games collection through a store transaction.

use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        game_store::StoreTransaction,
        image_store::{ImageStore, ImageStoreError},
        models::{GameChanges, GameEntity, GameFilter, GameQuery, SortField, SortOrder, SortSpec},
    },
    dto::game::{
        CreateGameRequest, GameDetailResponse, GameListing, ListGamesQuery, UpdateGameRequest,
    },
    error::ServiceError,
    state::SharedState,
};

/// Message reported when no game has the requested id.
pub const GAME_NOT_FOUND: &str = "Game not found";
/// Message reported when no user matches the requested id or email.
pub const USER_NOT_FOUND: &str = "User not found";

/// Return one page of games matching the query along with the total number of matches.
pub async fn list_games(
    state: &SharedState,
    query: ListGamesQuery,
) -> Result<GameListing, ServiceError> {
    let query = build_query(query)?;
    let store = state.require_game_store().await?;
    let page = store.list_games(query).await?;

    Ok(GameListing {
        games: page.games.into_iter().map(Into::into).collect(),
        total: page.total,
    })
}

/// Load a game with its creator expanded.
pub async fn get_game_detail(
    state: &SharedState,
    id: Uuid,
) -> Result<GameDetailResponse, ServiceError> {
    let store = state.require_game_store().await?;
    match store.find_game_detail(id).await? {
        Some(detail) => Ok(detail.into()),
        None => Err(ServiceError::NotFound(GAME_NOT_FOUND.into())),
    }
}

/// Publish a game for the user owning `request.email`, linking it to that user atomically.
pub async fn create_game(state: &SharedState, request: CreateGameRequest) -> Result<(), ServiceError> {
    request.validate()?;
    let CreateGameRequest {
        title: Some(title),
        description: Some(description),
        game_type: Some(game_type),
        price: Some(price),
        photo: Some(photo),
        email: Some(email),
    } = request
    else {
        return Err(ServiceError::InvalidInput("missing game fields".into()));
    };

    let store = state.require_game_store().await?;
    let images = state.image_store();
    let game = GameEntity {
        id: Uuid::new_v4(),
        title,
        description,
        game_type,
        price,
        photo: String::new(),
        creator: None,
    };

    let mut tx = store.begin().await?;
    let staged = stage_creation(tx.as_mut(), images.as_ref(), game, email, photo).await;
    let game_id = finish_transaction(tx, staged).await?;

    info!(%game_id, "game created");
    Ok(())
}

async fn stage_creation(
    tx: &mut dyn StoreTransaction,
    images: &dyn ImageStore,
    mut game: GameEntity,
    email: String,
    photo: String,
) -> Result<Uuid, ServiceError> {
    let Some(user) = tx.find_user_by_email(email).await? else {
        return Err(ServiceError::Failed(USER_NOT_FOUND.into()));
    };

    let hosted = images.upload(photo).await?;
    game.photo = hosted
        .usable_url()
        .ok_or(ImageStoreError::MissingUrl)?
        .to_owned();
    game.creator = Some(user.id);

    let game_id = game.id;
    tx.insert_game(game).await?;
    tx.link_game(user.id, game_id).await?;
    Ok(game_id)
}

/// Apply a partial update. Succeeds even when no game carries `id`.
pub async fn update_game(
    state: &SharedState,
    id: Uuid,
    request: UpdateGameRequest,
) -> Result<(), ServiceError> {
    request.validate()?;
    let store = state.require_game_store().await?;

    let photo = match request.photo {
        Some(payload) => {
            let hosted = state.image_store().upload(payload.clone()).await?;
            match hosted.usable_url() {
                Some(url) => Some(url.to_owned()),
                None => {
                    debug!(game_id = %id, "image store returned no URL; keeping supplied photo");
                    Some(payload)
                }
            }
        }
        None => None,
    };

    let changes = GameChanges {
        title: request.title,
        description: request.description,
        game_type: request.game_type,
        price: request.price,
        photo,
    };

    if changes.is_empty() {
        debug!(game_id = %id, "empty game update; nothing to write");
        return Ok(());
    }

    if !store.update_game(id, changes).await? {
        debug!(game_id = %id, "game update matched no document");
    }
    Ok(())
}

/// Remove a game and pull it from its creator's games atomically.
pub async fn delete_game(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_game_store().await?;
    let Some(detail) = store.find_game_detail(id).await? else {
        return Err(ServiceError::Failed(GAME_NOT_FOUND.into()));
    };

    let mut tx = store.begin().await?;
    let staged = stage_deletion(tx.as_mut(), id, detail.game.creator).await;
    finish_transaction(tx, staged).await?;

    info!(game_id = %id, "game deleted");
    Ok(())
}

async fn stage_deletion(
    tx: &mut dyn StoreTransaction,
    id: Uuid,
    creator: Option<Uuid>,
) -> Result<(), ServiceError> {
    if !tx.remove_game(id).await? {
        return Err(ServiceError::Failed(GAME_NOT_FOUND.into()));
    }
    if let Some(user_id) = creator {
        tx.unlink_game(user_id, id).await?;
    }
    Ok(())
}

/// Commit when staging succeeded, abort otherwise.
async fn finish_transaction<T>(
    tx: Box<dyn StoreTransaction>,
    staged: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    match staged {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(abort_err) = tx.abort().await {
                warn!(error = %abort_err, "failed to abort transaction");
            }
            Err(err)
        }
    }
}

fn build_query(query: ListGamesQuery) -> Result<GameQuery, ServiceError> {
    let non_empty = |value: Option<String>| value.filter(|value| !value.is_empty());

    let sort = match non_empty(query.sort) {
        Some(name) => {
            let field = SortField::parse(&name).ok_or_else(|| {
                ServiceError::InvalidInput(format!("unsupported sort field `{name}`"))
            })?;
            let order = match non_empty(query.order) {
                Some(order) => SortOrder::parse(&order).ok_or_else(|| {
                    ServiceError::InvalidInput(format!("unsupported sort order `{order}`"))
                })?,
                None => SortOrder::default(),
            };
            Some(SortSpec { field, order })
        }
        None => None,
    };

    let skip = query.start.unwrap_or(0);
    Ok(GameQuery {
        filter: GameFilter {
            game_type: non_empty(query.game_type),
            title_like: non_empty(query.title_like),
        },
        sort,
        skip,
        limit: query.end.map(|end| end.saturating_sub(skip)),
    })
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::time::Instant;

    use super::*;
    use crate::{
        dao::{
            game_store::{GameStore, memory::MemoryGameStore},
            models::UserEntity,
        },
        state::AppState,
        testing::FakeImageStore,
    };

    struct Fixture {
        state: SharedState,
        store: MemoryGameStore,
        images: FakeImageStore,
        user: UserEntity,
    }

    async fn fixture(images: FakeImageStore) -> Fixture {
        let store = MemoryGameStore::new();
        let user = UserEntity {
            id: Uuid::new_v4(),
            name: "U".into(),
            email: "u@x.com".into(),
            avatar: "https://img.test/avatar".into(),
            all_games: Vec::new(),
        };
        store.register_user(user.clone()).await.unwrap();

        let state = AppState::new(Arc::new(images.clone()));
        state.set_game_store(Arc::new(store.clone())).await;
        Fixture {
            state,
            store,
            images,
            user,
        }
    }

    fn create_request(title: &str, email: &str) -> CreateGameRequest {
        CreateGameRequest {
            title: Some(title.into()),
            description: Some("D".into()),
            game_type: Some("RPG".into()),
            price: Some(10.0),
            photo: Some("img1".into()),
            email: Some(email.into()),
        }
    }

    async fn all_games(store: &MemoryGameStore) -> Vec<GameEntity> {
        store.list_games(GameQuery::default()).await.unwrap().games
    }

    #[tokio::test]
    async fn create_links_game_to_its_creator() {
        let fx = fixture(FakeImageStore::hosting()).await;

        create_game(&fx.state, create_request("A", "u@x.com"))
            .await
            .unwrap();

        let games = all_games(&fx.store).await;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].creator, Some(fx.user.id));
        assert_eq!(games[0].photo, "https://img.test/img1");

        let user = fx.store.find_user(fx.user.id).await.unwrap().unwrap();
        assert_eq!(user.all_games, vec![games[0].id]);

        let detail = get_game_detail(&fx.state, games[0].id).await.unwrap();
        assert_eq!(detail.creator.unwrap().email, "u@x.com");
    }

    #[tokio::test]
    async fn create_for_unknown_email_changes_nothing() {
        let fx = fixture(FakeImageStore::hosting()).await;

        let err = create_game(&fx.state, create_request("A", "nobody@x.com"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), USER_NOT_FOUND);
        assert!(all_games(&fx.store).await.is_empty());
        assert!(fx.images.uploads().is_empty());
    }

    #[tokio::test]
    async fn create_with_failed_upload_changes_nothing() {
        for images in [FakeImageStore::rejecting(), FakeImageStore::without_url()] {
            let fx = fixture(images).await;

            let result = create_game(&fx.state, create_request("A", "u@x.com")).await;

            assert!(matches!(result, Err(ServiceError::Image(_))));
            assert!(all_games(&fx.store).await.is_empty());
            let user = fx.store.find_user(fx.user.id).await.unwrap().unwrap();
            assert!(user.all_games.is_empty());
        }
    }

    #[tokio::test]
    async fn create_requires_every_field() {
        let fx = fixture(FakeImageStore::hosting()).await;
        let mut request = create_request("A", "u@x.com");
        request.price = None;

        let err = create_game(&fx.state, request).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput(ref m) if m.contains("price")));
        assert!(all_games(&fx.store).await.is_empty());
    }

    #[tokio::test]
    async fn delete_pulls_game_from_creator() {
        let fx = fixture(FakeImageStore::hosting()).await;
        create_game(&fx.state, create_request("A", "u@x.com"))
            .await
            .unwrap();
        create_game(&fx.state, create_request("B", "u@x.com"))
            .await
            .unwrap();
        let games = all_games(&fx.store).await;

        delete_game(&fx.state, games[0].id).await.unwrap();

        let remaining = all_games(&fx.store).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, games[1].id);
        let user = fx.store.find_user(fx.user.id).await.unwrap().unwrap();
        assert_eq!(user.all_games, vec![games[1].id]);
    }

    #[tokio::test]
    async fn delete_of_missing_game_is_a_generic_failure() {
        let fx = fixture(FakeImageStore::hosting()).await;

        let err = delete_game(&fx.state, Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, ServiceError::Failed(ref m) if m == GAME_NOT_FOUND));
    }

    #[tokio::test]
    async fn detail_of_missing_game_is_not_found() {
        let fx = fixture(FakeImageStore::hosting()).await;

        let err = get_game_detail(&fx.state, Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(ref m) if m == GAME_NOT_FOUND));
    }

    #[tokio::test]
    async fn update_rehosts_photo_or_keeps_payload() {
        let fx = fixture(FakeImageStore::hosting()).await;
        create_game(&fx.state, create_request("A", "u@x.com"))
            .await
            .unwrap();
        let id = all_games(&fx.store).await[0].id;

        update_game(
            &fx.state,
            id,
            UpdateGameRequest {
                photo: Some("img2".into()),
                price: Some(20.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let game = &all_games(&fx.store).await[0];
        assert_eq!(game.photo, "https://img.test/img2");
        assert_eq!(game.price, 20.0);
        assert_eq!(game.title, "A");

        let no_url = AppState::new(Arc::new(FakeImageStore::without_url()));
        no_url.set_game_store(Arc::new(fx.store.clone())).await;
        update_game(
            &no_url,
            id,
            UpdateGameRequest {
                photo: Some("raw-payload".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(all_games(&fx.store).await[0].photo, "raw-payload");
    }

    #[tokio::test]
    async fn update_of_missing_game_succeeds() {
        let fx = fixture(FakeImageStore::hosting()).await;

        let request = UpdateGameRequest {
            title: Some("Z".into()),
            ..Default::default()
        };
        update_game(&fx.state, Uuid::new_v4(), request).await.unwrap();
        update_game(&fx.state, Uuid::new_v4(), UpdateGameRequest::default())
            .await
            .unwrap();

        assert!(all_games(&fx.store).await.is_empty());
    }

    #[tokio::test]
    async fn listing_reports_total_for_the_filter() {
        let fx = fixture(FakeImageStore::hosting()).await;
        for title in ["Alpha", "Beta", "alphabet"] {
            create_game(&fx.state, create_request(title, "u@x.com"))
                .await
                .unwrap();
        }

        let listing = list_games(
            &fx.state,
            ListGamesQuery {
                title_like: Some("ALPHA".into()),
                sort: Some("title".into()),
                order: Some("desc".into()),
                start: Some(0),
                end: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(listing.total, 2);
        assert_eq!(listing.games.len(), 1);
        assert_eq!(listing.games[0].title, "alphabet");
    }

    #[tokio::test(start_paused = true)]
    async fn listing_does_not_wait_for_a_pending_upload() {
        let fx = fixture(FakeImageStore::slow(Duration::from_secs(30))).await;
        let creating = tokio::spawn({
            let state = fx.state.clone();
            async move { create_game(&state, create_request("A", "u@x.com")).await }
        });
        while fx.images.uploads().is_empty() {
            tokio::task::yield_now().await;
        }

        let started = Instant::now();
        let listing = list_games(&fx.state, ListGamesQuery::default())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(listing.total, 0);

        creating.await.unwrap().unwrap();
        let listing = list_games(&fx.state, ListGamesQuery::default())
            .await
            .unwrap();
        assert_eq!(listing.total, 1);
    }

    #[test]
    fn query_translation() {
        let query = build_query(ListGamesQuery {
            start: Some(10),
            end: Some(5),
            game_type: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(query.skip, 10);
        assert_eq!(query.limit, Some(0));
        assert_eq!(query.filter, GameFilter::default());
        assert!(query.sort.is_none());

        let err = build_query(ListGamesQuery {
            sort: Some("rating".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn degraded_state_refuses_requests() {
        let state = AppState::new(Arc::new(FakeImageStore::hosting()));

        let err = list_games(&state, ListGamesQuery::default()).await.unwrap_err();

        assert!(matches!(err, ServiceError::Degraded));
    }
}
