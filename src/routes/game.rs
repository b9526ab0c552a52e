use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, header::ACCESS_CONTROL_EXPOSE_HEADERS},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        common::MessageResponse,
        game::{
            CreateGameRequest, GameDetailResponse, GameResponse, ListGamesQuery,
            UpdateGameRequest,
        },
    },
    error::AppError,
    routes::extract::{AppJson, AppPath, AppQuery},
    services::game_service,
    state::SharedState,
};

/// Header carrying the number of games matching a listing's filter.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Routes serving game listings.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/games", get(list_games).post(create_game))
        .route(
            "/api/v1/games/{id}",
            get(get_game).patch(update_game).delete(delete_game),
        )
}

/// List games matching the filters, one page at a time.
#[utoipa::path(
    get,
    path = "/api/v1/games",
    tag = "games",
    params(ListGamesQuery),
    responses(
        (status = 200, description = "Page of games; total matches in `x-total-count`", body = [GameResponse],
            headers(("x-total-count" = u64, description = "Number of games matching the filter"))),
        (status = 500, description = "Listing failed", body = MessageResponse)
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
    AppQuery(query): AppQuery<ListGamesQuery>,
) -> Result<(HeaderMap, Json<Vec<GameResponse>>), AppError> {
    let listing = game_service::list_games(&state, query).await?;

    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(listing.total));
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(TOTAL_COUNT_HEADER),
    );
    Ok((headers, Json(listing.games)))
}

/// Fetch one game with its creator expanded.
#[utoipa::path(
    get,
    path = "/api/v1/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game found", body = GameDetailResponse),
        (status = 404, description = "Game not found", body = MessageResponse),
        (status = 500, description = "Lookup failed", body = MessageResponse)
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<GameDetailResponse>, AppError> {
    let game = game_service::get_game_detail(&state, id).await?;
    Ok(Json(game))
}

/// Publish a game on behalf of the user owning `email`.
#[utoipa::path(
    post,
    path = "/api/v1/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game created", body = MessageResponse),
        (status = 500, description = "Creation failed", body = MessageResponse)
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    AppJson(payload): AppJson<CreateGameRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    game_service::create_game(&state, payload).await?;
    Ok(Json(MessageResponse::new("Game created successfully")))
}

/// Update the supplied fields of a game.
#[utoipa::path(
    patch,
    path = "/api/v1/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = MessageResponse),
        (status = 500, description = "Update failed", body = MessageResponse)
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateGameRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    game_service::update_game(&state, id, payload).await?;
    Ok(Json(MessageResponse::new("Game updated successfully")))
}

/// Delete a game and detach it from its creator.
#[utoipa::path(
    delete,
    path = "/api/v1/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game deleted", body = MessageResponse),
        (status = 500, description = "Deletion failed", body = MessageResponse)
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    game_service::delete_game(&state, id).await?;
    Ok(Json(MessageResponse::new("Game deleted successfully")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header::CONTENT_TYPE},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{
        dao::{
            game_store::{GameStore, memory::MemoryGameStore},
            models::{GameQuery, UserEntity},
        },
        routes::app,
        state::AppState,
        testing::FakeImageStore,
    };

    async fn setup() -> (axum::Router, MemoryGameStore, UserEntity) {
        let store = MemoryGameStore::new();
        let user = UserEntity {
            id: uuid::Uuid::new_v4(),
            name: "U".into(),
            email: "u@x.com".into(),
            avatar: "https://img.test/avatar".into(),
            all_games: Vec::new(),
        };
        store.register_user(user.clone()).await.unwrap();

        let state = AppState::new(Arc::new(FakeImageStore::hosting()));
        state.set_game_store(Arc::new(store.clone())).await;
        (app(state), store, user)
    }

    async fn send(app: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn game(title: &str) -> Value {
        json!({
            "title": title,
            "description": "D",
            "gameType": "RPG",
            "price": 10,
            "photo": "img1",
            "email": "u@x.com"
        })
    }

    #[tokio::test]
    async fn create_then_fetch_detail() {
        let (app, store, user) = setup().await;

        let response = send(&app, Method::POST, "/api/v1/games", Some(game("A"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"message": "Game created successfully"})
        );

        let stored = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.all_games.len(), 1);

        let uri = format!("/api/v1/games/{}", stored.all_games[0]);
        let response = send(&app, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["creator"]["email"], "u@x.com");
        assert_eq!(body["photo"], "https://img.test/img1");
    }

    #[tokio::test]
    async fn listing_sets_total_count_header() {
        let (app, _, _) = setup().await;
        for title in ["A", "B", "C"] {
            send(&app, Method::POST, "/api/v1/games", Some(game(title))).await;
        }

        let response = send(
            &app,
            Method::GET,
            "/api/v1/games?_start=1&_end=3&_sort=title&_order=DESC",
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-total-count"], "3");
        assert_eq!(
            response.headers()["access-control-expose-headers"],
            "x-total-count"
        );
        let body = json_body(response).await;
        let titles: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|game| game["title"].clone())
            .collect();
        assert_eq!(titles, vec![json!("B"), json!("A")]);
    }

    #[tokio::test]
    async fn missing_game_detail_is_404() {
        let (app, _, _) = setup().await;

        let uri = format!("/api/v1/games/{}", uuid::Uuid::new_v4());
        let response = send(&app, Method::GET, &uri, None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({"message": "Game not found"}));
    }

    #[tokio::test]
    async fn missing_game_delete_is_500() {
        let (app, _, _) = setup().await;

        let uri = format!("/api/v1/games/{}", uuid::Uuid::new_v4());
        let response = send(&app, Method::DELETE, &uri, None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({"message": "Game not found"}));
    }

    #[tokio::test]
    async fn unknown_creator_email_is_500() {
        let (app, store, _) = setup().await;
        let mut payload = game("A");
        payload["email"] = json!("nobody@x.com");

        let response = send(&app, Method::POST, "/api/v1/games", Some(payload)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({"message": "User not found"}));
        let page = store.list_games(GameQuery::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn update_and_delete_acknowledge() {
        let (app, store, user) = setup().await;
        send(&app, Method::POST, "/api/v1/games", Some(game("A"))).await;
        let id = store.find_user(user.id).await.unwrap().unwrap().all_games[0];
        let uri = format!("/api/v1/games/{id}");

        let response = send(&app, Method::PATCH, &uri, Some(json!({"price": "15"}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"message": "Game updated successfully"})
        );

        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"message": "Game deleted successfully"})
        );
        assert!(store.find_user(user.id).await.unwrap().unwrap().all_games.is_empty());
    }

    #[tokio::test]
    async fn malformed_requests_use_the_message_channel() {
        let (app, _, _) = setup().await;

        let response = send(&app, Method::GET, "/api/v1/games/not-a-uuid", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_body(response).await["message"].is_string());

        let response = send(&app, Method::GET, "/api/v1/games?_sort=rating", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_body(response).await["message"].is_string());
    }
}
