use axum::{Json, Router, extract::State, routing::{get, post}};
use uuid::Uuid;

use crate::{
    dto::{
        common::MessageResponse,
        user::{CreateUserRequest, UserDetailResponse, UserResponse},
    },
    error::AppError,
    routes::extract::{AppJson, AppPath},
    services::user_service,
    state::SharedState,
};

/// Routes managing marketplace users.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/users", post(register_user))
        .route("/api/v1/users/{id}", get(get_user))
}

/// Register a user, or return the one already owning the email.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User registered or found", body = UserResponse),
        (status = 500, description = "Registration failed", body = MessageResponse)
    )
)]
pub async fn register_user(
    State(state): State<SharedState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service::register_user(&state, payload).await?;
    Ok(Json(user))
}

/// Fetch a user with their games expanded.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "Identifier of the user")),
    responses(
        (status = 200, description = "User found", body = UserDetailResponse),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 500, description = "Lookup failed", body = MessageResponse)
    )
)]
pub async fn get_user(
    State(state): State<SharedState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<UserDetailResponse>, AppError> {
    let user = user_service::get_user(&state, id).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{
        dao::game_store::memory::MemoryGameStore, routes::app, state::AppState,
        testing::FakeImageStore,
    };

    #[tokio::test]
    async fn register_then_fetch() {
        let state = AppState::new(Arc::new(FakeImageStore::hosting()));
        state.set_game_store(Arc::new(MemoryGameStore::new())).await;
        let app = app(state);

        let request = Request::post("/api/v1/users")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"name": "U", "email": "u@x.com", "avatar": "a.png"}).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let user: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(user["allGames"], json!([]));

        let uri = format!("/api/v1/users/{}", user["_id"].as_str().unwrap());
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let uri = format!("/api/v1/users/{}", uuid::Uuid::new_v4());
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"message": "User not found"}));
    }
}
