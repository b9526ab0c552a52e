use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Gamer Lane Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::list_games,
        crate::routes::game::get_game,
        crate::routes::game::create_game,
        crate::routes::game::update_game,
        crate::routes::game::delete_game,
        crate::routes::user::register_user,
        crate::routes::user::get_user,
    ),
    components(
        schemas(
            crate::dto::common::MessageResponse,
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::UpdateGameRequest,
            crate::dto::game::GameResponse,
            crate::dto::game::GameDetailResponse,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::UserResponse,
            crate::dto::user::UserDetailResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Game listings"),
        (name = "users", description = "Marketplace users"),
    )
)]
/// Entry point for the generated document.
pub struct ApiDoc;
