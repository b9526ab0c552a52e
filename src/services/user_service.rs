use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::UserEntity,
    dto::user::{CreateUserRequest, UserDetailResponse, UserResponse},
    error::ServiceError,
    services::game_service::USER_NOT_FOUND,
    state::SharedState,
};

/// Return the user owning `request.email`, creating it first when nobody does.
pub async fn register_user(
    state: &SharedState,
    request: CreateUserRequest,
) -> Result<UserResponse, ServiceError> {
    request.validate()?;
    let CreateUserRequest {
        name: Some(name),
        email: Some(email),
        avatar: Some(avatar),
    } = request
    else {
        return Err(ServiceError::InvalidInput("missing user fields".into()));
    };

    let store = state.require_game_store().await?;
    let candidate = UserEntity {
        id: Uuid::new_v4(),
        name,
        email,
        avatar,
        all_games: Vec::new(),
    };
    let candidate_id = candidate.id;
    let user = store.register_user(candidate).await?;
    if user.id == candidate_id {
        info!(user_id = %user.id, "user registered");
    }

    Ok(user.into())
}

/// Load a user with their games expanded, in publication order.
pub async fn get_user(state: &SharedState, id: Uuid) -> Result<UserDetailResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let Some(user) = store.find_user(id).await? else {
        return Err(ServiceError::NotFound(USER_NOT_FOUND.into()));
    };

    let games = store.find_games(user.all_games).await?;
    Ok(UserDetailResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        avatar: user.avatar,
        all_games: games.into_iter().map(Into::into).collect(),
    })
}
