use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::UserEntity,
    dto::game::GameResponse,
};

/// Payload used to register a user, or fetch the one already owning `email`.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Display name.
    #[validate(required(message = "name is required"), length(min = 1))]
    pub name: Option<String>,
    /// Unique email identifying the user.
    #[validate(required(message = "email is required"), length(min = 1))]
    pub email: Option<String>,
    /// Avatar URL, stored as given.
    #[validate(required(message = "avatar is required"), length(min = 1))]
    pub avatar: Option<String>,
}

/// User with game references left as ids.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User id, serialized as `_id`.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique email.
    pub email: String,
    /// Avatar URL.
    pub avatar: String,
    /// Ids of the games the user published, oldest first.
    pub all_games: Vec<Uuid>,
}

/// User with their games expanded.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailResponse {
    /// User id, serialized as `_id`.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique email.
    pub email: String,
    /// Avatar URL.
    pub avatar: String,
    /// Games the user published, oldest first.
    pub all_games: Vec<GameResponse>,
}

impl From<UserEntity> for UserResponse {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            all_games: user.all_games,
        }
    }
}
