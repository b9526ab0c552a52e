use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as, skip_serializing_none};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    dao::models::{GameDetailEntity, GameEntity},
    dto::user::UserResponse,
};

/// Query string accepted by the listing endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListGamesQuery {
    /// Offset of the first game of the page.
    #[serde(rename = "_start")]
    pub start: Option<u64>,
    /// Offset one past the last game of the page.
    #[serde(rename = "_end")]
    pub end: Option<u64>,
    /// Field to sort by (`id`, `title`, `description`, `gameType`, `price`, `photo`).
    #[serde(rename = "_sort")]
    pub sort: Option<String>,
    /// `asc` or `desc`.
    #[serde(rename = "_order")]
    pub order: Option<String>,
    /// Case-insensitive substring the title must contain.
    pub title_like: Option<String>,
    /// Exact game type.
    #[serde(rename = "gameType")]
    pub game_type: Option<String>,
}

/// Payload used to publish a new game on behalf of the user owning `email`.
#[serde_as]
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Display title.
    #[validate(required(message = "title is required"), length(min = 1))]
    pub title: Option<String>,
    /// Free-form description.
    #[validate(required(message = "description is required"), length(min = 1))]
    pub description: Option<String>,
    /// Category, matched exactly by the listing filter.
    #[validate(required(message = "gameType is required"), length(min = 1))]
    pub game_type: Option<String>,
    /// Asking price, as a JSON number or a numeric string.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[schema(value_type = Option<f64>)]
    #[validate(
        required(message = "price is required"),
        custom(function = "finite_price")
    )]
    pub price: Option<f64>,
    /// Remote URL or data URI of the cover picture.
    #[validate(required(message = "photo is required"), length(min = 1))]
    pub photo: Option<String>,
    /// Email of the publishing user, who must already be registered.
    #[validate(required(message = "email is required"), length(min = 1))]
    pub email: Option<String>,
}

/// Partial update; omitted fields are left untouched.
#[serde_as]
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub game_type: Option<String>,
    /// New price, as a JSON number or a numeric string.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[schema(value_type = Option<f64>)]
    #[validate(custom(function = "finite_price"))]
    pub price: Option<f64>,
    /// Re-uploaded on every update that carries it.
    pub photo: Option<String>,
}

/// `"NaN"` and `"inf"` parse as floats but cannot be written back as JSON numbers.
fn finite_price(price: f64) -> Result<(), ValidationError> {
    if price.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite").with_message("price must be a finite number".into()))
    }
}

/// Game as returned by the listing endpoint, creator left as a reference.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    /// Game id, serialized as `_id`.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category.
    pub game_type: String,
    /// Asking price.
    pub price: f64,
    /// Hosted picture URL.
    pub photo: String,
    /// Id of the publishing user, omitted when unknown.
    pub creator: Option<Uuid>,
}

/// Game with its creator expanded.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameDetailResponse {
    /// Game id, serialized as `_id`.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category.
    pub game_type: String,
    /// Asking price.
    pub price: f64,
    /// Hosted picture URL.
    pub photo: String,
    /// Publishing user, omitted when missing.
    pub creator: Option<UserResponse>,
}

/// One page of games plus the number of games matching the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct GameListing {
    /// Games of the requested page.
    pub games: Vec<GameResponse>,
    /// Matches across every page.
    pub total: u64,
}

impl From<GameEntity> for GameResponse {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            title: game.title,
            description: game.description,
            game_type: game.game_type,
            price: game.price,
            photo: game.photo,
            creator: game.creator,
        }
    }
}

impl From<GameDetailEntity> for GameDetailResponse {
    fn from(GameDetailEntity { game, creator }: GameDetailEntity) -> Self {
        Self {
            id: game.id,
            title: game.title,
            description: game.description,
            game_type: game.game_type,
            price: game.price,
            photo: game.photo,
            creator: creator.map(Into::into),
        }
    }
}
