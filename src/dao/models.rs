use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Game listing persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display title, not unique.
    pub title: String,
    /// Free-form description shown on the detail page.
    pub description: String,
    /// Category used as an exact-match listing filter.
    pub game_type: String,
    /// Asking price.
    pub price: f64,
    /// Hosted URL of the cover picture.
    pub photo: String,
    /// User that published the listing.
    pub creator: Option<Uuid>,
}

/// Marketplace user owning game listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key of the user.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email, used as lookup key when publishing games.
    pub email: String,
    /// URL of the profile picture.
    pub avatar: String,
    /// Games published by the user, in publication order.
    pub all_games: Vec<Uuid>,
}

/// A game with its creator reference expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct GameDetailEntity {
    /// The game itself.
    pub game: GameEntity,
    /// Creator document, absent when the game has no creator or the reference dangles.
    pub creator: Option<UserEntity>,
}

/// Partial update applied to a game. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameChanges {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub game_type: Option<String>,
    /// New price.
    pub price: Option<f64>,
    /// New picture URL, already hosted.
    pub photo: Option<String>,
}

impl GameChanges {
    /// True when no field would be written.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.game_type.is_none()
            && self.price.is_none()
            && self.photo.is_none()
    }

    /// Apply the changes onto an in-memory game.
    pub fn apply_to(&self, game: &mut GameEntity) {
        if let Some(title) = &self.title {
            game.title = title.clone();
        }
        if let Some(description) = &self.description {
            game.description = description.clone();
        }
        if let Some(game_type) = &self.game_type {
            game.game_type = game_type.clone();
        }
        if let Some(price) = self.price {
            game.price = price;
        }
        if let Some(photo) = &self.photo {
            game.photo = photo.clone();
        }
    }
}

/// Listing predicate. Both conditions omitted matches every game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    /// Exact match on the game type.
    pub game_type: Option<String>,
    /// Case-insensitive substring match on the title.
    pub title_like: Option<String>,
}

impl GameFilter {
    /// Regex pattern matching `title_like` literally.
    pub fn title_pattern(&self) -> Option<String> {
        self.title_like.as_deref().map(regex::escape)
    }
}

/// Fields a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// `id` or `_id`.
    Id,
    /// `title`.
    Title,
    /// `description`.
    Description,
    /// `gameType`.
    GameType,
    /// `price`.
    Price,
    /// `photo`.
    Photo,
}

impl SortField {
    /// Parse the field name used by API clients.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" | "_id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "gameType" => Some(Self::GameType),
            "price" => Some(Self::Price),
            "photo" => Some(Self::Photo),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortOrder {
    /// Parse the direction used by API clients, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Some(Self::Asc),
            "desc" | "descending" | "-1" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Ordering requested for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Field compared.
    pub field: SortField,
    /// Direction.
    pub order: SortOrder,
}

/// Full listing request handed to a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameQuery {
    /// Games to consider.
    pub filter: GameFilter,
    /// Ordering, `None` keeping storage order.
    pub sort: Option<SortSpec>,
    /// Number of matching games to skip.
    pub skip: u64,
    /// Maximum number of games to return, `None` meaning unbounded.
    pub limit: Option<u64>,
}

/// One page of a listing together with the number of games matching the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct GamePage {
    /// Games inside the requested window.
    pub games: Vec<GameEntity>,
    /// Matches before the window was applied.
    pub total: u64,
}
