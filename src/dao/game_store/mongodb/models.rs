use mongodb::bson::{self, Bson, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    GameChanges, GameEntity, GameFilter, SortField, SortOrder, SortSpec, UserEntity,
};

pub const GAME_COLLECTION_NAME: &str = "games";
pub const USER_COLLECTION_NAME: &str = "users";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    title: String,
    description: String,
    #[serde(rename = "gameType")]
    game_type: String,
    price: f64,
    photo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creator: Option<bson::Uuid>,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: bson_uuid(value.id),
            title: value.title,
            description: value.description,
            game_type: value.game_type,
            price: value.price,
            photo: value.photo,
            creator: value.creator.map(bson_uuid),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            title: value.title,
            description: value.description,
            game_type: value.game_type,
            price: value.price,
            photo: value.photo,
            creator: value.creator.map(from_bson_uuid),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    email: String,
    avatar: String,
    #[serde(rename = "allGames", default)]
    all_games: Vec<bson::Uuid>,
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: bson_uuid(value.id),
            name: value.name,
            email: value.email,
            avatar: value.avatar,
            all_games: value.all_games.into_iter().map(bson_uuid).collect(),
        }
    }
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            name: value.name,
            email: value.email,
            avatar: value.avatar,
            all_games: value.all_games.into_iter().map(from_bson_uuid).collect(),
        }
    }
}

pub fn bson_uuid(id: Uuid) -> bson::Uuid {
    bson::Uuid::from_bytes(id.into_bytes())
}

fn from_bson_uuid(id: bson::Uuid) -> Uuid {
    Uuid::from_bytes(id.bytes())
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": bson_uuid(id)}
}

/// Translate a listing filter into a query document.
pub fn filter_document(filter: &GameFilter) -> Document {
    let mut document = Document::new();
    if let Some(game_type) = &filter.game_type {
        document.insert("gameType", game_type.as_str());
    }
    if let Some(pattern) = filter.title_pattern() {
        document.insert("title", doc! {"$regex": pattern, "$options": "i"});
    }
    document
}

pub fn sort_document(sort: SortSpec) -> Document {
    let key = match sort.field {
        SortField::Id => "_id",
        SortField::Title => "title",
        SortField::Description => "description",
        SortField::GameType => "gameType",
        SortField::Price => "price",
        SortField::Photo => "photo",
    };
    let direction = match sort.order {
        SortOrder::Asc => 1,
        SortOrder::Desc => -1,
    };
    let mut document = Document::new();
    document.insert(key, direction);
    document
}

/// `$set` payload for a partial update; empty when nothing changes.
pub fn set_document(changes: &GameChanges) -> Document {
    let mut document = Document::new();
    if let Some(title) = &changes.title {
        document.insert("title", title.as_str());
    }
    if let Some(description) = &changes.description {
        document.insert("description", description.as_str());
    }
    if let Some(game_type) = &changes.game_type {
        document.insert("gameType", game_type.as_str());
    }
    if let Some(price) = changes.price {
        document.insert("price", Bson::Double(price));
    }
    if let Some(photo) = &changes.photo {
        document.insert("photo", photo.as_str());
    }
    document
}
