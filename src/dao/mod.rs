/// Game and user persistence backends.
pub mod game_store;
/// Remote image hosting used for game pictures.
pub mod image_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
