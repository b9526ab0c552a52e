/// OpenAPI documentation generation.
pub mod documentation;
/// Game listing, publication, update and removal.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Background task keeping a storage connection installed.
pub mod storage_supervisor;
/// User registration and lookup.
pub mod user_service;
