/// Bodies shared by several routes.
pub mod common;
/// Game payloads and listing parameters.
pub mod game;
/// Health check payloads.
pub mod health;
/// User payloads.
pub mod user;
