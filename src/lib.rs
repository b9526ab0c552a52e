//! Library crate for gamer-lane-back, exposing modules for binaries and tests.

/// Environment-driven configuration.
pub mod config;
/// Storage and image hosting backends.
pub mod dao;
mod dto;
mod error;
/// HTTP routes and middleware.
pub mod routes;
/// Business logic shared by the routes.
pub mod services;
/// Application state shared across handlers.
pub mod state;

#[cfg(test)]
mod testing;
