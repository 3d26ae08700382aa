// Shared domain types, storage and configuration for the dugout service.

pub mod config;
pub mod db;
pub mod error;
pub mod lenient;
pub mod player;
pub mod roster;
pub mod saved;
pub mod store;

pub use error::{DugoutError, Result};
