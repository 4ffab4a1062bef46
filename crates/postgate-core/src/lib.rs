//! Core library for postgate.
//!
//! - `api`: HTTP client for the Auth and Resource APIs
//! - `auth`: ephemeral in-memory session holding the access token
//! - `controller`: the session controller driving login, fetch, refresh and logout
//! - `models`: records returned by the Resource API
//! - `config`: backend URL and client settings

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::Session;
pub use config::Config;
pub use controller::{SessionController, SessionError};
pub use models::Post;
