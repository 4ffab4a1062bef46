//! REST client module for the auth demo backend.
//!
//! This module provides the `ApiClient` for the four calls the client
//! makes: credential exchange, token refresh, session termination and
//! the protected post list.
//!
//! The refresh credential lives in a cookie set by `/login`, so the
//! client keeps a cookie store for the lifetime of the process.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
