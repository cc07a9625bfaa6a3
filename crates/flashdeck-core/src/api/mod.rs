//! Data access functions
//!
//! One module per API resource. Each function is a thin, typed wrapper
//! around [`ApiClient`](crate::http::ApiClient); session headers and 401
//! handling are applied by the client.

pub mod auth;
pub mod cards;
pub mod statistics;
pub mod users;

pub use cards::CardsApi;

/// Prefix shared by every endpoint
pub const API_PREFIX: &str = "/api/v1";
