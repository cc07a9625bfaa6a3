//! flashdeck core library
//!
//! Client side of the flashdeck spaced-repetition service: the server owns
//! scheduling and storage, this crate talks to it and keeps what the
//! frontends show consistent.
//!
//! # Architecture
//!
//! - **HTTP client** attaches the session to every request and tears the
//!   session down on any 401
//! - **Query cache** serves card lists and statistics, de-duplicates
//!   concurrent fetches and is invalidated by successful mutations
//! - **Review session** drives one card from question to submitted rating
//!
//! # Quick Start
//!
//! ```text
//! let ctx = AppContext::open()?;
//! api::auth::login(ctx.client(), "ada@example.com", "Abc12345!").await?;
//!
//! let due = ctx.cards().due_cards().fetch().await?;
//! let session = ctx.review_session(due[0].id);
//! session.load().await;
//! session.reveal().await;
//! session.submit(Rating::Good).await;
//! ```
//!
//! # Modules
//!
//! - `context`: application context (main entry point)
//! - `api`: typed functions per server resource
//! - `card_sync`: cached card lists and card mutations
//! - `review`: review state machine
//! - `query`: generic keyed query cache
//! - `http`: authenticated HTTP client
//! - `credentials`: persisted session token and user id
//! - `navigation`: current screen and route guarding
//! - `config`: application configuration

pub mod api;
pub mod card_sync;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod http;
pub mod models;
pub mod navigation;
pub mod query;
pub mod review;
pub mod theme;
pub mod validation;

pub use api::CardsApi;
pub use card_sync::CardSync;
pub use config::Config;
pub use context::AppContext;
pub use credentials::{CredentialPolicy, CredentialStore};
pub use error::{ApiError, ApiResult, CredentialError};
pub use http::ApiClient;
pub use models::{
    Card, CardId, CardPatch, CardStatus, NewCard, NotificationSettings, Rating, Review,
    Statistics, User, UserPatch,
};
pub use navigation::{Navigator, Route};
pub use query::{
    Mutation, MutationState, Query, QueryClient, QueryKey, QueryOptions, QueryState, QueryStatus,
};
pub use review::{ReviewPhase, ReviewSession, ReviewState, SubmitOutcome};
pub use theme::{ColorTheme, Palette, ThemeMode};
pub use validation::RegistrationForm;
