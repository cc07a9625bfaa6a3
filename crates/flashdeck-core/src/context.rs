//! Application context
//!
//! `AppContext` owns everything a frontend needs to talk to the server:
//! configuration, the session, the HTTP client, the query cache, the
//! navigator and the card layer. It is created once at startup and passed
//! down; nothing here is global.
//!
//! ## Usage
//!
//! ```ignore
//! let ctx = AppContext::open()?;
//!
//! let due = ctx.cards().due_cards().fetch().await?;
//! let review = ReviewSession::new(due[0].id, ctx.cards().clone(), ctx.navigator().clone());
//!
//! ctx.teardown();
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::{auth, statistics};
use crate::card_sync::CardSync;
use crate::config::Config;
use crate::credentials::{CredentialPolicy, CredentialStore};
use crate::error::ApiResult;
use crate::http::ApiClient;
use crate::models::{CardId, Statistics};
use crate::navigation::{Navigator, Route};
use crate::query::{Query, QueryClient, QueryOptions};
use crate::review::ReviewSession;

/// Shared state of a running client
pub struct AppContext {
    config: Config,
    client: ApiClient,
    queries: QueryClient,
    cards: CardSync,
}

impl AppContext {
    /// Load the configuration and open the persisted session
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Build the context from an explicit configuration
    ///
    /// The session file lives in the data directory; a missing or expired
    /// session simply starts logged out.
    pub fn open_with_config(config: Config) -> Result<Self> {
        let policy = CredentialPolicy::for_api(&config.api_url, config.production);
        let credentials = CredentialStore::open(config.session_path(), policy);
        Self::with_credentials(config, credentials)
    }

    /// Build the context around an existing credential store
    pub fn with_credentials(config: Config, credentials: CredentialStore) -> Result<Self> {
        let start = Route::Cards.guard(credentials.is_authenticated());
        let navigator = Navigator::new(start);
        let queries = QueryClient::new(QueryOptions {
            stale_time: config.stale_time(),
            retry: config.query_retry,
            ..QueryOptions::default()
        });
        // A rejected session takes every cached list with it
        let client = ApiClient::new(&config.api_url, credentials, navigator)
            .context("Failed to create API client")?
            .on_session_end(queries.clear_handle());
        let cards = CardSync::new(Arc::new(client.clone()), queries.clone());

        debug!(api_url = %config.api_url, start = %start, "Application context ready");
        Ok(Self {
            config,
            client,
            queries,
            cards,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.client.credentials()
    }

    pub fn navigator(&self) -> &Navigator {
        self.client.navigator()
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub fn cards(&self) -> &CardSync {
        &self.cards
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials().is_authenticated()
    }

    /// Move to `route`, subject to the session guard; returns where we landed
    pub fn navigate(&self, route: Route) -> Route {
        self.navigator()
            .navigate_guarded(route, self.is_authenticated())
    }

    /// Cached dashboard numbers
    pub fn statistics(&self) -> Query<Statistics> {
        statistics::query(&self.queries, &self.client)
    }

    /// Start reviewing `card_id`
    pub fn review_session(&self, card_id: CardId) -> ReviewSession {
        ReviewSession::new(card_id, self.cards.clone(), self.navigator().clone())
    }

    /// End the session and forget everything cached for it
    pub fn logout(&self) -> ApiResult<()> {
        auth::logout(&self.client)?;
        self.queries.clear();
        Ok(())
    }

    /// Release cached data; the persisted session is kept
    pub fn teardown(self) {
        self.queries.clear();
        info!("Application context closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_starts_at_login_without_session() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = AppContext::open_with_config(test_config(&temp_dir)).unwrap();

        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.navigator().current(), Route::Login);
        assert_eq!(ctx.navigate(Route::Statistics), Route::Login);
        assert_eq!(ctx.navigate(Route::Terms), Route::Terms);
    }

    #[test]
    fn test_persisted_session_starts_at_cards() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        {
            let ctx = AppContext::open_with_config(config.clone()).unwrap();
            ctx.credentials().set_token("tok").unwrap();
            ctx.teardown();
        }

        let ctx = AppContext::open_with_config(config).unwrap();
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.navigator().current(), Route::Cards);
        assert_eq!(ctx.navigate(Route::Login), Route::Cards);
        assert_eq!(ctx.navigate(Route::Review(3)), Route::Review(3));
    }

    #[test]
    fn test_query_options_follow_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            stale_time_secs: 30,
            query_retry: 0,
            ..test_config(&temp_dir)
        };
        let ctx = AppContext::open_with_config(config).unwrap();

        let options = ctx.queries().options();
        assert_eq!(options.stale_time.as_secs(), 30);
        assert_eq!(options.retry, 0);
    }

    #[test]
    fn test_logout_clears_session_and_cache() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = AppContext::open_with_config(test_config(&temp_dir)).unwrap();
        ctx.credentials().set_token("tok").unwrap();
        ctx.navigate(Route::Cards);
        let _ = ctx.cards().all_cards();

        ctx.logout().unwrap();
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.navigator().current(), Route::Login);
        assert!(ctx
            .queries()
            .get::<Vec<crate::models::Card>>(&crate::query::QueryKey::new(
                crate::card_sync::CARDS_KEY
            ))
            .is_none());
    }

    #[tokio::test]
    async fn test_rejected_session_drops_cached_queries() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/api/v1/cards/");
                then.status(401);
            })
            .await;

        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            api_url: server.base_url(),
            ..test_config(&temp_dir)
        };
        let ctx = AppContext::open_with_config(config).unwrap();
        ctx.credentials().set_token("stale").unwrap();

        let result = ctx.cards().all_cards().fetch().await;
        assert!(result.unwrap_err().is_auth());
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.navigator().current(), Route::Login);
        assert!(ctx
            .queries()
            .get::<Vec<crate::models::Card>>(&crate::query::QueryKey::new(
                crate::card_sync::CARDS_KEY
            ))
            .is_none());
    }

    #[test]
    fn test_invalid_api_url() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            api_url: "not a url".into(),
            ..test_config(&temp_dir)
        };
        assert!(AppContext::open_with_config(config).is_err());
    }
}
