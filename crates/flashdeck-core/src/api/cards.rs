//! Card endpoints
//!
//! [`CardsApi`] is the seam between the synchronization layer and the
//! network: [`ApiClient`] implements it against the server, tests use
//! in-memory fakes.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, Body};
use crate::models::{
    Card, CardId, CardPatch, NewCard, Rating, Review, ReviewRequest, ReviewResponse,
};

use super::API_PREFIX;

/// Card operations offered by the server
#[async_trait]
pub trait CardsApi: Send + Sync {
    /// Every card of the user
    async fn list(&self) -> ApiResult<Vec<Card>>;

    /// Cards whose next review time has passed
    async fn due(&self) -> ApiResult<Vec<Card>>;

    async fn get(&self, id: CardId) -> ApiResult<Card>;

    async fn create(&self, card: &NewCard) -> ApiResult<Card>;

    async fn update(&self, id: CardId, patch: &CardPatch) -> ApiResult<Card>;

    /// Record a rating; the server reschedules the card
    async fn review(&self, id: CardId, rating: Rating) -> ApiResult<Review>;

    /// Upload a deck file and create its cards
    async fn import(&self, path: &Path) -> ApiResult<Vec<Card>>;
}

fn cards_path(rest: &str) -> String {
    format!("{}/cards/{}", API_PREFIX, rest)
}

#[async_trait]
impl CardsApi for ApiClient {
    async fn list(&self) -> ApiResult<Vec<Card>> {
        self.get(&cards_path("")).await
    }

    async fn due(&self) -> ApiResult<Vec<Card>> {
        self.get(&cards_path("due/")).await
    }

    async fn get(&self, id: CardId) -> ApiResult<Card> {
        ApiClient::get(self, &cards_path(&id.to_string())).await
    }

    async fn create(&self, card: &NewCard) -> ApiResult<Card> {
        card.validate()?;
        self.post(&cards_path(""), card).await
    }

    async fn update(&self, id: CardId, patch: &CardPatch) -> ApiResult<Card> {
        self.patch(&cards_path(&id.to_string()), patch).await
    }

    async fn review(&self, id: CardId, rating: Rating) -> ApiResult<Review> {
        let request = ReviewRequest { card_id: id, rating };
        let response: ReviewResponse = self
            .post(&cards_path(&format!("{}/review", id)), &request)
            .await?;
        Ok(response.into_review(rating, chrono::Utc::now()))
    }

    async fn import(&self, path: &Path) -> ApiResult<Vec<Card>> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "import".to_string());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        self.send(Method::POST, &cards_path("import"), Body::Multipart(form))
            .await
    }
}
