//! Card synchronization layer
//!
//! Cached card lists on top of the [`QueryClient`], plus the card
//! mutations. Every successful mutation invalidates the `cards` prefix,
//! which covers both the full list and the due list, each exactly once.
//! Reviews also invalidate the statistics.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::api::statistics::STATISTICS_KEY;
use crate::api::CardsApi;
use crate::error::ApiResult;
use crate::models::{Card, CardId, CardPatch, NewCard, Rating, Review};
use crate::query::{Mutation, Query, QueryClient, QueryKey};

/// Key of the full card list; also the prefix of every card list
pub const CARDS_KEY: &[&str] = &["cards"];

/// Key of the due card list
pub const DUE_CARDS_KEY: &[&str] = &["cards", "due"];

/// Card lists and mutations shared by every screen
#[derive(Clone)]
pub struct CardSync {
    api: Arc<dyn CardsApi>,
    queries: QueryClient,
    create: Mutation,
    update: Mutation,
    review: Mutation,
    import: Mutation,
}

impl CardSync {
    pub fn new(api: Arc<dyn CardsApi>, queries: QueryClient) -> Self {
        Self {
            create: Mutation::new(&queries, &[CARDS_KEY]),
            update: Mutation::new(&queries, &[CARDS_KEY]),
            review: Mutation::new(&queries, &[CARDS_KEY, STATISTICS_KEY]),
            import: Mutation::new(&queries, &[CARDS_KEY]),
            api,
            queries,
        }
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    /// Every card of the user
    pub fn all_cards(&self) -> Query<Vec<Card>> {
        let api = Arc::clone(&self.api);
        self.queries.query(QueryKey::new(CARDS_KEY), move || {
            let api = Arc::clone(&api);
            async move { api.list().await }
        })
    }

    /// Cards whose next review time has passed
    pub fn due_cards(&self) -> Query<Vec<Card>> {
        let api = Arc::clone(&self.api);
        self.queries.query(QueryKey::new(DUE_CARDS_KEY), move || {
            let api = Arc::clone(&api);
            async move { api.due().await }
        })
    }

    /// Fetch one card; never cached, every call goes to the server
    pub async fn get_by_id(&self, id: CardId) -> ApiResult<Card> {
        self.api.get(id).await
    }

    pub async fn create_card(&self, card: &NewCard) -> ApiResult<Card> {
        let created = self.create.run(self.api.create(card)).await?;
        info!(id = created.id, "Created card '{}'", created.word);
        Ok(created)
    }

    pub async fn update_card(&self, id: CardId, patch: &CardPatch) -> ApiResult<Card> {
        let updated = self.update.run(self.api.update(id, patch)).await?;
        info!(id, "Updated card");
        Ok(updated)
    }

    /// Submit a rating; the server reschedules the card
    pub async fn review_card(&self, id: CardId, rating: Rating) -> ApiResult<Review> {
        let review = self.review.run(self.api.review(id, rating)).await?;
        info!(id, rating = rating.value(), next_interval = review.next_interval, "Reviewed card");
        Ok(review)
    }

    pub async fn import_cards(&self, path: &Path) -> ApiResult<Vec<Card>> {
        let cards = self.import.run(self.api.import(path)).await?;
        info!("Imported {} cards from {}", cards.len(), path.display());
        Ok(cards)
    }

    pub fn create_mutation(&self) -> &Mutation {
        &self.create
    }

    pub fn update_mutation(&self) -> &Mutation {
        &self.update
    }

    pub fn review_mutation(&self) -> &Mutation {
        &self.review
    }

    pub fn import_mutation(&self) -> &Mutation {
        &self.import
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::fake::FakeCards;
    use super::*;
    use crate::models::fixtures;
    use crate::query::QueryOptions;

    fn deck() -> Vec<Card> {
        vec![
            fixtures::card(1, "hola", chrono::Duration::hours(-2)),
            fixtures::card(2, "adios", chrono::Duration::days(3)),
            fixtures::card(3, "gracias", chrono::Duration::minutes(-5)),
        ]
    }

    fn sync_with(api: Arc<FakeCards>) -> CardSync {
        let options = QueryOptions {
            retry_delay: Duration::ZERO,
            ..QueryOptions::default()
        };
        CardSync::new(api, QueryClient::new(options))
    }

    #[tokio::test]
    async fn test_due_cards_filters_by_next_review() {
        let api = Arc::new(FakeCards::new(deck()));
        let sync = sync_with(Arc::clone(&api));

        let due = sync.due_cards().fetch().await.unwrap();
        let ids: Vec<CardId> = due.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(sync.all_cards().fetch().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_subscribers_share_one_request() {
        let api = Arc::new(FakeCards::new(deck()).with_delay(Duration::from_millis(20)));
        let sync = sync_with(Arc::clone(&api));

        let list_screen = sync.all_cards();
        let header_badge = sync.all_cards();
        let (a, b) = tokio::join!(list_screen.fetch(), header_badge.fetch());
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(FakeCards::calls(&api.list_calls), 1);

        // Still fresh: served from cache
        sync.all_cards().fetch().await.unwrap();
        assert_eq!(FakeCards::calls(&api.list_calls), 1);
    }

    #[tokio::test]
    async fn test_review_invalidates_both_lists_once() {
        let api = Arc::new(FakeCards::new(deck()));
        let sync = sync_with(Arc::clone(&api));
        let all = sync.all_cards();
        let due = sync.due_cards();
        all.fetch().await.unwrap();
        due.fetch().await.unwrap();

        let review = sync.review_card(1, Rating::Good).await.unwrap();
        assert_eq!(review.card_id, 1);
        assert_eq!(all.invalidation_count(), 1);
        assert_eq!(due.invalidation_count(), 1);

        let due_ids: Vec<CardId> = due.fetch().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(due_ids, vec![3]);
        assert_eq!(FakeCards::calls(&api.due_calls), 2);
    }

    #[tokio::test]
    async fn test_review_invalidates_statistics() {
        let api = Arc::new(FakeCards::new(deck()));
        let sync = sync_with(api);
        let stats = sync
            .queries()
            .query(QueryKey::new(STATISTICS_KEY), || async { Ok(0u32) });
        stats.fetch().await.unwrap();

        sync.create_card(&NewCard::new("nuevo", "new")).await.unwrap();
        assert_eq!(stats.invalidation_count(), 0);

        sync.review_card(2, Rating::Easy).await.unwrap();
        assert_eq!(stats.invalidation_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_review_leaves_caches_untouched() {
        let api = Arc::new(FakeCards::new(deck()));
        api.fail_reviews.store(true, Ordering::SeqCst);
        let sync = sync_with(Arc::clone(&api));
        let all = sync.all_cards();
        let before = all.fetch().await.unwrap();

        let result = sync.review_card(1, Rating::Hard).await;
        assert!(result.is_err());
        assert_eq!(all.invalidation_count(), 0);
        assert!(!all.is_stale());
        assert_eq!(all.data(), Some(before));

        let state = sync.review_mutation().state();
        assert!(!state.is_pending);
        assert_eq!(state.error.as_deref(), Some("review failed"));
    }

    #[tokio::test]
    async fn test_create_and_update_invalidate_card_lists() {
        let api = Arc::new(FakeCards::new(deck()));
        let sync = sync_with(Arc::clone(&api));
        let all = sync.all_cards();
        let due = sync.due_cards();
        all.fetch().await.unwrap();
        due.fetch().await.unwrap();

        let created = sync.create_card(&NewCard::new("perro", "dog")).await.unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(all.invalidation_count(), 1);
        assert_eq!(due.invalidation_count(), 1);

        let patch = CardPatch {
            definition: Some("a dog".into()),
            ..CardPatch::default()
        };
        let updated = sync.update_card(created.id, &patch).await.unwrap();
        assert_eq!(updated.definition, "a dog");
        assert_eq!(all.invalidation_count(), 2);
        assert_eq!(due.invalidation_count(), 2);

        assert_eq!(all.fetch().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_card_is_rejected_without_invalidation() {
        let api = Arc::new(FakeCards::new(deck()));
        let sync = sync_with(api);
        let all = sync.all_cards();
        all.fetch().await.unwrap();

        assert!(sync.create_card(&NewCard::new("", "x")).await.is_err());
        assert!(sync.create_mutation().state().is_error());
        assert_eq!(all.invalidation_count(), 0);
    }

    #[tokio::test]
    async fn test_get_by_id_is_never_cached() {
        let api = Arc::new(FakeCards::new(deck()));
        let sync = sync_with(Arc::clone(&api));

        sync.get_by_id(2).await.unwrap();
        sync.get_by_id(2).await.unwrap();
        assert_eq!(FakeCards::calls(&api.get_calls), 2);

        let err = sync.get_by_id(404).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_import_invalidates_card_lists() {
        let api = Arc::new(FakeCards::new(deck()));
        let sync = sync_with(api);
        let all = sync.all_cards();
        all.fetch().await.unwrap();

        let imported = sync.import_cards(Path::new("/tmp/verbos.csv")).await.unwrap();
        assert_eq!(imported[0].word, "verbos");
        assert_eq!(all.invalidation_count(), 1);
    }
}
