//! Keyed query cache
//!
//! A [`QueryClient`] owns one [`Query`] per [`QueryKey`]. A query keeps its
//! last value with loading and error flags, serves it while it is fresh,
//! and shares a single in-flight request between every caller that asks
//! while a fetch is running. [`Mutation`]s invalidate keys by prefix, and
//! only after the mutating call has succeeded.
//!
//! Invalidation bumps a generation counter: a fetch that started before the
//! invalidation still delivers its value to the callers awaiting it, but the
//! cached copy stays stale so the next read goes back to the server.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// How long fetched data counts as fresh
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Extra attempts after a failed fetch
pub const DEFAULT_RETRY: u32 = 1;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Query results share one error between all waiting callers
pub type QueryResult<T> = Result<T, Arc<ApiError>>;

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, ApiResult<T>> + Send + Sync>;
type SharedFetch<T> = Shared<BoxFuture<'static, QueryResult<T>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Cache key, a path of segments such as `cards` / `due`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<S: AsRef<str>>(segments: &[S]) -> Self {
        Self(segments.iter().map(|s| s.as_ref().to_string()).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether the leading segments equal `prefix`
    pub fn starts_with<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
        prefix.len() <= self.0.len()
            && self.0.iter().zip(prefix).all(|(a, b)| a == b.as_ref())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("+"))
    }
}

/// Per-query behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Age after which cached data is refetched on the next read
    pub stale_time: Duration,
    /// Extra attempts after a failed fetch
    pub retry: u32,
    /// Pause before each extra attempt
    pub retry_delay: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            retry: DEFAULT_RETRY,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Outcome of the most recent fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched
    Idle,
    /// First fetch running, no data yet
    Loading,
    Success,
    /// Last fetch failed; earlier data, if any, is kept
    Error,
}

/// Snapshot of a query, as seen by subscribers
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub status: QueryStatus,
    pub error: Option<String>,
    /// A request is in flight (initial load or background refetch)
    pub is_fetching: bool,
    /// Marked stale by an invalidation since the data was fetched
    pub invalidated: bool,
    pub updated_at: Option<Instant>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            error: None,
            is_fetching: false,
            invalidated: false,
            updated_at: None,
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn is_stale(&self, stale_time: Duration) -> bool {
        self.invalidated
            || self
                .updated_at
                .map_or(true, |at| at.elapsed() >= stale_time)
    }
}

fn should_retry(error: &ApiError) -> bool {
    !(error.is_auth() || error.is_not_found() || matches!(error, ApiError::Validation(_)))
}

struct InFlight<T> {
    generation: u64,
    fetch: SharedFetch<T>,
}

struct QueryInner<T> {
    key: QueryKey,
    options: QueryOptions,
    fetcher: Fetcher<T>,
    state: watch::Sender<QueryState<T>>,
    in_flight: Mutex<Option<InFlight<T>>>,
    generation: AtomicU64,
    /// One past the generation of the last result written to `state`
    applied: AtomicU64,
    invalidations: AtomicUsize,
}

impl<T: Clone + Send + Sync + 'static> QueryInner<T> {
    async fn run(self: Arc<Self>, generation: u64) -> QueryResult<T> {
        let mut attempt = 0;
        let result = loop {
            debug!(key = %self.key, attempt, "Fetching query");
            match (self.fetcher)().await {
                Ok(data) => break Ok(data),
                Err(e) if attempt < self.options.retry && should_retry(&e) => {
                    attempt += 1;
                    warn!(key = %self.key, error = %e, "Query failed, retrying");
                    tokio::time::sleep(self.options.retry_delay).await;
                }
                Err(e) => break Err(Arc::new(e)),
            }
        };

        self.settle(generation, &result);
        result
    }

    fn settle(&self, generation: u64, result: &QueryResult<T>) {
        let current = self.generation.load(Ordering::SeqCst);
        let mut slot = lock(&self.in_flight);
        if slot.as_ref().is_some_and(|f| f.generation == generation) {
            *slot = None;
        }
        let fetching = slot.is_some();
        // A newer fetch owns the state now, or has already written it
        let superseded = fetching || generation + 1 < self.applied.load(Ordering::SeqCst);
        if superseded {
            debug!(key = %self.key, generation, "Dropping superseded result");
        } else {
            self.applied.fetch_max(generation + 1, Ordering::SeqCst);
        }

        self.state.send_modify(|state| {
            state.is_fetching = fetching;
            if superseded {
                return;
            }
            match result {
                Ok(data) => {
                    state.data = Some(data.clone());
                    state.status = QueryStatus::Success;
                    state.error = None;
                    state.updated_at = Some(Instant::now());
                    state.invalidated = generation != current;
                }
                Err(e) => {
                    state.status = QueryStatus::Error;
                    state.error = Some(e.user_message());
                }
            }
        });
    }
}

/// A cached, observable value behind one key
pub struct Query<T> {
    inner: Arc<QueryInner<T>>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Query<T> {
    fn new(key: QueryKey, options: QueryOptions, fetcher: Fetcher<T>) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            inner: Arc::new(QueryInner {
                key,
                options,
                fetcher,
                state,
                in_flight: Mutex::new(None),
                generation: AtomicU64::new(0),
                applied: AtomicU64::new(0),
                invalidations: AtomicUsize::new(0),
            }),
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.inner.key
    }

    pub fn state(&self) -> QueryState<T> {
        self.inner.state.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.inner.state.borrow().data.clone()
    }

    /// Watch state changes (loading, data, errors)
    ///
    /// While at least one receiver is alive, invalidation triggers a
    /// background refetch.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.inner.state.subscribe()
    }

    pub fn is_stale(&self) -> bool {
        self.inner
            .state
            .borrow()
            .is_stale(self.inner.options.stale_time)
    }

    /// How many times this key has been invalidated
    pub fn invalidation_count(&self) -> usize {
        self.inner.invalidations.load(Ordering::SeqCst)
    }

    /// Cached data while fresh, otherwise a (shared) fetch
    pub async fn fetch(&self) -> QueryResult<T> {
        if let Some(data) = self.fresh_data() {
            return Ok(data);
        }
        self.refetch().await
    }

    /// Fetch regardless of freshness
    ///
    /// The request is registered immediately; callers arriving before it
    /// settles join it instead of sending their own.
    pub fn refetch(&self) -> impl Future<Output = QueryResult<T>> + Send + 'static {
        let generation = self.inner.generation.load(Ordering::SeqCst);
        let mut slot = lock(&self.inner.in_flight);
        if let Some(in_flight) = slot.as_ref() {
            if in_flight.generation == generation {
                return in_flight.fetch.clone();
            }
        }

        let fetch = Arc::clone(&self.inner).run(generation).boxed().shared();
        *slot = Some(InFlight {
            generation,
            fetch: fetch.clone(),
        });
        self.inner.state.send_modify(|state| {
            state.is_fetching = true;
            if state.data.is_none() {
                state.status = QueryStatus::Loading;
            }
        });
        fetch
    }

    /// Mark the cached value stale
    pub fn invalidate(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidations.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_modify(|state| state.invalidated = true);
        debug!(key = %self.inner.key, "Query invalidated");

        if self.inner.state.receiver_count() == 0 {
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let refetch = self.refetch();
            let key = self.inner.key.clone();
            handle.spawn(async move {
                if let Err(e) = refetch.await {
                    debug!(key = %key, error = %e, "Background refetch failed");
                }
            });
        }
    }

    fn fresh_data(&self) -> Option<T> {
        let state = self.inner.state.borrow();
        if state.is_stale(self.inner.options.stale_time) {
            None
        } else {
            state.data.clone()
        }
    }
}

trait CacheEntry: Send + Sync {
    fn invalidate(&self);
    fn as_any(&self) -> &dyn Any;
}

impl<T: Clone + Send + Sync + 'static> CacheEntry for Query<T> {
    fn invalidate(&self) {
        Query::invalidate(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Registry of queries, shared by everything that reads server data
#[derive(Clone)]
pub struct QueryClient {
    entries: Arc<Mutex<HashMap<QueryKey, Arc<dyn CacheEntry>>>>,
    defaults: QueryOptions,
}

impl QueryClient {
    pub fn new(defaults: QueryOptions) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            defaults,
        }
    }

    pub fn options(&self) -> QueryOptions {
        self.defaults
    }

    /// The query under `key`, created with `fetcher` on first use
    ///
    /// Later calls for the same key get the existing query; their fetcher
    /// is not used.
    pub fn query<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Query<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let mut entries = lock(&self.entries);
        if let Some(entry) = entries.get(&key) {
            if let Some(query) = entry.as_any().downcast_ref::<Query<T>>() {
                return query.clone();
            }
            warn!(key = %key, "Query key reused with a different type, replacing it");
        }

        let fetcher: Fetcher<T> = Arc::new(move || fetcher().boxed());
        let query = Query::new(key.clone(), self.defaults, fetcher);
        entries.insert(key, Arc::new(query.clone()));
        query
    }

    /// An existing query, if one of that type is registered
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Query<T>> {
        lock(&self.entries)
            .get(key)
            .and_then(|entry| entry.as_any().downcast_ref::<Query<T>>().cloned())
    }

    /// Invalidate every query whose key starts with `prefix`
    ///
    /// Returns how many queries were marked stale.
    pub fn invalidate<S: AsRef<str>>(&self, prefix: &[S]) -> usize {
        let matching: Vec<Arc<dyn CacheEntry>> = lock(&self.entries)
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, entry)| Arc::clone(entry))
            .collect();

        for entry in &matching {
            entry.invalidate();
        }
        matching.len()
    }

    /// Drop every cached query (logout, teardown)
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    /// A callback that clears the cache without keeping it alive
    pub fn clear_handle(&self) -> impl Fn() + Send + Sync + 'static {
        let entries = Arc::downgrade(&self.entries);
        move || {
            if let Some(entries) = entries.upgrade() {
                lock(&entries).clear();
            }
        }
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryOptions::default())
    }
}

/// Pending and error flags of a mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationState {
    pub is_pending: bool,
    pub error: Option<String>,
}

impl MutationState {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A server write that invalidates cached queries once it succeeds
#[derive(Clone)]
pub struct Mutation {
    client: QueryClient,
    invalidates: Vec<Vec<String>>,
    state: Arc<watch::Sender<MutationState>>,
}

impl Mutation {
    /// `invalidates` lists key prefixes to mark stale after success
    pub fn new(client: &QueryClient, invalidates: &[&[&str]]) -> Self {
        let (state, _) = watch::channel(MutationState::default());
        Self {
            client: client.clone(),
            invalidates: invalidates
                .iter()
                .map(|prefix| prefix.iter().map(|s| s.to_string()).collect())
                .collect(),
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending
    }

    /// Await `call`; invalidate on success, record the error on failure
    ///
    /// A failed call leaves every cached query as it was.
    pub async fn run<T, Fut>(&self, call: Fut) -> ApiResult<T>
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        self.state.send_replace(MutationState {
            is_pending: true,
            error: None,
        });

        match call.await {
            Ok(value) => {
                for prefix in &self.invalidates {
                    self.client.invalidate(prefix.as_slice());
                }
                self.state.send_replace(MutationState::default());
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "Mutation failed");
                self.state.send_replace(MutationState {
                    is_pending: false,
                    error: Some(e.user_message()),
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn fast_options() -> QueryOptions {
        QueryOptions {
            retry_delay: Duration::ZERO,
            ..QueryOptions::default()
        }
    }

    /// A query returning `value` after a short delay, counting calls
    fn counting_query(
        client: &QueryClient,
        key: &[&str],
        value: u32,
    ) -> (Query<u32>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let query = client.query(QueryKey::new(key), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(value)
            }
        });
        (query, calls)
    }

    fn server_error() -> ApiError {
        ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into(),
        }
    }

    #[test]
    fn test_key_prefix_and_display() {
        let key = QueryKey::new(&["cards", "due"]);
        assert!(key.starts_with(&["cards"]));
        assert!(key.starts_with(&["cards", "due"]));
        assert!(!key.starts_with(&["cards", "due", "x"]));
        assert!(!key.starts_with(&["statistics"]));
        assert_eq!(key.to_string(), "cards+due");
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_request() {
        let client = QueryClient::new(fast_options());
        let (first, calls) = counting_query(&client, &["cards"], 7);
        // Same key from another subscriber reuses the query
        let (second, second_calls) = counting_query(&client, &["cards"], 99);

        let (a, b, c) = tokio::join!(first.fetch(), second.fetch(), first.fetch());
        assert_eq!(a.unwrap(), 7);
        assert_eq!(b.unwrap(), 7);
        assert_eq!(c.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fresh_data_is_served_from_cache() {
        let client = QueryClient::new(fast_options());
        let (query, calls) = counting_query(&client, &["cards"], 1);

        query.fetch().await.unwrap();
        query.fetch().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!query.is_stale());

        let state = query.state();
        assert_eq!(state.status, QueryStatus::Success);
        assert!(!state.is_fetching);
    }

    #[tokio::test]
    async fn test_stale_data_is_refetched() {
        let client = QueryClient::new(QueryOptions {
            stale_time: Duration::ZERO,
            ..fast_options()
        });
        let (query, calls) = counting_query(&client, &["statistics"], 1);

        query.fetch().await.unwrap();
        query.fetch().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_by_prefix() {
        let client = QueryClient::new(fast_options());
        let (all, all_calls) = counting_query(&client, &["cards"], 1);
        let (due, _) = counting_query(&client, &["cards", "due"], 2);
        let (stats, _) = counting_query(&client, &["statistics"], 3);
        all.fetch().await.unwrap();
        due.fetch().await.unwrap();
        stats.fetch().await.unwrap();

        assert_eq!(client.invalidate(&["cards"]), 2);
        assert_eq!(all.invalidation_count(), 1);
        assert_eq!(due.invalidation_count(), 1);
        assert_eq!(stats.invalidation_count(), 0);
        assert!(all.is_stale());
        assert!(due.is_stale());
        assert!(!stats.is_stale());

        // Stale data stays visible until the refetch lands
        assert_eq!(all.data(), Some(1));
        all.fetch().await.unwrap();
        assert_eq!(all_calls.load(Ordering::SeqCst), 2);
        assert!(!all.is_stale());
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_keeps_result_stale() {
        let client = QueryClient::new(fast_options());
        let (query, calls) = counting_query(&client, &["cards"], 5);

        let pending = query.refetch();
        query.invalidate();
        assert_eq!(pending.await.unwrap(), 5);

        let state = query.state();
        assert_eq!(state.data, Some(5));
        assert!(state.invalidated);

        query.fetch().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!query.is_stale());
    }

    #[tokio::test]
    async fn test_late_result_from_before_invalidation_is_dropped() {
        let client = QueryClient::new(fast_options());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        // The first request is slow and returns the list from before the change
        let query = client.query(QueryKey::new(&["cards"]), move || {
            let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
            async move {
                if first {
                    tokio::time::sleep(Duration::from_millis(80)).await;
                    Ok(1u32)
                } else {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok(2u32)
                }
            }
        });
        let mut rx = query.subscribe();

        let older = tokio::spawn(query.refetch());
        client.invalidate(&["cards"]);

        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                rx.changed().await.unwrap();
                if rx.borrow_and_update().data == Some(2) {
                    break;
                }
            }
        })
        .await
        .unwrap();

        // The superseded request still answers its own caller
        assert_eq!(older.await.unwrap().unwrap(), 1);

        let state = query.state();
        assert_eq!(state.data, Some(2));
        assert!(!state.invalidated);
        assert!(!state.is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_retry_then_success() {
        let client = QueryClient::new(fast_options());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let query = client.query(QueryKey::new(&["cards"]), move || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(server_error())
                } else {
                    Ok("ok".to_string())
                }
            }
        });

        assert_eq!(query.fetch().await.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_after_retry_sets_error_flag() {
        let client = QueryClient::new(fast_options());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let query = client.query(QueryKey::new(&["cards"]), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<u32, _>(server_error()) }
        });

        assert!(query.fetch().await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let state = query.state();
        assert!(state.is_error());
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert!(state.data.is_none());
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let client = QueryClient::new(fast_options());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let query = client.query(QueryKey::new(&["cards"]), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<u32, _>(ApiError::NotFound("cards".into())) }
        });

        let err = query.fetch().await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_background_refetch() {
        let client = QueryClient::new(fast_options());
        let (query, calls) = counting_query(&client, &["cards"], 3);
        let mut rx = query.subscribe();

        query.fetch().await.unwrap();
        assert_eq!(rx.borrow_and_update().data, Some(3));

        client.invalidate(&["cards"]);
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                rx.changed().await.unwrap();
                let state = rx.borrow_and_update().clone();
                if !state.is_fetching && !state.invalidated {
                    break;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_mutation_invalidates_after_success_only() {
        let client = QueryClient::new(fast_options());
        let (all, _) = counting_query(&client, &["cards"], 1);
        let (due, _) = counting_query(&client, &["cards", "due"], 1);
        all.fetch().await.unwrap();
        due.fetch().await.unwrap();

        let mutation = Mutation::new(&client, &[&["cards"]]);

        let failed: ApiResult<()> = mutation.run(async { Err(server_error()) }).await;
        assert!(failed.is_err());
        assert!(mutation.state().is_error());
        assert_eq!(all.invalidation_count(), 0);
        assert_eq!(all.data(), Some(1));
        assert!(!due.is_stale());

        let value = mutation.run(async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(mutation.state(), MutationState::default());
        assert_eq!(all.invalidation_count(), 1);
        assert_eq!(due.invalidation_count(), 1);
    }

    #[test]
    fn test_get_checks_type() {
        let client = QueryClient::default();
        let (_query, _) = counting_query(&client, &["cards"], 1);
        assert!(client.get::<u32>(&QueryKey::new(&["cards"])).is_some());
        assert!(client.get::<String>(&QueryKey::new(&["cards"])).is_none());

        client.clear();
        assert!(client.get::<u32>(&QueryKey::new(&["cards"])).is_none());
    }
}
