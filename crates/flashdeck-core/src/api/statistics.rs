//! Statistics endpoint

use crate::error::ApiResult;
use crate::http::ApiClient;
use crate::models::Statistics;
use crate::query::{Query, QueryClient, QueryKey};

use super::API_PREFIX;

/// Cache key of the dashboard numbers
pub const STATISTICS_KEY: &[&str] = &["statistics"];

/// Fetch the dashboard numbers for the logged-in user
pub async fn fetch(client: &ApiClient) -> ApiResult<Statistics> {
    client.get(&format!("{}/statistics", API_PREFIX)).await
}

/// Cached statistics, refreshed after review submissions
pub fn query(queries: &QueryClient, client: &ApiClient) -> Query<Statistics> {
    let client = client.clone();
    queries.query(QueryKey::new(STATISTICS_KEY), move || {
        let client = client.clone();
        async move { fetch(&client).await }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CredentialPolicy, CredentialStore};
    use crate::navigation::{Navigator, Route};
    use crate::query::QueryOptions;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_statistics_query_is_cached() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/statistics")
                    .header("authorization", "Bearer tok");
                then.status(200).json_body(json!({
                    "total_cards": 4,
                    "mastered_cards": 1,
                    "learning_cards": 2,
                    "reviewing_cards": 1,
                    "due_cards": 3,
                    "daily_reviews": [{"date": "2024-05-01", "count": 5}],
                    "review_ratings": [{"rating": 2, "count": 5}],
                    "card_status_trend": []
                }));
            })
            .await;

        let credentials = CredentialStore::in_memory(CredentialPolicy::default());
        credentials.set_token("tok").unwrap();
        let client =
            ApiClient::new(&server.base_url(), credentials, Navigator::new(Route::Statistics))
                .unwrap();
        let queries = QueryClient::new(QueryOptions::default());

        let stats = query(&queries, &client).fetch().await.unwrap();
        assert_eq!(stats.total_cards, 4);
        query(&queries, &client).fetch().await.unwrap();
        assert_eq!(mock.hits_async().await, 1);
    }
}
