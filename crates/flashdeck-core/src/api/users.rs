//! Account and settings endpoints

use reqwest::Method;
use tracing::info;

use crate::error::ApiResult;
use crate::http::{ApiClient, Body};
use crate::models::{NotificationSettings, User, UserPatch};
use crate::navigation::Route;

use super::API_PREFIX;

fn users_path(rest: &str) -> String {
    format!("{}/users/{}", API_PREFIX, rest)
}

pub async fn profile(client: &ApiClient) -> ApiResult<User> {
    client.get(&users_path("profile")).await
}

pub async fn update_profile(client: &ApiClient, patch: &UserPatch) -> ApiResult<User> {
    client.patch(&users_path("profile"), patch).await
}

pub async fn cancel_subscription(client: &ApiClient) -> ApiResult<serde_json::Value> {
    client
        .send(Method::POST, &users_path("cancel-subscription"), Body::Empty)
        .await
}

/// Delete the account, then drop the now useless session
pub async fn delete_account(client: &ApiClient) -> ApiResult<()> {
    client
        .execute(Method::DELETE, &users_path("account"), Body::Empty)
        .await?;

    info!("Account deleted");
    client.credentials().remove_all()?;
    client.navigator().navigate(Route::Login);
    Ok(())
}

pub async fn notification_settings(client: &ApiClient) -> ApiResult<NotificationSettings> {
    client.get(&users_path("notification-settings")).await
}

pub async fn update_notification_settings(
    client: &ApiClient,
    settings: &NotificationSettings,
) -> ApiResult<NotificationSettings> {
    client
        .patch(&users_path("notification-settings"), settings)
        .await
}
