//! Authentication flows
//!
//! Login stores the issued token in the credential store and moves to the
//! card list; registration validates the form locally before anything is
//! sent; logout clears the session.

use reqwest::Method;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, Body};
use crate::models::{LoginResponse, RegisterRequest, User};
use crate::navigation::Route;
use crate::validation::RegistrationForm;

use super::API_PREFIX;

fn users_path(rest: &str) -> String {
    format!("{}/users/{}", API_PREFIX, rest)
}

/// Log in with email and password
///
/// The server expects an OAuth2 password form, with the email as `username`.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> ApiResult<LoginResponse> {
    let fields = vec![
        ("username".to_string(), email.to_string()),
        ("password".to_string(), password.to_string()),
    ];

    let response: LoginResponse = match client
        .send(Method::POST, &users_path("login"), Body::Form(fields))
        .await
    {
        Ok(r) => r,
        Err(ApiError::Unauthorized) => {
            return Err(ApiError::Validation("Incorrect email or password".into()))
        }
        Err(e) => return Err(e),
    };

    let credentials = client.credentials();
    credentials.set_token(&response.access_token)?;
    if let Some(ref user_id) = response.user_id {
        credentials.set_user_id(user_id)?;
    }

    info!("Logged in as {}", email);
    client.navigator().navigate(Route::Cards);
    Ok(response)
}

/// Create an account; the form is checked before anything is sent
pub async fn register(client: &ApiClient, form: &RegistrationForm) -> ApiResult<User> {
    form.validate()
        .map_err(|errors| ApiError::Validation(errors.join("\n")))?;

    let request = RegisterRequest {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    };
    let user: User = client.post(&users_path("register"), &request).await?;

    info!("Registered {}", user.email);
    client.navigator().navigate(Route::Login);
    Ok(user)
}

/// Activate an account with the token from the activation email
pub async fn activate(client: &ApiClient, token: &str) -> ApiResult<serde_json::Value> {
    let mut url = client.url(&users_path("activate"))?;
    url.query_pairs_mut().append_pair("token", token);
    let path = format!("{}?{}", url.path(), url.query().unwrap_or_default());
    client.get(&path).await
}

/// End the session locally
pub fn logout(client: &ApiClient) -> ApiResult<()> {
    client.credentials().remove_all()?;
    client.navigator().navigate(Route::Login);
    info!("Logged out");
    Ok(())
}
