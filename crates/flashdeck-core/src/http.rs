//! HTTP client adapter
//!
//! Every request to the API goes through [`ApiClient`], which:
//! 1. Attaches `Authorization: Bearer <token>` and `UserId` when a session exists
//! 2. Maps non-success statuses onto [`ApiError`]
//! 3. On any 401, clears the credential store, runs the session-end hook and
//!    navigates to the login route before returning [`ApiError::Unauthorized`]
//!    to the caller
//!
//! The 401 policy lives here so no data-access function has to repeat it.

use std::fmt;
use std::sync::Arc;

use reqwest::multipart::Form;
use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::credentials::CredentialStore;
use crate::error::{ApiError, ApiResult};
use crate::navigation::{Navigator, Route};

/// Request body variants used by the API
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Multipart(Form),
}

impl Body {
    /// Serialize any payload as a JSON body
    pub fn json<T: Serialize>(payload: &T) -> ApiResult<Self> {
        serde_json::to_value(payload)
            .map(Body::Json)
            .map_err(|e| ApiError::Decode(format!("Failed to encode request: {}", e)))
    }
}

type SessionEndHook = Arc<dyn Fn() + Send + Sync>;

/// Authenticated client for the flashcard API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialStore,
    navigator: Navigator,
    on_session_end: Option<SessionEndHook>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("navigator", &self.navigator)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000`)
    pub fn new(base_url: &str, credentials: CredentialStore, navigator: Navigator) -> ApiResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| ApiError::Validation(format!("Invalid API URL '{}': {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("flashdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            credentials,
            navigator,
            on_session_end: None,
        })
    }

    /// Run `hook` whenever the server rejects the session
    ///
    /// Called after the credentials are cleared and before navigating to
    /// the login route.
    pub fn on_session_end(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_end = Some(Arc::new(hook));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> ApiResult<Url> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Url::parse(&joined).map_err(|e| ApiError::Validation(format!("Invalid path '{}': {}", path, e)))
    }

    /// Send a request and return the successful response
    pub async fn execute(&self, method: Method, path: &str, body: Body) -> ApiResult<Response> {
        let url = self.url(path)?;
        let creds = self.credentials.for_request(&url);

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = creds.token {
            request = request.bearer_auth(token);
        }
        if let Some(user_id) = creds.user_id {
            request = request.header("UserId", user_id);
        }
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(&value),
            Body::Form(fields) => request.form(&fields),
            Body::Multipart(form) => request.multipart(form),
        };

        debug!("{} {}", method, path);
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }

        let message = error_message(response).await;
        warn!("{} {} failed with {}: {}", method, path, status, message);
        Err(match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation(message)
            }
            _ => ApiError::Status { status, message },
        })
    }

    /// Tear down the session after the server rejected it
    fn handle_unauthorized(&self) {
        info!("Server rejected session credentials; logging out");
        if let Err(e) = self.credentials.remove_all() {
            warn!("Failed to clear session: {}", e);
        }
        if let Some(hook) = &self.on_session_end {
            hook();
        }
        self.navigator.navigate(Route::Login);
    }

    /// Send a request and decode the JSON response
    pub async fn send<T: DeserializeOwned>(&self, method: Method, path: &str, body: Body) -> ApiResult<T> {
        let response = self.execute(method, path, body).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(Method::GET, path, Body::Empty).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, payload: &B) -> ApiResult<T> {
        self.send(Method::POST, path, Body::json(payload)?).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, payload: &B) -> ApiResult<T> {
        self.send(Method::PATCH, path, Body::json(payload)?).await
    }
}

/// Extract a readable message from an error response
///
/// The API reports errors as `{"detail": "..."}`, or as a list of field
/// errors (`{"detail": [{"msg": "..."}]}`) for rejected payloads.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    };

    let Ok(text) = response.text().await else {
        return fallback();
    };

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(json) => match json.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(serde_json::Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if msgs.is_empty() {
                    fallback()
                } else {
                    msgs.join("; ")
                }
            }
            _ => fallback(),
        },
        Err(_) if !text.trim().is_empty() && text.len() <= 200 => text.trim().to_string(),
        Err(_) => fallback(),
    }
}
