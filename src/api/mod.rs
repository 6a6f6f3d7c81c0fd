//! HTTP client for the Ignite backend.
//!
//! One [`ApiClient`] per process, shared behind the app state. Every request
//! carries a generated `X-Request-Id` and, when the token provider has one,
//! a bearer token. Status handling is centralized in [`ApiClient::execute`]:
//! endpoint modules only describe URLs, bodies, and response envelopes.

mod contacts;
mod owner;
mod pipelines;

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::TokenProvider;

pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

/// Error shape most endpoints use for non-2xx bodies.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Result<Self, ApiError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            tokens,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    /// Send a request and translate the status line into the error taxonomy.
    ///
    /// 401 becomes [`ApiError::Unauthorized`], soft only when a token was
    /// attached and the path is on the read-path allowlist. 404 becomes
    /// [`ApiError::NotFound`]. Any other non-2xx becomes [`ApiError::Api`]
    /// with the body's `error` field (or raw text) as the message.
    pub(crate) async fn execute<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let path = url.path().to_string();
        let request_id = Uuid::new_v4();

        let token = self.tokens.bearer_token().await;
        let had_token = token.is_some();

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("X-Request-Id", request_id.to_string());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        log::debug!("{method} {path} [{request_id}]");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            let soft = had_token && is_soft_fail_path(&path);
            log::warn!("401 on {path} (soft: {soft}) [{request_id}]");
            return Err(ApiError::Unauthorized { path, soft });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or(text);
            log::warn!("{} on {path}: {message} [{request_id}]", status.as_u16());
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        log::debug!("{} {path} [{request_id}]", status.as_u16());
        Ok(response)
    }

    /// Execute and deserialize the JSON body.
    pub(crate) async fn request<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(method, url, body).await?;
        Ok(response.json().await?)
    }

    /// Execute for endpoints where only the status matters.
    pub(crate) async fn request_ack<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(method, url, body).await?;
        Ok(())
    }
}

/// Paths where a 401 on an authenticated request means "token not ready yet"
/// rather than "session dead": owner hydration and contact reads race
/// sign-in on every launch, and cached data covers the gap.
fn is_soft_fail_path(path: &str) -> bool {
    path.contains("/hydrate") || path.contains("/contacts")
}
