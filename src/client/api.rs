//! HTTP client for the `/api/users` endpoints.
//!
//! Every failure is normalised into [`ClientError`]: server-side rejections
//! keep the server's message, everything else collapses into one generic
//! message.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::users::dto::{ErrorBody, User, UserDraft, UserPatch};

/// Shown for any failure that carries no server-provided message.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response; `message` is the server's `error` text.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Connection, timeout or other transport failure; holds the cause.
    #[error("Something went wrong. Please try again.")]
    Transport(String),

    /// 2xx response whose body could not be decoded.
    #[error("Something went wrong. Please try again.")]
    Decode(String),
}

/// Remote operations the list synchroniser depends on.
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<User>, ClientError>;
    async fn fetch_user(&self, id: &str) -> Result<User, ClientError>;
    async fn create_user(&self, draft: &UserDraft) -> Result<User, ClientError>;
    async fn update_user(&self, id: &str, draft: &UserDraft) -> Result<User, ClientError>;
    async fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<User, ClientError>;
    async fn delete_user(&self, id: &str) -> Result<(), ClientError>;
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(parse_error(response).await)
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        response.json().await.map_err(|e| {
            error!(error = %e, "response decode failed");
            ClientError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl UserApi for ApiClient {
    async fn fetch_users(&self) -> Result<Vec<User>, ClientError> {
        let response = self.send(self.client.get(self.url("/users"))).await?;
        let text = response.text().await.map_err(transport)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let users: Option<Vec<User>> = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "user list decode failed");
            ClientError::Decode(e.to_string())
        })?;
        let users = users.unwrap_or_default();
        debug!(count = users.len(), "users fetched");
        Ok(users)
    }

    async fn fetch_user(&self, id: &str) -> Result<User, ClientError> {
        self.json(self.client.get(self.url(&format!("/users/{id}"))))
            .await
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<User, ClientError> {
        self.json(self.client.post(self.url("/users")).json(draft))
            .await
    }

    async fn update_user(&self, id: &str, draft: &UserDraft) -> Result<User, ClientError> {
        self.json(self.client.put(self.url(&format!("/users/{id}"))).json(draft))
            .await
    }

    async fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<User, ClientError> {
        self.json(self.client.patch(self.url(&format!("/users/{id}"))).json(patch))
            .await
    }

    async fn delete_user(&self, id: &str) -> Result<(), ClientError> {
        self.send(self.client.delete(self.url(&format!("/users/{id}"))))
            .await?;
        Ok(())
    }
}

fn transport(e: reqwest::Error) -> ClientError {
    error!(error = %e, "request failed");
    ClientError::Transport(e.to_string())
}

async fn parse_error(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => GENERIC_ERROR.to_string(),
    };
    error!(status, %message, "request rejected");
    ClientError::Api { status, message }
}
