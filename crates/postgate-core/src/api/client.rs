//! API client for the auth demo backend.
//!
//! `ApiClient` wraps a shared `reqwest::Client` with a cookie store. The
//! cookie set by `/login` is what `/token` and `/logout` authenticate
//! with, so every clone of the client shares the same jar.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::models::Post;

use super::ApiError;

// ============================================================================
// Endpoint paths
// ============================================================================

const LOGIN_PATH: &str = "login";
const TOKEN_PATH: &str = "token";
const POSTS_PATH: &str = "posts";
const LOGOUT_PATH: &str = "logout";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

/// API client for the Auth and Resource APIs.
/// Clone is cheap - reqwest::Client uses Arc internally for the pool and cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from the configured backend URL and timeout
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base_url = Self::parse_base_url(&config.backend_url)?;

        let mut builder = Client::builder().cookie_store(true);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Base URL with a trailing slash so relative joins keep any path prefix.
    fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
        let mut normalized = raw.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let url = Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(raw.to_string()));
        }
        Ok(url)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn read_token(response: reqwest::Response) -> Result<String, ApiError> {
        let text = response.text().await?;
        Self::parse_token(&text)
    }

    /// A blank token is not a session, so it is rejected like a malformed payload.
    fn parse_token(text: &str) -> Result<String, ApiError> {
        let parsed: TokenResponse = serde_json::from_str(text)
            .map_err(|e| ApiError::InvalidResponse(format!("token payload: {}", e)))?;
        if parsed.access_token.trim().is_empty() {
            return Err(ApiError::InvalidResponse("empty access token".to_string()));
        }
        Ok(parsed.access_token)
    }

    // ===== Auth API =====

    /// Exchange credentials for an access token
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let url = self.endpoint(LOGIN_PATH)?;
        debug!(%url, username, "POST login");

        let response = self
            .client
            .post(url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::read_token(response).await
    }

    /// Exchange the session cookie for a fresh access token
    pub async fn refresh_token(&self) -> Result<String, ApiError> {
        let url = self.endpoint(TOKEN_PATH)?;
        debug!(%url, "POST token");

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::read_token(response).await
    }

    /// Terminate the server-side session. Any response body is ignored.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint(LOGOUT_PATH)?;
        debug!(%url, "DELETE logout");

        let response = self.client.delete(url).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Resource API =====

    /// Fetch the protected post list with bearer authorization
    pub async fn fetch_posts(&self, token: &str) -> Result<Vec<Post>, ApiError> {
        let url = self.endpoint(POSTS_PATH)?;
        debug!(%url, "GET posts");

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        let posts: Vec<Post> = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("posts payload: {}", e)))?;
        debug!(count = posts.len(), "Posts received");
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = ApiClient::parse_base_url("http://localhost:3000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/");
        assert_eq!(url.join(LOGIN_PATH).unwrap().as_str(), "http://localhost:3000/login");
    }

    #[test]
    fn test_parse_base_url_keeps_path_prefix() {
        let url = ApiClient::parse_base_url("https://example.com/api/").unwrap();
        assert_eq!(url.join(POSTS_PATH).unwrap().as_str(), "https://example.com/api/posts");

        let url = ApiClient::parse_base_url(" https://example.com/api ").unwrap();
        assert_eq!(url.join(TOKEN_PATH).unwrap().as_str(), "https://example.com/api/token");
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(matches!(
            ApiClient::parse_base_url("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::parse_base_url("mailto:someone@example.com"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_token_response_field_name() {
        let parsed: TokenResponse = serde_json::from_str(r#"{"accessToken":"abc"}"#)
            .expect("Failed to parse token JSON");
        assert_eq!(parsed.access_token, "abc");
        assert!(serde_json::from_str::<TokenResponse>(r#"{"token":"abc"}"#).is_err());
    }

    #[test]
    fn test_parse_token_rejects_blank() {
        assert_eq!(ApiClient::parse_token(r#"{"accessToken":"abc"}"#).unwrap(), "abc");
        assert!(matches!(
            ApiClient::parse_token(r#"{"accessToken":""}"#),
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(matches!(
            ApiClient::parse_token(r#"{"accessToken":"   "}"#),
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(matches!(
            ApiClient::parse_token("not json"),
            Err(ApiError::InvalidResponse(_))
        ));
    }
}
