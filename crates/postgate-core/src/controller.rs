//! Session controller.
//!
//! `SessionController` owns the session, the fetched post list and the
//! most recent error. The four operations (login, fetch posts, refresh
//! token, logout) each make at most one request, never retry, and return
//! a `Result` so callers choose how to display failures. The last error
//! kind is also kept for front-ends that render it persistently.

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::Session;
use crate::models::Post;
use crate::utils::format_age_minutes;

/// User-facing failure kinds. Each displays a fixed message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Login failed. Please check your credentials.")]
    LoginFailed,

    #[error("Username and password required")]
    MissingCredentials,

    #[error("No access token found, please log in")]
    NoToken,

    #[error("Unauthorized. Please log in.")]
    Unauthorized,

    #[error("Failed to fetch posts")]
    FetchFailed,

    #[error("Failed to refresh token")]
    RefreshFailed,

    #[error("Failed to log out")]
    LogoutFailed,
}

pub struct SessionController {
    api: ApiClient,
    session: Session,
    posts: Vec<Post>,
    last_error: Option<SessionError>,
}

impl SessionController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            session: Session::new(),
            posts: Vec::new(),
            last_error: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_active()
    }

    /// Client for issuing requests outside the controller, e.g. from a spawned task
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn last_error(&self) -> Option<SessionError> {
        self.last_error
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Human-readable age of the current token, e.g. "5m ago"
    pub fn token_age_display(&self) -> Option<String> {
        self.session.token_age_minutes().map(format_age_minutes)
    }

    /// Record the outcome of an operation: errors overwrite, success clears.
    fn settle<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        self.last_error = result.as_ref().err().copied();
        result
    }

    // =========================================================================
    // Operations
    //
    // Each operation is a local precondition check, one request, and an
    // `apply_*` step. Front-ends that must not block on the request run the
    // check, issue the request through `api()` elsewhere, and hand the
    // response to the matching `apply_*`.
    // =========================================================================

    /// Whether a login request should be sent.
    /// `Ok(false)` while a session exists; empty fields fail locally.
    pub fn begin_login(&mut self, username: &str, password: &str) -> Result<bool, SessionError> {
        if self.session.is_active() {
            debug!("Login ignored, session already active");
            return Ok(false);
        }
        if username.is_empty() || password.is_empty() {
            return self.settle(Err(SessionError::MissingCredentials));
        }
        Ok(true)
    }

    pub fn apply_login(&mut self, response: Result<String, ApiError>) -> Result<(), SessionError> {
        let result = match response {
            Ok(token) => {
                self.session.set_token(token);
                info!("Login successful");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                Err(SessionError::LoginFailed)
            }
        };
        self.settle(result)
    }

    /// Exchange credentials for a token. Ignored while a session exists.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        if !self.begin_login(username, password)? {
            return Ok(());
        }
        let response = self.api.login(username, password).await;
        self.apply_login(response)
    }

    /// Token to authorize a posts request with; records `NoToken` when absent.
    pub fn begin_fetch(&mut self) -> Result<String, SessionError> {
        match self.session.token().map(str::to_string) {
            Some(token) => Ok(token),
            None => {
                warn!("Fetch posts without a token");
                self.settle(Err(SessionError::NoToken))
            }
        }
    }

    /// A 401 leaves both the token and the current posts in place; the
    /// caller decides whether to refresh or log out.
    pub fn apply_posts(&mut self, response: Result<Vec<Post>, ApiError>) -> Result<&[Post], SessionError> {
        let result = match response {
            Ok(posts) => {
                debug!(count = posts.len(), "Posts updated");
                self.posts = posts;
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                warn!("Posts request rejected as unauthorized");
                Err(SessionError::Unauthorized)
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch posts");
                Err(SessionError::FetchFailed)
            }
        };
        self.settle(result)?;
        Ok(&self.posts)
    }

    /// Replace the post list from the Resource API.
    pub async fn fetch_posts(&mut self) -> Result<&[Post], SessionError> {
        let token = self.begin_fetch()?;
        let response = self.api.fetch_posts(&token).await;
        self.apply_posts(response)
    }

    /// The old token survives a failed refresh.
    pub fn apply_refresh(&mut self, response: Result<String, ApiError>) -> Result<(), SessionError> {
        let result = match response {
            Ok(token) => {
                self.session.set_token(token);
                info!("Token refreshed");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to refresh token");
                Err(SessionError::RefreshFailed)
            }
        };
        self.settle(result)
    }

    /// Swap the session cookie for a new token.
    pub async fn refresh_token(&mut self) -> Result<(), SessionError> {
        let response = self.api.refresh_token().await;
        self.apply_refresh(response)
    }

    /// Local state is only cleared when the server confirms.
    pub fn apply_logout(&mut self, response: Result<(), ApiError>) -> Result<(), SessionError> {
        let result = match response {
            Ok(()) => {
                self.session.clear();
                self.posts.clear();
                info!("Logged out");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to log out");
                Err(SessionError::LogoutFailed)
            }
        };
        self.settle(result)
    }

    /// End the session server-side, then drop the token and posts.
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        let response = self.api.logout().await;
        self.apply_logout(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn offline_controller() -> SessionController {
        let config = Config {
            backend_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        SessionController::new(ApiClient::new(&config).unwrap())
    }

    #[test]
    fn test_initial_state() {
        let controller = offline_controller();
        assert!(!controller.is_authenticated());
        assert!(controller.posts().is_empty());
        assert_eq!(controller.last_error(), None);
        assert_eq!(controller.token_age_display(), None);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SessionError::LoginFailed.to_string(),
            "Login failed. Please check your credentials."
        );
        assert_eq!(SessionError::NoToken.to_string(), "No access token found, please log in");
        assert_eq!(SessionError::Unauthorized.to_string(), "Unauthorized. Please log in.");
        assert_eq!(SessionError::FetchFailed.to_string(), "Failed to fetch posts");
        assert_eq!(SessionError::RefreshFailed.to_string(), "Failed to refresh token");
        assert_eq!(SessionError::LogoutFailed.to_string(), "Failed to log out");
    }

    #[tokio::test]
    async fn test_fetch_without_token_makes_no_call() {
        let mut controller = offline_controller();
        assert_eq!(controller.fetch_posts().await.unwrap_err(), SessionError::NoToken);
        assert_eq!(controller.last_error(), Some(SessionError::NoToken));
        assert!(controller.posts().is_empty());
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let mut controller = offline_controller();
        assert_eq!(
            controller.login("", "pw").await.unwrap_err(),
            SessionError::MissingCredentials
        );
        assert_eq!(
            controller.login("user", "").await.unwrap_err(),
            SessionError::MissingCredentials
        );
        assert!(!controller.is_authenticated());

        controller.clear_error();
        assert_eq!(controller.last_error(), None);
    }

    #[test]
    fn test_apply_refresh_failure_keeps_token() {
        let mut controller = offline_controller();
        controller.apply_login(Ok("T".to_string())).unwrap();

        let err = controller
            .apply_refresh(Err(ApiError::InvalidResponse("empty access token".to_string())))
            .unwrap_err();
        assert_eq!(err, SessionError::RefreshFailed);
        assert_eq!(controller.token(), Some("T"));
    }

    #[test]
    fn test_apply_posts_unauthorized_keeps_posts() {
        let mut controller = offline_controller();
        controller.apply_login(Ok("T".to_string())).unwrap();
        controller
            .apply_posts(Ok(vec![Post::new("A")]))
            .unwrap();

        assert_eq!(
            controller.apply_posts(Err(ApiError::Unauthorized)).unwrap_err(),
            SessionError::Unauthorized
        );
        assert_eq!(controller.posts(), [Post::new("A")]);
        assert_eq!(controller.begin_fetch().unwrap(), "T");
    }

    #[test]
    fn test_begin_login_skips_when_authenticated() {
        let mut controller = offline_controller();
        assert!(controller.begin_login("u", "pw").unwrap());
        controller.apply_login(Ok("T".to_string())).unwrap();
        assert!(!controller.begin_login("u", "pw").unwrap());
    }
}
