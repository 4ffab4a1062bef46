//! Application state management for postgate.
//!
//! This module contains the `App` struct that owns the session controller
//! and all UI state: the current view, login form fields, list selection
//! and status line.

use std::future::Future;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use postgate_core::{ApiClient, ApiError, Config, Post, SessionController, SessionError};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Buffer size for the request result channel
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Environment variables that prefill the login form
const USERNAME_ENV: &str = "POSTGATE_USERNAME";
const PASSWORD_ENV: &str = "POSTGATE_PASSWORD";

// ============================================================================
// UI State Types
// ============================================================================

/// Which screen is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Login form, or the post panel once authenticated
    Login,
    /// Post panel regardless of session state
    Posts,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Posts => "Posts",
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

/// Response of a request that ran in a background task
pub enum OpResult {
    Login {
        username: String,
        response: Result<String, ApiError>,
    },
    Posts(Result<Vec<Post>, ApiError>),
    Refresh(Result<String, ApiError>),
    Logout(Result<(), ApiError>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    pub controller: SessionController,

    // UI State
    pub state: AppState,
    pub view: View,
    pub post_selection: usize,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,

    // Outcome of the last action, shown in the status bar
    pub status_message: Option<String>,

    // Background requests
    result_tx: mpsc::Sender<OpResult>,
    result_rx: mpsc::Receiver<OpResult>,
    pending_requests: usize,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        debug!(backend = api.base_url(), "API client configured");

        let login_username = config.last_username.clone().unwrap_or_default();
        let (result_tx, result_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            controller: SessionController::new(api),
            config,

            state: AppState::Normal,
            view: View::Login,
            post_selection: 0,

            login_username,
            login_password: String::new(),
            login_focus: LoginFocus::Username,

            status_message: None,

            result_tx,
            result_rx,
            pending_requests: 0,
        })
    }

    /// Prefill the login form from the environment
    pub fn prefill_login_from_env(&mut self) {
        if let Ok(username) = std::env::var(USERNAME_ENV) {
            self.login_username = username;
        }
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            self.login_password = password;
        }
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else if self.login_password.is_empty() {
            LoginFocus::Password
        } else {
            LoginFocus::Button
        };
    }

    /// Whether the login form is the active screen
    pub fn showing_login_form(&self) -> bool {
        self.view == View::Login && !self.controller.is_authenticated()
    }

    pub fn posts(&self) -> &[Post] {
        self.controller.posts()
    }

    /// Current error text, if the last operation failed
    pub fn error_message(&self) -> Option<String> {
        self.controller.last_error().map(|e| e.to_string())
    }

    /// Extra guidance for errors the user can act on
    pub fn error_hint(&self) -> Option<&'static str> {
        match self.controller.last_error()? {
            SessionError::Unauthorized => Some("Press [r] to refresh the token or [l] to log out"),
            SessionError::NoToken => Some("Press [Esc] to return to the login form"),
            _ => None,
        }
    }

    // =========================================================================
    // Session operations
    //
    // Requests run in spawned tasks so the event loop keeps drawing and
    // reading keys. Results come back on `result_rx` and are applied by
    // `check_background_tasks`.
    // =========================================================================

    /// Run a request in the background and deliver its result to the event loop
    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = OpResult> + Send + 'static,
    {
        let tx = self.result_tx.clone();
        self.pending_requests += 1;
        tokio::spawn(async move {
            if tx.send(request.await).await.is_err() {
                debug!("App dropped before request finished");
            }
        });
    }

    /// Attempt login with the credentials from the login form
    pub fn attempt_login(&mut self) {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        // Skipped while a session exists; empty fields fail locally
        if !matches!(self.controller.begin_login(&username, &password), Ok(true)) {
            return;
        }

        let api = self.controller.api().clone();
        self.spawn_request(async move {
            let response = api.login(&username, &password).await;
            OpResult::Login { username, response }
        });
    }

    pub fn fetch_posts(&mut self) {
        let Ok(token) = self.controller.begin_fetch() else {
            return;
        };
        let api = self.controller.api().clone();
        self.spawn_request(async move { OpResult::Posts(api.fetch_posts(&token).await) });
    }

    pub fn refresh_token(&mut self) {
        let api = self.controller.api().clone();
        self.spawn_request(async move { OpResult::Refresh(api.refresh_token().await) });
    }

    pub fn logout(&mut self) {
        let api = self.controller.api().clone();
        self.spawn_request(async move { OpResult::Logout(api.logout().await) });
    }

    /// Whether any request is still in flight
    pub fn is_busy(&self) -> bool {
        self.pending_requests > 0
    }

    /// Apply results of finished requests (non-blocking)
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.process_op_result(result);
        }
    }

    fn process_op_result(&mut self, result: OpResult) {
        self.pending_requests = self.pending_requests.saturating_sub(1);

        match result {
            OpResult::Login { username, response } => {
                if self.controller.apply_login(response).is_ok() {
                    self.on_logged_in(username);
                }
            }
            OpResult::Posts(response) => {
                if let Ok(posts) = self.controller.apply_posts(response) {
                    let count = posts.len();
                    self.status_message = Some(format!("Fetched {} posts", count));
                    self.post_selection = self.post_selection.min(count.saturating_sub(1));
                }
            }
            OpResult::Refresh(response) => {
                if self.controller.apply_refresh(response).is_ok() {
                    self.status_message = Some("Token refreshed".to_string());
                }
            }
            OpResult::Logout(response) => {
                if self.controller.apply_logout(response).is_ok() {
                    info!("Returning to login form");
                    self.status_message = Some("Logged out".to_string());
                    self.post_selection = 0;
                    self.view = View::Login;
                    self.login_focus = if self.login_username.is_empty() {
                        LoginFocus::Username
                    } else {
                        LoginFocus::Password
                    };
                }
            }
        }
    }

    fn on_logged_in(&mut self, username: String) {
        self.login_password.clear();
        self.status_message = Some(format!("Logged in as {}", username));

        if self.config.last_username.as_deref() != Some(username.as_str()) {
            self.config.last_username = Some(username);
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }

        if self.config.navigate_on_login {
            self.view = View::Posts;
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn select_next(&mut self, step: usize) {
        let last = self.posts().len().saturating_sub(1);
        self.post_selection = (self.post_selection + step).min(last);
    }

    pub fn select_prev(&mut self, step: usize) {
        self.post_selection = self.post_selection.saturating_sub(step);
    }

    pub fn select_last(&mut self) {
        self.post_selection = self.posts().len().saturating_sub(1);
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
