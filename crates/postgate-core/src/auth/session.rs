use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
struct StoredToken {
    value: String,
    issued_at: DateTime<Utc>,
}

/// Ephemeral session holding at most one access token.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<StoredToken>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token, replacing any previous one.
    /// An empty token is not a session and clears the slot instead.
    pub fn set_token(&mut self, token: String) {
        if token.is_empty() {
            self.token = None;
            return;
        }
        self.token = Some(StoredToken {
            value: token,
            issued_at: Utc::now(),
        });
    }

    /// Get the bearer token if one is stored
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.value.as_str())
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    /// When the current token was stored
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.token.as_ref().map(|t| t.issued_at)
    }

    /// Whole minutes since the current token was stored
    pub fn token_age_minutes(&self) -> Option<i64> {
        self.issued_at()
            .map(|at| (Utc::now() - at).num_minutes().max(0))
    }
}
