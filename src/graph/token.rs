//! Bearer token source for Graph calls.
//!
//! Token acquisition and refresh happen outside this service; the provider
//! only hands out whatever token it currently holds.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Yields a bearer token, or `None` when no session is available.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Option<SecretString>;
}

/// Token fixed at start-up (e.g. `GRAPH_ACCESS_TOKEN`).
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<SecretString>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<SecretString>) -> Self {
        Self {
            token: token.filter(|t| !t.expose_secret().trim().is_empty()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Option<SecretString> {
        self.token.clone()
    }
}
