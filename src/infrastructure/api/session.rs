//! Auth token storage used by the backend client

use std::path::PathBuf;

use async_trait::async_trait;

/// Values a previous session may have stored instead of a real token
const PLACEHOLDER_TOKENS: &[&str] = &["null", "undefined"];

fn usable(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() || PLACEHOLDER_TOKENS.contains(&token) {
        None
    } else {
        Some(token.to_string())
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current bearer token, if the user is signed in
    async fn token(&self) -> Option<String>;
}

/// Token kept in a plain file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn token(&self) -> Option<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => usable(&contents),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "No stored token");
                None
            }
        }
    }
}

/// Fixed token (or none)
#[derive(Debug, Clone, Default)]
pub struct StaticTokenStore {
    token: Option<String>,
}

impl StaticTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenStore for StaticTokenStore {
    async fn token(&self) -> Option<String> {
        self.token.as_deref().and_then(usable)
    }
}
