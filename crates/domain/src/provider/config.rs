//! Per-provider configuration.

use super::LoginEndpoint;

/// How tokens of a provider are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenPersistence {
    /// Written through to the shared record store and re-read on every lookup.
    #[default]
    Durable,
    /// Kept in the process only; other processes never see it.
    MemoryOnly,
}

/// A provider that requires a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Provider key, also the durable slot name (e.g. `reqres`)
    pub key: String,
    /// Base URL of the provider API
    pub base_url: String,
    /// Extra URL substrings that identify the provider (e.g. a host name)
    pub url_patterns: Vec<String>,
    /// How to obtain a token
    pub login: LoginEndpoint,
    /// Token lifetime override; the gateway default applies when None
    pub token_ttl_seconds: Option<i64>,
    /// Caching policy
    pub persistence: TokenPersistence,
}

impl ProviderConfig {
    /// Creates a durable provider matched by its base URL.
    #[must_use]
    pub fn new(key: impl Into<String>, base_url: impl Into<String>, login: LoginEndpoint) -> Self {
        Self {
            key: key.into(),
            base_url: base_url.into(),
            url_patterns: Vec::new(),
            login,
            token_ttl_seconds: None,
            persistence: TokenPersistence::Durable,
        }
    }

    /// Adds a URL substring that also identifies this provider.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_patterns.push(pattern.into());
        self
    }

    /// Sets the caching policy.
    #[must_use]
    pub const fn with_persistence(mut self, persistence: TokenPersistence) -> Self {
        self.persistence = persistence;
        self
    }

    /// Sets the token lifetime.
    #[must_use]
    pub const fn with_ttl_seconds(mut self, ttl_seconds: i64) -> Self {
        self.token_ttl_seconds = Some(ttl_seconds);
        self
    }

    /// Returns true if the URL belongs to this provider.
    ///
    /// The base URL only matches at a path boundary, so `/api` covers
    /// `/api/users` but not `/apiary`.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let base = self.base_url.trim_end_matches('/');
        (!base.is_empty() && contains_at_boundary(url, base))
            || self
                .url_patterns
                .iter()
                .any(|p| !p.is_empty() && url.contains(p.as_str()))
    }

    /// Returns true if tokens of this provider go to the durable store.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        matches!(self.persistence, TokenPersistence::Durable)
    }
}

fn contains_at_boundary(url: &str, base: &str) -> bool {
    url.match_indices(base).any(|(start, _)| {
        matches!(
            url[start + base.len()..].chars().next(),
            None | Some('/' | '?' | '#')
        )
    })
}
