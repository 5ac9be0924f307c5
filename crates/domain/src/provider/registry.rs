//! Provider lookup and URL classification.

use super::ProviderConfig;

/// The configured set of auth providers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderRegistry {
    providers: Vec<ProviderConfig>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Adds a provider, replacing any earlier one with the same key.
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.providers.retain(|p| p.key != provider.key);
        self.providers.push(provider);
        self
    }

    /// Looks up a provider by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.key == key)
    }

    /// Returns the provider a URL belongs to, if any.
    ///
    /// Providers are tested in registration order; the first match wins.
    #[must_use]
    pub fn classify(&self, url: &str) -> Option<&ProviderConfig> {
        if url.is_empty() {
            return None;
        }
        self.providers.iter().find(|p| p.matches(url))
    }

    /// Keys of the providers whose tokens are stored durably.
    pub fn durable_keys(&self) -> impl Iterator<Item = &str> {
        self.providers
            .iter()
            .filter(|p| p.is_durable())
            .map(|p| p.key.as_str())
    }

    /// Iterates over all providers.
    pub fn iter(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{LoginEndpoint, TokenPersistence};
    use pretty_assertions::assert_eq;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new()
            .with_provider(
                ProviderConfig::new(
                    "reqres",
                    "https://reqres.in/api",
                    LoginEndpoint::json_body("https://reqres.in/api/login", "email", "password", "/token"),
                )
                .with_pattern("reqres.in"),
            )
            .with_provider(
                ProviderConfig::new(
                    "petstore",
                    "https://petstore.swagger.io/v2",
                    LoginEndpoint::query(
                        "https://petstore.swagger.io/v2/user/login",
                        "username",
                        "password",
                        "/message",
                    ),
                )
                .with_persistence(TokenPersistence::MemoryOnly),
            )
    }

    #[test]
    fn test_classify_by_base_url_and_pattern() {
        let registry = registry();
        let key = |url: &str| registry.classify(url).map(|p| p.key.clone());

        assert_eq!(key("https://reqres.in/api/users/2"), Some("reqres".to_string()));
        assert_eq!(key("http://reqres.in/other"), Some("reqres".to_string()));
        assert_eq!(key("https://petstore.swagger.io/v2/pet/1"), Some("petstore".to_string()));
        assert_eq!(key("https://jsonplaceholder.typicode.com/posts"), None);
        assert_eq!(key(""), None);
    }

    #[test]
    fn test_durable_keys() {
        let registry = registry();
        assert_eq!(registry.durable_keys().collect::<Vec<_>>(), vec!["reqres"]);
    }

    #[test]
    fn test_with_provider_replaces_same_key() {
        let replacement = ProviderConfig::new(
            "reqres",
            "http://localhost:9000",
            LoginEndpoint::json_body("http://localhost:9000/login", "email", "password", "/token"),
        );
        let registry = registry().with_provider(replacement);

        assert_eq!(registry.iter().count(), 2);
        assert_eq!(
            registry.get("reqres").map(|p| p.base_url.as_str()),
            Some("http://localhost:9000")
        );
    }
}
