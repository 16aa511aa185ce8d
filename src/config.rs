//! Client configuration.
//!
//! Every [`GithubClient`](crate::api::client::GithubClient) owns its own
//! `ClientConfig`, so clients pointed at different repositories or servers
//! can live side by side.

use std::time::Duration;

use reqwest::Url;

use crate::error::{FetchError, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com/";
pub const DEFAULT_OWNER: &str = "geany";
pub const DEFAULT_REPOSITORY: &str = "geany";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = "release-fetcher";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API, always ending with `/`
    pub api_base_url: String,
    /// Default repository owner
    pub owner: String,
    /// Default repository name
    pub repository: String,
    /// Fixed timeout applied to every request
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.api_base_url = url;
        self
    }

    pub fn with_repository(mut self, owner: impl Into<String>, repository: impl Into<String>) -> Self {
        self.owner = owner.into();
        self.repository = repository.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds `{base}repos/{owner}/{repository}/{segments...}`.
    ///
    /// Every segment is percent-encoded, so `#`, `?`, `%` and `/` inside a
    /// segment stay part of the path.
    pub fn repo_url(&self, owner: &str, repository: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.api_base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(format!("{} cannot be a base", self.api_base_url)))?
            .pop_if_empty()
            .extend(["repos", owner, repository])
            .extend(segments);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_geany() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "https://api.github.com/");
        assert_eq!(config.owner, "geany");
        assert_eq!(config.repository, "geany");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = ClientConfig::new().with_api_base_url("http://127.0.0.1:8080");
        assert_eq!(config.api_base_url, "http://127.0.0.1:8080/");
        assert_eq!(
            config
                .repo_url("geany", "geany-plugins", &["releases", "latest"])
                .unwrap()
                .as_str(),
            "http://127.0.0.1:8080/repos/geany/geany-plugins/releases/latest"
        );
    }

    #[test]
    fn segments_are_percent_encoded() {
        let config = ClientConfig::new();
        let url = config
            .repo_url("geany", "geany", &["releases", "tags", "v1.0?x"])
            .unwrap();
        assert_eq!(url.path(), "/repos/geany/geany/releases/tags/v1.0%3Fx");
        assert_eq!(url.query(), None);

        let url = config
            .repo_url("geany", "geany", &["contents", "doc", "notes#1 100%.txt"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/geany/geany/contents/doc/notes%231%20100%25.txt"
        );
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn base_url_with_prefix_keeps_prefix() {
        let config = ClientConfig::new().with_api_base_url("https://ghe.example.com/api/v3");
        let url = config.repo_url("geany", "geany", &["releases", "latest"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/geany/geany/releases/latest"
        );
    }

    #[test]
    fn unparseable_base_url_is_an_error() {
        let config = ClientConfig::new().with_api_base_url("not a url");
        let err = config.repo_url("geany", "geany", &["releases", "latest"]).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[test]
    fn repository_override_keeps_other_settings() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_millis(250))
            .with_repository("rust-lang", "rust");
        assert_eq!(config.owner, "rust-lang");
        assert_eq!(config.repository, "rust");
        assert_eq!(config.timeout, Duration::from_millis(250));
    }
}
