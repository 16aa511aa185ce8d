use std::sync::Arc;
use std::time::Instant;

use reqwest::{header, Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::api::observer::{RequestLog, RequestObserver, TracingObserver};
use crate::config::ClientConfig;
use crate::error::{FetchError, Result};
use crate::types::github::{ContentResponse, RateLimit, Release};

/// Read-only client for the file contents and releases endpoints.
pub struct GithubClient {
    client: Client,
    config: ClientConfig,
    observer: Arc<dyn RequestObserver>,
}

impl GithubClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        let user_agent = header::HeaderValue::from_str(&config.user_agent)
            .map_err(|e| FetchError::Client(format!("Invalid user agent: {}", e)))?;
        headers.insert(header::USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            config,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Replaces the default `tracing` diagnostics with a custom observer.
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches a file and returns its decoded text.
    ///
    /// `owner` and `repository` fall back to the configured defaults when
    /// `None` or empty.
    pub async fn get_file_contents(
        &self,
        filename: &str,
        owner: Option<&str>,
        repository: Option<&str>,
    ) -> Result<String> {
        let owner = non_empty(owner).unwrap_or(self.config.owner.as_str());
        let repository = non_empty(repository).unwrap_or(self.config.repository.as_str());
        // nested paths keep their `/`, everything else in a name is encoded
        let mut segments = vec!["contents"];
        segments.extend(filename.split('/').filter(|s| !s.is_empty()));
        let url = self.config.repo_url(owner, repository, &segments)?;

        let response = self.expect_response(&url).await?;
        let content: ContentResponse = self.read_json(&url, response).await?;
        content.decode()
    }

    /// Fetches a release of the default repository by tag.
    ///
    /// A 404 is an expected outcome here and yields `Ok(None)`.
    pub async fn get_release_by_tag(&self, tag_name: &str) -> Result<Option<Release>> {
        let url = self.default_repo_url(&["releases", "tags", tag_name])?;

        match self.request(&url, true).await? {
            Some(response) => self.read_json(&url, response).await.map(Some),
            None => Ok(None),
        }
    }

    /// Fetches the latest published release of the default repository.
    pub async fn get_latest_release(&self) -> Result<Release> {
        let url = self.default_repo_url(&["releases", "latest"])?;
        let response = self.expect_response(&url).await?;
        self.read_json(&url, response).await
    }

    fn default_repo_url(&self, segments: &[&str]) -> Result<Url> {
        self.config
            .repo_url(&self.config.owner, &self.config.repository, segments)
    }

    async fn expect_response(&self, url: &Url) -> Result<Response> {
        // `None` only ever stands for a 404
        self.request(url, false)
            .await?
            .ok_or_else(|| FetchError::Status {
                status: StatusCode::NOT_FOUND,
                url: url.to_string(),
                body: String::new(),
            })
    }

    /// Issues a single GET. Error statuses (4xx, 5xx) fail, except a 404 when
    /// `status_404_expected` is set, which resolves to `Ok(None)`.
    async fn request(&self, url: &Url, status_404_expected: bool) -> Result<Option<Response>> {
        let started = Instant::now();
        let sent = self.client.get(url.clone()).send().await;
        let elapsed = started.elapsed();

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                self.observer.on_request(&RequestLog {
                    method: Method::GET,
                    url: url.to_string(),
                    status: None,
                    elapsed,
                });
                return Err(self.transport_error(url, e));
            }
        };

        let status = response.status();
        self.observer
            .on_rate_limit(&RateLimit::from_headers(response.headers()));
        self.observer.on_request(&RequestLog {
            method: Method::GET,
            url: url.to_string(),
            status: Some(status),
            elapsed,
        });

        if status.is_client_error() || status.is_server_error() {
            if status == StatusCode::NOT_FOUND && status_404_expected {
                tracing::debug!(url = %url, "Resource not found (expected)");
                return Ok(None);
            }

            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Failed to read error response body");
                    String::new()
                }
            };
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
                body,
            });
        }

        Ok(Some(response))
    }

    async fn read_json<T: DeserializeOwned>(&self, url: &Url, response: Response) -> Result<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Decode(format!("{}: {}", url, e)))
    }

    fn transport_error(&self, url: &Url, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout: self.config.timeout,
            }
        } else {
            FetchError::Transport(error)
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
