//! Minimal read-only client for the GitHub REST API: file contents, releases
//! by tag and the latest release of a repository.

pub mod api;
pub mod config;
pub mod error;
pub mod types;

pub use api::client::GithubClient;
pub use api::observer::{RequestLog, RequestObserver, TracingObserver};
pub use config::ClientConfig;
pub use error::{FetchError, Result};
pub use types::github::{RateLimit, Release};
