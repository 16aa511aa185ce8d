//! Request diagnostics.
//!
//! The client reports every round trip to a [`RequestObserver`]. The default
//! [`TracingObserver`] turns these reports into `tracing` events; tests swap in
//! their own observer to inspect what was reported.

use std::time::Duration;

use reqwest::{Method, StatusCode};

use crate::types::github::RateLimit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLog {
    pub method: Method,
    pub url: String,
    /// `None` when no response arrived (connection error or timeout)
    pub status: Option<StatusCode>,
    pub elapsed: Duration,
}

pub trait RequestObserver: Send + Sync {
    /// Called with the rate-limit headers of every response, before its status is checked.
    fn on_rate_limit(&self, rate_limit: &RateLimit);

    /// Called once per request, whatever the outcome.
    fn on_request(&self, log: &RequestLog);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_rate_limit(&self, rate_limit: &RateLimit) {
        tracing::info!(
            remaining = ?rate_limit.remaining,
            limit = ?rate_limit.limit,
            "Github rate limits: {}",
            rate_limit
        );
    }

    fn on_request(&self, log: &RequestLog) {
        tracing::info!(
            method = %log.method,
            url = %log.url,
            status = ?log.status.map(|s| s.as_u16()),
            "Requesting \"{} {}\" took {}s",
            log.method,
            log.url,
            log.elapsed.as_secs_f64()
        );
    }
}
