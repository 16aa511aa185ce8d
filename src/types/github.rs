use std::fmt;

use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{FetchError, Result};

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Release objects are passed through to the caller untouched.
pub type Release = Map<String, Value>;

/// Body of `repos/{owner}/{repo}/contents/{path}`, reduced to the fields we read.
#[derive(Debug, Deserialize)]
pub struct ContentResponse {
    pub content: String,
    pub encoding: String,
}

impl ContentResponse {
    /// Decodes the file body into text. Only base64 payloads are supported.
    pub fn decode(&self) -> Result<String> {
        if self.encoding != "base64" {
            return Err(FetchError::UnsupportedEncoding(self.encoding.clone()));
        }

        // the API wraps the payload at 60 columns
        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let decoded = base64::decode(compact)?;
        Ok(String::from_utf8(decoded)?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: Option<u64>,
    pub limit: Option<u64>,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            remaining: header_u64(headers, RATE_LIMIT_REMAINING_HEADER),
            limit: header_u64(headers, RATE_LIMIT_LIMIT_HEADER),
        }
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", display_or_unknown(self.remaining), display_or_unknown(self.limit))
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

fn display_or_unknown(value: Option<u64>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}
