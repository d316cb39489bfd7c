//! Resolution of the collector URL.
//!
//! A URL baked in at build time (`RANGELOG_SYNC_URL`) wins and makes the
//! runtime setting read-only. Otherwise the value stored in the config file
//! is used.

use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Endpoint fixed at compile time, if any.
pub const BUILD_SYNC_URL: Option<&str> = option_env!("RANGELOG_SYNC_URL");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    fixed: Option<String>,
    runtime: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Endpoint {
    pub fn new(fixed: Option<&str>, runtime: Option<&str>) -> Self {
        Self {
            fixed: non_empty(fixed),
            runtime: non_empty(runtime),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(BUILD_SYNC_URL, cfg.sync_url.as_deref())
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// The URL to post to, or [`AppError::NoEndpoint`] when none is configured.
    pub fn resolve(&self) -> AppResult<&str> {
        self.fixed
            .as_deref()
            .or(self.runtime.as_deref())
            .ok_or(AppError::NoEndpoint)
    }
}

/// Result of a runtime URL change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetUrl {
    Stored(String),
    Cleared,
    /// A build-time URL is present; the request was ignored.
    IgnoredFixed,
}

/// Apply a runtime URL change to `cfg`. An empty value clears the setting.
///
/// The caller persists `cfg` when the outcome is not `IgnoredFixed`.
pub fn apply_url(cfg: &mut Config, url: &str, fixed: Option<&str>) -> SetUrl {
    if non_empty(fixed).is_some() {
        return SetUrl::IgnoredFixed;
    }
    match non_empty(Some(url)) {
        Some(u) => {
            cfg.sync_url = Some(u.clone());
            SetUrl::Stored(u)
        }
        None => {
            cfg.sync_url = None;
            SetUrl::Cleared
        }
    }
}
