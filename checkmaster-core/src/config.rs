use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::snapshot::SNAPSHOT_DB_FILE;
use crate::source::DEFAULT_API_URL;
use crate::store::pagination::{DEFAULT_FIRST_PAGE_SIZE, DEFAULT_PAGE_SIZE};

/// Browser-like default for the snapshot slot capacity.
pub const DEFAULT_SNAPSHOT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream collection endpoint.
    pub api_url: String,
    /// Directory for persistent state (the snapshot database).
    /// Defaults to current working directory.
    pub state_dir: PathBuf,
    pub first_page_size: usize,
    pub page_size: usize,
    pub http_timeout: Duration,
    /// Largest snapshot the slot accepts. `None` means unlimited.
    pub snapshot_quota_bytes: Option<usize>,
    /// Mirror list changes into the snapshot.
    pub sync_snapshot: bool,
    /// Skip fetches identical to one still in flight.
    pub dedupe_in_flight: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_dir: PathBuf::from("."),
            first_page_size: DEFAULT_FIRST_PAGE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            http_timeout: Duration::from_secs(30),
            snapshot_quota_bytes: Some(DEFAULT_SNAPSHOT_QUOTA_BYTES),
            sync_snapshot: true,
            dedupe_in_flight: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let api_url = lookup("CHECKMASTER_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.api_url);

        let state_dir = lookup("CHECKMASTER_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.state_dir);

        let first_page_size = parse_var(
            &lookup,
            "CHECKMASTER_FIRST_PAGE_SIZE",
            defaults.first_page_size,
        )?;
        if first_page_size == 0 {
            bail!("CHECKMASTER_FIRST_PAGE_SIZE must be greater than zero");
        }

        let page_size = parse_var(&lookup, "CHECKMASTER_PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 {
            bail!("CHECKMASTER_PAGE_SIZE must be greater than zero");
        }

        let http_timeout = Duration::from_secs(parse_var(
            &lookup,
            "CHECKMASTER_HTTP_TIMEOUT_SECS",
            defaults.http_timeout.as_secs(),
        )?);

        let snapshot_quota_bytes = parse_quota(parse_var(
            &lookup,
            "CHECKMASTER_SNAPSHOT_QUOTA_BYTES",
            DEFAULT_SNAPSHOT_QUOTA_BYTES,
        )?);

        let sync_snapshot = parse_var(&lookup, "CHECKMASTER_SYNC_SNAPSHOT", defaults.sync_snapshot)?;

        let dedupe_in_flight = parse_var(
            &lookup,
            "CHECKMASTER_DEDUPE_IN_FLIGHT",
            defaults.dedupe_in_flight,
        )?;

        Ok(Config {
            api_url,
            state_dir,
            first_page_size,
            page_size,
            http_timeout,
            snapshot_quota_bytes,
            sync_snapshot,
            dedupe_in_flight,
        })
    }

    /// Location of the snapshot database inside the state directory.
    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir.join(SNAPSHOT_DB_FILE)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        _ => Ok(default),
    }
}

/// A quota of zero disables the limit.
pub fn parse_quota(bytes: usize) -> Option<usize> {
    (bytes > 0).then_some(bytes)
}
