//! Data-source selection policy.
//!
//! Resolves which strategy a fetch uses: a per-call override always wins,
//! otherwise the configured default applies while the global switch is on,
//! and [`DataSource::LocalFirst`] applies while it is off.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Ordering policy for consulting the local cache and the remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DataSource {
    /// Remote only; successful values are persisted.
    NetworkOnly = 0,
    /// Local only; absence is a failure.
    LocalOnly = 1,
    /// Local when present, remote otherwise.
    #[default]
    LocalFirst = 2,
    /// Remote, falling back to local on failure.
    NetworkFirst = 3,
    /// Local immediately, then remote.
    CacheThenNetwork = 4,
}

impl DataSource {
    pub const ALL: [DataSource; 5] = [
        DataSource::NetworkOnly,
        DataSource::LocalOnly,
        DataSource::LocalFirst,
        DataSource::NetworkFirst,
        DataSource::CacheThenNetwork,
    ];

    fn from_u8(value: u8) -> Self {
        match value {
            0 => DataSource::NetworkOnly,
            1 => DataSource::LocalOnly,
            3 => DataSource::NetworkFirst,
            4 => DataSource::CacheThenNetwork,
            _ => DataSource::LocalFirst,
        }
    }

    /// Whether this strategy may touch the remote source.
    pub fn uses_remote(self) -> bool {
        !matches!(self, DataSource::LocalOnly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::NetworkOnly => "network_only",
            DataSource::LocalOnly => "local_only",
            DataSource::LocalFirst => "local_first",
            DataSource::NetworkFirst => "network_first",
            DataSource::CacheThenNetwork => "cache_then_network",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        DataSource::ALL
            .into_iter()
            .find(|source| source.as_str() == normalized)
            .ok_or_else(|| format!("unknown data source '{}'", s))
    }
}

/// Strategy resolution as a pure function of its inputs.
pub fn effective(
    call_override: Option<DataSource>,
    global_default: DataSource,
    global_enabled: bool,
) -> DataSource {
    call_override.unwrap_or(if global_enabled {
        global_default
    } else {
        DataSource::LocalFirst
    })
}

/// Shared, runtime-mutable data-source defaults.
///
/// Cloning yields a handle to the same settings. Reads and writes are
/// individually atomic but not transactional with each other: a read racing
/// a write may observe either value. Only configuration is racy this way,
/// never fetched data.
#[derive(Debug, Clone)]
pub struct DataSourceConfig {
    global_default: Arc<AtomicU8>,
    global_enabled: Arc<AtomicBool>,
}

impl DataSourceConfig {
    pub fn new(global_default: DataSource, global_enabled: bool) -> Self {
        Self {
            global_default: Arc::new(AtomicU8::new(global_default as u8)),
            global_enabled: Arc::new(AtomicBool::new(global_enabled)),
        }
    }

    pub fn global_default(&self) -> DataSource {
        DataSource::from_u8(self.global_default.load(Ordering::Relaxed))
    }

    pub fn is_global_enabled(&self) -> bool {
        self.global_enabled.load(Ordering::Relaxed)
    }

    pub fn set_global_data_source(&self, source: DataSource) {
        let old = DataSource::from_u8(self.global_default.swap(source as u8, Ordering::Relaxed));
        if old != source {
            tracing::info!(old = %old, new = %source, "Global data source changed");
        }
    }

    pub fn enable_global(&self) {
        self.global_enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable_global(&self) {
        self.global_enabled.store(false, Ordering::Relaxed);
    }

    /// Strategy for one fetch call.
    pub fn resolve(&self, call_override: Option<DataSource>) -> DataSource {
        let resolved = effective(
            call_override,
            self.global_default(),
            self.is_global_enabled(),
        );
        tracing::debug!(
            call_override = ?call_override,
            resolved = %resolved,
            "Resolved data source"
        );
        resolved
    }
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self::new(DataSource::LocalFirst, true)
    }
}
