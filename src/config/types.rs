use serde::{Deserialize, Serialize};

use crate::source::policy::{DataSource, DataSourceConfig};

/// Root configuration container.
///
/// Every section is optional in the file; missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_source: DataSourceSection,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Initial process-wide data-source policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceSection {
    /// Strategy used when a call has no override (default: local_first).
    #[serde(default)]
    pub default: DataSource,
    /// When false, calls without an override fall back to local_first.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl DataSourceSection {
    /// Runtime handle seeded from this section.
    pub fn to_runtime(&self) -> DataSourceConfig {
        DataSourceConfig::new(self.default, self.enabled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay unit in milliseconds; retry `n` waits `n` units (default: 1000).
    #[serde(default = "default_retry_backoff_base_ms")]
    pub retry_backoff_base_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Bound of each screen's event queue.
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Whole-request timeout for the HTTP adapter (default: 30).
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `INTENTFLOW_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_base_ms() -> u64 {
    1000
}

fn default_page_size() -> u32 {
    20
}

fn default_event_capacity() -> usize {
    64
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_timeout_seconds() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DataSourceSection {
    fn default() -> Self {
        Self {
            default: DataSource::default(),
            enabled: true,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_backoff_base_ms: default_retry_backoff_base_ms(),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
