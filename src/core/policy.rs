//! Buffering and retry policy shared by all outputs

use serde::{Deserialize, Serialize};

/// Root directory of the collector's file buffers
pub const BUFFER_ROOT: &str = "/var/lib/fluentd";

pub const QUEUE_LIMIT_ENV: &str = "BUFFER_QUEUE_LIMIT";
pub const TOTAL_LIMIT_SIZE_ENV: &str = "TOTAL_LIMIT_SIZE";
pub const CHUNK_LIMIT_SIZE_ENV: &str = "BUFFER_SIZE_LIMIT";

pub const DEFAULT_QUEUE_LIMIT: &str = "32";
pub const DEFAULT_TOTAL_LIMIT_SIZE: &str = "8589934592";
pub const DEFAULT_CHUNK_LIMIT_SIZE: &str = "8m";

/// A value the collector may override from its environment at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tunable {
    /// Environment variable consulted by the collector
    pub env: &'static str,
    /// Value used when the variable is unset
    pub fallback: String,
}

impl Tunable {
    pub fn new(env: &'static str, fallback: impl Into<String>) -> Self {
        Self {
            env,
            fallback: fallback.into(),
        }
    }

    /// Runtime expression resolving the override, e.g.
    /// `#{ENV['BUFFER_QUEUE_LIMIT'] || '32'}`
    pub fn expression(&self) -> String {
        format!("#{{ENV['{}'] || '{}'}}", self.env, self.fallback)
    }
}

/// Fallback overrides read from the forwarder spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferOverrides {
    #[serde(default)]
    pub queue_limit: Option<String>,

    #[serde(default)]
    pub total_limit_size: Option<String>,

    #[serde(default)]
    pub chunk_limit_size: Option<String>,
}

/// Immutable buffer policy threaded through every output builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPolicy {
    pub flush_mode: String,
    pub flush_interval: String,
    pub flush_thread_count: u32,
    pub retry_type: String,
    pub retry_wait: String,
    pub retry_max_interval: String,
    pub retry_timeout: String,
    pub queued_chunks_limit_size: Tunable,
    pub total_limit_size: Tunable,
    pub chunk_limit_size: Tunable,
    pub overflow_action: String,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            flush_mode: "interval".to_string(),
            flush_interval: "1s".to_string(),
            flush_thread_count: 2,
            retry_type: "exponential_backoff".to_string(),
            retry_wait: "1s".to_string(),
            retry_max_interval: "60s".to_string(),
            retry_timeout: "60m".to_string(),
            queued_chunks_limit_size: Tunable::new(QUEUE_LIMIT_ENV, DEFAULT_QUEUE_LIMIT),
            total_limit_size: Tunable::new(TOTAL_LIMIT_SIZE_ENV, DEFAULT_TOTAL_LIMIT_SIZE),
            chunk_limit_size: Tunable::new(CHUNK_LIMIT_SIZE_ENV, DEFAULT_CHUNK_LIMIT_SIZE),
            overflow_action: "block".to_string(),
        }
    }
}

impl BufferPolicy {
    /// Default policy with the fallbacks replaced where an override is set
    pub fn with_overrides(overrides: &BufferOverrides) -> Self {
        let mut policy = Self::default();
        if let Some(ref v) = overrides.queue_limit {
            policy.queued_chunks_limit_size.fallback = v.clone();
        }
        if let Some(ref v) = overrides.total_limit_size {
            policy.total_limit_size.fallback = v.clone();
        }
        if let Some(ref v) = overrides.chunk_limit_size {
            policy.chunk_limit_size.fallback = v.clone();
        }
        policy
    }

    /// File buffer location for a match identified by `id`
    pub fn buffer_path(&self, id: &str) -> String {
        format!("{}/{}", BUFFER_ROOT, id)
    }
}
