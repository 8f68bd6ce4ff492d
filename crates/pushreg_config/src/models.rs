// --- File: crates/pushreg_config/src/models.rs ---

use serde::{Deserialize, Serialize};

/// Default retention window for inactive registrations, in days.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Longest retention window accepted, in days (ten years).
pub const MAX_RETENTION_DAYS: i64 = 3650;

/// Default interval between two sweeper runs, in seconds (daily).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 86_400;

/// Default timeout for agent calls to the registry, in seconds.
pub const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 10;

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. "sqlite://data/registry.db", loaded via PUSHREG__DATABASE__URL
}

// --- Retention Config ---
// Governs the sweeper that hard-deletes long-inactive registrations.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetentionConfig {
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

fn default_retention_days() -> i64 {
    DEFAULT_RETENTION_DAYS
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

// --- Agent Config ---
// Client-side settings for the local registration agent.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentConfig {
    pub registry_url: String, // Mandatory, e.g. "https://push.example.com"
    #[serde(default = "default_agent_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub store_path: Option<String>,
}

fn default_agent_timeout_secs() -> u64 {
    DEFAULT_AGENT_TIMEOUT_SECS
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_sweeper: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub agent: Option<AgentConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            use_sweeper: false,
            database: None,
            retention: RetentionConfig::default(),
            agent: None,
        }
    }
}
