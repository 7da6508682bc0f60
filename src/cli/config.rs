use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::dispatch::backend::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_MS};
use crate::observe::controller::{DEFAULT_GRACE_PERIOD_MS, Mode};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-autofill",
    version,
    about = "Detects form fields on rendered documents and fills them from an autofill backend"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Autofill backend endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Path to the viewer bridge script
    #[arg(long, global = true)]
    pub bridge_script: Option<String>,

    /// Path to config file (default: form-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect form fields and fill them from the backend
    Fill {
        /// Document to open in the viewer bridge
        #[arg(long)]
        url: String,

        /// Operating mode: auto, static, or viewer
        #[arg(long, default_value = "auto")]
        mode: String,

        /// Stop after this many surface events (viewer mode)
        #[arg(long)]
        max_events: Option<usize>,

        /// Write a JSONL pipeline trace to this file
        #[arg(long)]
        trace: Option<String>,
    },

    /// Detect form fields and print them without filling
    Scan {
        /// Document to open in the viewer bridge
        #[arg(long)]
        url: String,

        /// Operating mode: auto, static, or viewer
        #[arg(long, default_value = "auto")]
        mode: String,

        /// Stop after this many surface events (viewer mode)
        #[arg(long)]
        max_events: Option<usize>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-autofill.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub observe: ObserveFileConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra attempts per chunk. Zero preserves the single-shot behavior.
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserveFileConfig {
    #[serde(default = "default_mode")]
    pub mode: String,

    #[serde(default = "default_grace_ms")]
    pub grace_period_ms: u64,
}

impl Default for ObserveFileConfig {
    fn default() -> Self {
        Self {
            mode: "auto".to_string(),
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_bridge_script")]
    pub script: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            script: default_bridge_script(),
        }
    }
}

// Serde default helpers
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_mode() -> String {
    "auto".to_string()
}
fn default_grace_ms() -> u64 {
    DEFAULT_GRACE_PERIOD_MS
}
fn default_bridge_script() -> String {
    "node/viewer-bridge/viewer_bridge.js".to_string()
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-autofill.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

/// Map a mode name to an operating mode. Unknown names resolve to `Auto`.
pub fn resolve_mode(name: &str) -> Mode {
    match name {
        "static" => Mode::Static,
        "viewer" => Mode::Viewer,
        _ => Mode::Auto,
    }
}
