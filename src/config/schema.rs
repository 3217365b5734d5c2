/// Configuration schema and defaults for dtf-ui.
///
/// Defines the TOML-serializable configuration with the `[server]`,
/// `[project]` and `[diagnostics]` sections. Every field has a built-in
/// default; users only set what they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level dtf-ui configuration.
///
/// Maps directly to the `~/.dtf/config.toml` and `.dtf.toml` file schemas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtfConfig {
    pub server: ServerConfig,
    pub project: ProjectConfig,
    pub diagnostics: DiagnosticsConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the dtf backend.
    pub base_url: String,
    /// Value sent in the `X-CSRFToken` header. Empty means no header.
    pub csrf_token: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            csrf_token: String::new(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [project]
// ---------------------------------------------------------------------------

/// Default project used when a command does not name one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub slug: String,
}

// ---------------------------------------------------------------------------
// [diagnostics]
// ---------------------------------------------------------------------------

/// Failure diagnostics log (`~/.dtf/client-events.jsonl`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub enabled: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl DtfConfig {
    /// Annotated default config written by `dtf-ui config init`.
    pub fn default_toml() -> String {
        r#"# dtf-ui Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (DTF_*)
#   2. Project config (.dtf.toml in current directory)
#   3. User global config (~/.dtf/config.toml)
#   4. Built-in defaults

[server]
base_url = "http://localhost:8000"
csrf_token = ""          # Sent as X-CSRFToken on every request
timeout_ms = 10000

[project]
slug = ""                # Default project for commands that take --project

[diagnostics]
enabled = true           # Append request failures to ~/.dtf/client-events.jsonl
"#
        .to_string()
    }
}
