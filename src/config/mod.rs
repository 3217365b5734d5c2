/// Configuration system for dtf-ui.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: [`schema::DtfConfig::default()`]
/// 2. **User global config**: `~/.dtf/config.toml`
/// 3. **Project local config**: `.dtf.toml` in the current working directory
/// 4. **Environment variables**: `DTF_*` overrides (highest precedence)
///
/// Each file layer only overrides the keys it sets: a project file holding
/// just `[project] slug` keeps the server settings of the global file.
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::DtfConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> DtfConfig {
    let mut config = load_layers(&[global_config_file(), project_config_file()]);
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Merge the given TOML files, lowest precedence first, over the defaults.
///
/// Missing or malformed files are skipped, as is a merge result that no
/// longer fits the schema.
fn load_layers(paths: &[Option<PathBuf>]) -> DtfConfig {
    let Ok(mut merged) = toml::Value::try_from(DtfConfig::default()) else {
        return DtfConfig::default();
    };

    for layer in paths.iter().filter_map(|p| load_toml_file(p.as_deref())) {
        let mut candidate = merged.clone();
        merge_toml(&mut candidate, layer);
        if candidate.clone().try_into::<DtfConfig>().is_ok() {
            merged = candidate;
        }
    }

    merged.try_into().unwrap_or_default()
}

/// Parse a TOML file into a value tree. Missing or malformed files yield
/// `None`.
fn load_toml_file(path: Option<&Path>) -> Option<toml::Value> {
    let content = fs::read_to_string(path?).ok()?;
    toml::from_str(&content).ok()
}

/// Overlay `layer` onto `base`. Tables merge key by key; any other value
/// replaces what was there.
fn merge_toml(base: &mut toml::Value, layer: toml::Value) {
    match (base, layer) {
        (toml::Value::Table(base), toml::Value::Table(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.dtf/config.toml`
pub fn global_config_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".dtf").join("config.toml"))
}

/// `.dtf.toml` in the current directory.
pub fn project_config_file() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".dtf.toml"))
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply `DTF_*` overrides.
///
/// Supported variables:
/// - `DTF_BASE_URL`: backend base URL
/// - `DTF_CSRF_TOKEN`: CSRF token
/// - `DTF_TIMEOUT_MS`: request timeout
/// - `DTF_PROJECT`: default project slug
/// - `DTF_DIAGNOSTICS`: diagnostics log (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut DtfConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("DTF_BASE_URL")
        && !val.is_empty()
    {
        config.server.base_url = val;
    }
    if let Some(val) = var("DTF_CSRF_TOKEN") {
        config.server.csrf_token = val;
    }
    if let Some(val) = var("DTF_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.server.timeout_ms = ms;
    }
    if let Some(val) = var("DTF_PROJECT")
        && !val.is_empty()
    {
        config.project.slug = val;
    }
    if let Some(val) = var("DTF_DIAGNOSTICS") {
        config.diagnostics.enabled = is_truthy(&val);
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / show
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.dtf/config.toml`.
///
/// Fails if the file exists unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_file().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.dtf/ directory")?;
    }

    fs::write(&path, DtfConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// The effective config as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
