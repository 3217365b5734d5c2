//! CLI command implementations for dtf-ui.
//!
//! Provides subcommand handlers for:
//! - `dtf-ui duration` / `badge` / `render-value`: run a renderer on one input
//! - `dtf-ui results FILE`: print the results table for a submission
//! - `dtf-ui update-references FILE`: promote selected values to references
//! - `dtf-ui instance get|delete`: fetch or delete a form instance
//! - `dtf-ui config show|init`: configuration management

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;
use serde_json::Value;

use crate::api::References;
use crate::badge::render_status_badge;
use crate::client::{ApiRequest, Backend, HttpBackend};
use crate::config::{self, DtfConfig};
use crate::diagnostics;
use crate::duration::Duration;
use crate::render::render_result_value;
use crate::results::{ReferenceUpdateRequest, ResultsTable, SortColumn, SortOrder, TestResult};
use crate::toast::{ToastKind, ToastNotifier};
use crate::value::{SourceId, TypedValue};

/// Results file read by `results` and `update-references`.
#[derive(Debug, Deserialize)]
pub struct ResultsFile {
    pub results: Vec<TestResult>,
    #[serde(default)]
    pub references: References,
    /// Properties of the reference set created when none is given.
    #[serde(default)]
    pub property_values: Option<Value>,
}

impl ResultsFile {
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("{} is not a valid results file", path.display()))
    }
}

/// Options of `dtf-ui results`.
#[derive(Debug, Clone, Default)]
pub struct ResultsOptions {
    pub project: Option<String>,
    pub test_id: String,
    pub can_update: bool,
    /// Show only rows with these status labels. Empty shows every row.
    pub statuses: Vec<String>,
    pub sort: Option<SortColumn>,
    pub descending: bool,
}

/// Options of `dtf-ui update-references`.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub project: Option<String>,
    pub test_id: String,
    pub test_name: String,
    pub reference_set: Option<String>,
    pub test_reference: Option<String>,
    pub select: Vec<String>,
}

// ---------------------------------------------------------------------------
// dtf-ui duration | badge | render-value
// ---------------------------------------------------------------------------

pub fn run_duration(iso: &str) -> Result<()> {
    let duration = Duration::parse(iso)?;
    println!("{}", duration.format());
    Ok(())
}

pub fn run_badge(status: &str) -> Result<()> {
    println!("{}", render_status_badge(status).to_html());
    Ok(())
}

pub fn run_render_value(json: &str, project: Option<&str>, source: Option<&str>) -> Result<()> {
    let value: Option<TypedValue> =
        serde_json::from_str(json).context("value must be a JSON {type, data} object or null")?;
    let config = config::load();
    let project = resolve_project(project, &config).unwrap_or_default();
    let source = source.map(source_id_arg);
    println!(
        "{}",
        render_result_value(&project, value.as_ref(), source.as_ref()).to_html()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// dtf-ui results
// ---------------------------------------------------------------------------

/// Print the results table of a results file as HTML.
pub fn run_results(file: &Path, opts: &ResultsOptions) -> Result<()> {
    let config = config::load();
    let project = require_project(opts.project.as_deref(), &config)?;
    let data = ResultsFile::read(file)?;

    let mut table = ResultsTable::build(
        &project,
        &opts.test_id,
        data.results,
        &data.references,
        opts.can_update,
    );
    apply_status_filter(&mut table, &opts.statuses);
    if let Some(column) = opts.sort {
        let order = if opts.descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        table.sort_by(column, order);
    }

    println!("{}", table.render().to_html());

    let shown = table.rows().iter().filter(|r| r.visible).count();
    eprintln!(
        "{}",
        format!("{shown} of {} results shown", table.rows().len()).dimmed()
    );
    Ok(())
}

/// Hide every status not listed in `statuses`.
fn apply_status_filter(table: &mut ResultsTable, statuses: &[String]) {
    if statuses.is_empty() {
        return;
    }
    let present: BTreeSet<String> = table.results().iter().map(|r| r.status.clone()).collect();
    for status in present {
        table.filter_status(&status, statuses.contains(&status));
    }
}

// ---------------------------------------------------------------------------
// dtf-ui update-references
// ---------------------------------------------------------------------------

/// Select rows by measurement name and promote their values to the global
/// references.
pub fn run_update_references(file: &Path, opts: &UpdateOptions) -> Result<()> {
    let config = config::load();
    let project = require_project(opts.project.as_deref(), &config)?;
    let data = ResultsFile::read(file)?;
    let property_values = data
        .property_values
        .unwrap_or_else(|| Value::Object(Default::default()));

    let mut table = ResultsTable::build(
        &project,
        &opts.test_id,
        data.results,
        &data.references,
        true,
    );

    let indices: Vec<usize> = opts
        .select
        .iter()
        .map(|name| {
            table
                .results()
                .iter()
                .position(|r| &r.name == name)
                .with_context(|| format!("no result named `{name}` in {}", file.display()))
        })
        .collect::<Result<_>>()?;
    for index in indices {
        table.set_selected(index, true);
    }

    let backend = HttpBackend::from_config(&config.server);
    let mut notifier = notifier_for(&config);
    let request = ReferenceUpdateRequest {
        test_name: opts.test_name.clone(),
        default_source: source_id_arg(&opts.test_id),
        reference_set_id: opts.reference_set.clone(),
        test_reference_id: opts.test_reference.clone(),
        property_values,
    };

    let outcome = table.submit_reference_update(&backend, &mut notifier, &request);
    print_toasts(&notifier);
    let outcome = outcome?;

    println!(
        "  {} {}",
        "Reference set: ".bold(),
        outcome.reference_set_id
    );
    if let Some(id) = &outcome.test_reference_id {
        println!("  {} {}", "Test reference:".bold(), id);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// dtf-ui instance get | delete
// ---------------------------------------------------------------------------

/// Fetch an instance (`GET {base}{id}`) and print it as JSON.
pub fn run_instance_get(base: &str, id: &str) -> Result<()> {
    let config = config::load();
    let backend = HttpBackend::from_config(&config.server);
    let mut notifier = notifier_for(&config);

    match backend.send(&ApiRequest::get(format!("{base}{id}"))) {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Err(err) => {
            notifier.report_failure("get_instance", format!("Failed to load instance {id}."), &err);
            print_toasts(&notifier);
            Err(err.into())
        }
    }
}

/// Delete an instance (`DELETE {base}{id}`).
pub fn run_instance_delete(base: &str, id: &str) -> Result<()> {
    let config = config::load();
    let backend = HttpBackend::from_config(&config.server);
    let mut notifier = notifier_for(&config);

    let outcome = backend.send(&ApiRequest::delete(format!("{base}{id}")));
    match &outcome {
        Ok(_) => {
            notifier.success(format!("Deleted instance {id}."));
        }
        Err(err) => {
            notifier.report_failure(
                "delete_instance",
                format!("Failed to delete instance {id}."),
                err,
            );
        }
    }
    print_toasts(&notifier);
    outcome.map(|_| ()).map_err(Into::into)
}

// ---------------------------------------------------------------------------
// dtf-ui config show | init
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective dtf-ui Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.dtf/config.toml", global_exists);
    print_source(".dtf.toml", project_exists);
    println!("  {} {}", "·".dimmed(), "DTF_* environment variables".dimmed());

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.dtf/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Set server.base_url and server.csrf_token for your backend.".dimmed()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A notifier that logs failures when diagnostics are enabled.
fn notifier_for(config: &DtfConfig) -> ToastNotifier {
    let notifier = ToastNotifier::new();
    match diagnostics::diagnostics_log_path() {
        Some(path) if config.diagnostics.enabled => notifier.with_diagnostics(path),
        _ => notifier,
    }
}

fn resolve_project(flag: Option<&str>, config: &DtfConfig) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| Some(config.project.slug.clone()))
        .filter(|slug| !slug.is_empty())
}

fn require_project(flag: Option<&str>, config: &DtfConfig) -> Result<String> {
    resolve_project(flag, config)
        .context("no project given. Pass --project or set project.slug / DTF_PROJECT")
}

/// Submission id given on the command line. Numeric ids are sent as JSON
/// numbers, the way the backend issues them.
fn source_id_arg(arg: &str) -> SourceId {
    arg.parse::<u64>()
        .map(SourceId::from)
        .unwrap_or_else(|_| SourceId::from(arg))
}

/// Print queued toasts, most recent last.
fn print_toasts(notifier: &ToastNotifier) {
    for toast in notifier.iter() {
        let marker = match toast.kind {
            ToastKind::Success => "✓".green().bold(),
            ToastKind::Danger => "✗".red().bold(),
            ToastKind::Warning => "!".yellow().bold(),
            ToastKind::Info => "i".blue().bold(),
        };
        println!("{} {}", marker, toast.content);
    }
}

/// Parse a `--sort` value.
pub fn parse_sort_column(s: &str) -> Result<SortColumn, String> {
    match s {
        "name" => Ok(SortColumn::Name),
        "status" => Ok(SortColumn::Status),
        other => Err(format!("unknown sort column `{other}` (expected name or status)")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
