use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use dtf_ui::cli::{self, ResultsOptions, UpdateOptions};
use dtf_ui::results::SortColumn;

#[derive(Debug, Parser)]
#[command(name = "dtf-ui")]
#[command(about = "Render and manage dtf test results from the command line")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Format an ISO 8601 duration, e.g. P1DT2H30M15.5S
    Duration { iso: String },
    /// Print the badge HTML for a status label
    Badge { status: String },
    /// Print the HTML for a typed value given as JSON
    RenderValue {
        /// `{"type": ..., "data": ...}` or `null`
        json: String,
        #[arg(long)]
        project: Option<String>,
        /// Submission the value links to
        #[arg(long)]
        source: Option<String>,
    },
    /// Print the results table of a results file
    Results {
        /// JSON file with `results` and optional `references`
        file: PathBuf,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        test_id: String,
        /// Show the reference selection checkboxes
        #[arg(long)]
        can_update: bool,
        /// Only show rows with these statuses
        #[arg(long, num_args = 1..)]
        status: Vec<String>,
        /// Sort by `name` or `status`
        #[arg(long, value_parser = cli::parse_sort_column)]
        sort: Option<SortColumn>,
        #[arg(long)]
        desc: bool,
    },
    /// Promote selected result values to the global references
    UpdateReferences {
        file: PathBuf,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        test_id: String,
        #[arg(long)]
        test_name: String,
        /// Existing reference set; a new one is created when omitted
        #[arg(long)]
        reference_set: Option<String>,
        /// Existing test reference to update
        #[arg(long)]
        test_reference: Option<String>,
        /// Measurement names to promote
        #[arg(long, num_args = 1.., required = true)]
        select: Vec<String>,
    },
    /// Fetch or delete a form instance
    Instance {
        #[command(subcommand)]
        action: InstanceAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum InstanceAction {
    /// GET {base}{id} and print the instance
    Get { base: String, id: String },
    /// DELETE {base}{id}
    Delete { base: String, id: String },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config to ~/.dtf/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Duration { iso } => cli::run_duration(&iso),
        Commands::Badge { status } => cli::run_badge(&status),
        Commands::RenderValue {
            json,
            project,
            source,
        } => cli::run_render_value(&json, project.as_deref(), source.as_deref()),
        Commands::Results {
            file,
            project,
            test_id,
            can_update,
            status,
            sort,
            desc,
        } => cli::run_results(
            &file,
            &ResultsOptions {
                project,
                test_id,
                can_update,
                statuses: status,
                sort,
                descending: desc,
            },
        ),
        Commands::UpdateReferences {
            file,
            project,
            test_id,
            test_name,
            reference_set,
            test_reference,
            select,
        } => cli::run_update_references(
            &file,
            &UpdateOptions {
                project,
                test_id,
                test_name,
                reference_set,
                test_reference,
                select,
            },
        ),
        Commands::Instance { action } => match action {
            InstanceAction::Get { base, id } => cli::run_instance_get(&base, &id),
            InstanceAction::Delete { base, id } => cli::run_instance_delete(&base, &id),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
        },
    }
}
