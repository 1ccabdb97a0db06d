#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod capture;
mod commands;
mod config;
mod dom;
mod emitter;
mod errors;
mod export;
mod gherkin;
mod locator;
mod resolver;
mod runner;
mod store;
mod types;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const _EXIT_COMMAND_ERROR: i32 = 1;
const _EXIT_STORE_FAILED: i32 = 2;
const _EXIT_BAD_INPUT: i32 = 3;
const _EXIT_NETWORK_FAILED: i32 = 4;
const _EXIT_TIMEOUT: i32 = 5;

use types::OutputFormat;

#[derive(Parser)]
#[command(name = "qaforge")]
#[command(about = "Test-automation scaffolding from DOM snapshots and captured calls", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Store file to use instead of ~/.qaforge/store.json
    #[arg(long, global = true)]
    store: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate steps, locators, and accessors from a session export
    Steps {
        /// Session export (DOM snapshot + events) as JSON
        input: PathBuf,

        /// Menu/group name inserted into every step sentence
        #[arg(long)]
        menu_name: Option<String>,

        /// Class name referenced by generated accessors
        #[arg(long)]
        element_class: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Resolve a parameter token against a session's DOM snapshot
    Resolve {
        /// Session export (DOM snapshot) as JSON
        input: PathBuf,

        /// Token to resolve (id, name, label text, ...)
        token: String,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Import an exported call log through the capture surface
    Ingest {
        /// JSON array of {url, method, body} entries
        input: PathBuf,
    },

    /// List captured requests
    List {
        /// Only show requests with this action
        #[arg(long)]
        action: Option<String>,

        /// Free-text search over URL, method, and payload
        #[arg(long)]
        search: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Replay captured requests and judge them against allowed statuses
    Run {
        /// Replay every captured request
        #[arg(long)]
        all: bool,

        /// Replay specific requests by index (repeatable, ordered)
        #[arg(long = "index")]
        indexes: Vec<usize>,

        /// With --all, restrict to one action group
        #[arg(long)]
        action: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Edit a captured request's URL or body before replay
    Edit {
        /// Request index as shown by `list`
        index: usize,

        /// Override the URL
        #[arg(long)]
        url: Option<String>,

        /// Override the body (JSON, form data, or plain text)
        #[arg(long)]
        body: Option<String>,

        /// Explicitly clear the body
        #[arg(long)]
        clear_body: bool,

        /// Drop all edits and replay the captured original
        #[arg(long)]
        revert: bool,
    },

    /// Export collected data as test artifacts
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Clear all captured requests and collected steps
    Reset,
}

#[derive(Subcommand)]
enum ExportCommands {
    /// JMeter test plan with one sampler per captured request
    Jmx {
        /// Output file
        #[arg(short, long, default_value = "plan.jmx")]
        output: PathBuf,
    },
    /// Parameter/value sheet as CSV
    Params {
        /// Output file
        #[arg(short, long, default_value = "params.csv")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print all settings
    Show {
        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },
    /// Change one setting
    Set {
        /// Setting name (base-url, allowed-status, timeout-ms, auth-token,
        /// logging-enabled, domain-filter, enabled, menu-name,
        /// element-class, page-class)
        key: String,
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            // Convert to our error type to get proper exit code
            let qaforge_err: errors::QaforgeError = err.into();

            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": qaforge_err.to_string(),
                "exit_code": qaforge_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {}", qaforge_err);
            std::process::exit(qaforge_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Initialize tracing to stderr (so JSON output to stdout remains clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qaforge=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();
    let store_path = cli.store;

    match cli.command {
        Commands::Steps {
            input,
            menu_name,
            element_class,
            format,
        } => {
            commands::steps::handle_steps(input, store_path, menu_name, element_class, format)
                .await?
        }

        Commands::Resolve {
            input,
            token,
            format,
        } => commands::resolve::handle_resolve(input, token, format).await?,

        Commands::Ingest { input } => commands::ingest::handle_ingest(input, store_path).await?,

        Commands::List {
            action,
            search,
            format,
        } => commands::list::handle_list(store_path, action, search, format).await?,

        Commands::Run {
            all,
            indexes,
            action,
            format,
        } => commands::run::handle_run(store_path, all, indexes, action, format).await?,

        Commands::Edit {
            index,
            url,
            body,
            clear_body,
            revert,
        } => {
            commands::edit::handle_edit(store_path, index, url, body, clear_body, revert).await?
        }

        Commands::Export { command } => match command {
            ExportCommands::Jmx { output } => {
                commands::export::handle_export_jmx(store_path, output).await?
            }
            ExportCommands::Params { output } => {
                commands::export::handle_export_params(store_path, output).await?
            }
        },

        Commands::Config { command } => match command {
            ConfigCommands::Show { format } => {
                commands::config::handle_config_show(store_path, format).await?
            }
            ConfigCommands::Set { key, value } => {
                commands::config::handle_config_set(store_path, key, value).await?
            }
        },

        Commands::Reset => commands::reset::handle_reset(store_path).await?,
    }

    Ok(())
}
