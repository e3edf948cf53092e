use anyhow::Result;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use tracing_subscriber::{self, filter::EnvFilter};

use firm_rules_mcp::{
    config::{ServiceConfig, default_data_directory},
    firm_rules_service::FirmRulesService,
    project_config::ProjectConfig,
};

/// Firm Rules MCP Server - case-routing rule base kept in synchronized CSV and JSON stores
#[derive(Parser, Debug)]
#[command(name = "firm-rules-mcp")]
#[command(about = "Model Context Protocol server for the firm-routing rule base")]
#[command(version)]
struct Args {
    /// Directory holding the rule stores
    #[arg(
        short = 'd',
        long = "data-dir",
        help = "Directory holding the rule stores (default: ~/.firm-rules)",
        value_name = "PATH"
    )]
    data_directory: Option<PathBuf>,

    /// Explicit project config file instead of discovering firmrules.yml
    #[arg(long = "config", value_name = "FILE")]
    config_file: Option<PathBuf>,

    #[arg(long = "tabular-file", value_name = "PATH", help = "CSV rule table")]
    tabular_file: Option<PathBuf>,

    #[arg(long = "document-file", value_name = "PATH", help = "JSON rule document")]
    document_file: Option<PathBuf>,

    #[arg(
        long = "audit-log",
        value_name = "PATH",
        help = "Append-only log of submitted rules"
    )]
    audit_log_file: Option<PathBuf>,

    /// Maximum number of open edit sessions
    #[arg(long = "session-capacity", help = "Maximum number of open edit sessions")]
    session_capacity: Option<usize>,

    /// Regenerate the CSV table from the JSON document before serving
    #[arg(long = "resync-on-start")]
    resync_on_start: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the MCP transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting MCP server with args: {:?}", args);

    let config = create_config_from_args(args)?;
    tracing::info!(
        tabular = %config.tabular_path().display(),
        document = %config.document_path().display(),
        "using rule stores"
    );

    let service = FirmRulesService::with_config(config)?;
    let rules = service.rule_service();
    rules.ensure_stores()?;
    if service.config().resync_on_start {
        let result = rules.resync().await?;
        tracing::info!(rules = result.rules_written, "resynchronized rule table on start");
    }

    let running = service.serve(stdio()).await?;

    tracing::info!("Service started, waiting for connections");
    running.waiting().await?;
    Ok(())
}

/// Create a ServiceConfig from the project config file and command line arguments
fn create_config_from_args(args: Args) -> Result<ServiceConfig> {
    let start_dir = args
        .data_directory
        .clone()
        .unwrap_or_else(default_data_directory);

    let project = match &args.config_file {
        Some(path) => {
            let mut project = ProjectConfig::from_file(path)?;
            if let Some(dir) = path.parent() {
                project.resolve_paths(dir);
            }
            Some(project)
        }
        None => ProjectConfig::discover(&start_dir)?.map(|(path, project)| {
            tracing::info!("Loaded project config from {}", path.display());
            project
        }),
    };

    let mut config = ServiceConfig::in_directory(start_dir).with_project_config(project.as_ref());

    if let Some(dir) = args.data_directory {
        config.data_directory = dir;
    }
    if let Some(file) = args.tabular_file {
        config.tabular_file = file;
    }
    if let Some(file) = args.document_file {
        config.document_file = file;
    }
    if let Some(file) = args.audit_log_file {
        config.audit_log_file = file;
    }
    if let Some(capacity) = args.session_capacity {
        config.session_capacity = capacity;
    }
    config.resync_on_start |= args.resync_on_start;

    Ok(config)
}
