use std::{io, process, sync::Arc};

use bda_mcp_app::cli::{Cli, Commands, ProjectsCommands, ServeArgs};
use bda_mcp_app::config;
use bda_mcp_app::error::AppError;
use bda_mcp_app::services::{AutomationContext, build_automation_context};
use bda_mcp_app::tools::build_mcp_server;
use bda_mcp_server::{Transport, serve_http, serve_stdio};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let log_level = determine_log_level(&cli);
    init_tracing(log_level);

    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        process::exit(1);
    }
}

/// Logs always go to stderr; stdout carries the stdio transport and JSON output.
fn init_tracing(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("Tracing subscriber already set; skipping re-initialization.");
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Serve(ServeArgs::default()));
    let mut config = config::load()?;

    match command {
        Commands::Serve(args) => {
            args.apply(&mut config.server);
            let ctx = context(&config).await?;
            let server = Arc::new(build_mcp_server(ctx)?);
            tracing::info!(transport = %config.server.transport, "starting MCP server");
            match config.server.transport {
                Transport::Stdio => serve_stdio(server).await?,
                Transport::Http => serve_http(&config.server, server).await?,
            }
        }
        Commands::Projects(args) => {
            let ctx = context(&config).await?;
            match args.command {
                ProjectsCommands::List => print_json(&ctx.list_projects().await?)?,
                ProjectsCommands::Get { project_arn } => {
                    print_json(&ctx.get_project(&project_arn).await?)?
                }
            }
        }
        Commands::Analyze(args) => {
            let ctx = context(&config).await?;
            let result = ctx
                .analyze(&args.asset, args.project_arn.as_deref())
                .await?;
            print_json(&result)?;
        }
    }

    Ok(())
}

async fn context(config: &config::AppConfig) -> Result<Arc<AutomationContext>, AppError> {
    Ok(Arc::new(build_automation_context(config).await?))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn determine_log_level(cli: &Cli) -> LevelFilter {
    match cli.command.as_ref() {
        None | Some(Commands::Serve(_)) => match cli.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        },
        Some(Commands::Projects(_)) | Some(Commands::Analyze(_)) => match cli.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        },
    }
}
