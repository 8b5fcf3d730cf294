use std::path::PathBuf;

use bda_mcp_server::{ServerConfig, Transport};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI entry point.
#[derive(Debug, Parser)]
#[command(
    name = "bda-mcp",
    version,
    author,
    about = "Amazon Bedrock Data Automation tools over the Model Context Protocol"
)]
pub struct Cli {
    /// Defaults to `serve` so MCP clients can launch the bare binary.
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Increase logging verbosity (-v, -vv, -vvv). `RUST_LOG` takes precedence.
    #[arg(global = true, short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the MCP server.
    Serve(ServeArgs),
    /// Inspect Data Automation projects.
    Projects(ProjectsArgs),
    /// Upload a local asset, run it through a project and print the outputs.
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportArg {
    Stdio,
    Http,
}

impl From<TransportArg> for Transport {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Stdio => Transport::Stdio,
            TransportArg::Http => Transport::Http,
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Transport to serve on (overrides `server.transport`).
    #[arg(long, value_enum)]
    pub transport: Option<TransportArg>,
    /// Socket address for the HTTP transport (overrides `server.listen_addr`).
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,
}

impl ServeArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(transport) = self.transport {
            config.transport = transport.into();
        }
        if let Some(listen) = &self.listen {
            config.listen_addr = listen.clone();
        }
    }
}

#[derive(Debug, Args)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommands,
}

#[derive(Debug, Subcommand)]
pub enum ProjectsCommands {
    /// List every project visible to the configured account.
    List,
    /// Show one project.
    Get {
        #[arg(value_name = "ARN")]
        project_arn: String,
    },
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Local document, image, video or audio file.
    #[arg(value_name = "PATH")]
    pub asset: PathBuf,
    /// Project to run; the public default project when omitted.
    #[arg(long = "project", value_name = "ARN")]
    pub project_arn: Option<String>,
}
