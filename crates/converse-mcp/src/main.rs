//! Converse MCP Server — entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use converse_mcp::config::{resolve_log_level, resolve_resource_root};
use converse_mcp::protocol::{methods, Dispatcher, ProtocolHandler};
use converse_mcp::registry::ServerBuilder;
use converse_mcp::transport::StdioTransport;
use converse_mcp::types::{SERVER_NAME, SERVER_VERSION};
use converse_mcp::{builtin, RequestContext};

#[derive(Parser)]
#[command(
    name = "converse-mcp",
    about = "MCP server exposing prompts, resources, and tools over stdio",
    version
)]
struct Cli {
    /// Directory whose files are served as resources.
    #[arg(short, long, global = true)]
    root: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Print server identity, capabilities, and registered names as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   converse-mcp completions bash > ~/.local/share/bash-completion/completions/converse-mcp
    ///   converse-mcp completions zsh > ~/.zfunc/_converse-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn build_dispatcher(root: Option<PathBuf>) -> anyhow::Result<Dispatcher> {
    if let Some(root) = &root {
        tracing::info!("Resource root: {}", root.display());
    }
    let builder = ServerBuilder::new(SERVER_NAME, SERVER_VERSION);
    let dispatcher = builtin::register(builder, root.as_deref())?.build()?;
    Ok(dispatcher)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = resolve_log_level(cli.log_level.as_deref());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let root = resolve_resource_root(cli.root.as_deref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let dispatcher = build_dispatcher(root)?;
            tracing::info!("Converse MCP server v{SERVER_VERSION}");
            let transport = StdioTransport::new(ProtocolHandler::new(dispatcher));
            transport.run().await?;
        }

        Commands::Info => {
            let dispatcher = build_dispatcher(root)?;
            let init = dispatcher
                .dispatch(methods::INITIALIZE, None, RequestContext::detached())
                .await?;
            let table = dispatcher.method_table();
            let info = serde_json::json!({
                "server": init["serverInfo"],
                "protocol_version": init["protocolVersion"],
                "capabilities": init["capabilities"],
                "methods": table.methods(),
                "prompts": table.prompts().iter().map(|p| &p.name).collect::<Vec<_>>(),
                "resources": table.resources().iter().map(|r| &r.uri).collect::<Vec<_>>(),
                "tools": table.tools().iter().map(|t| &t.name).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "converse-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}
