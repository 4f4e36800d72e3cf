// netops-mcp - Main Entry Point
//
// Serves MCP tool servers over streamable HTTP:
// - curl-server: proxies the local curl client
// - bigip-server: lists F5 BIG-IP LTM objects
//
// `invoke` and `manual` run the curl proxy once from the shell.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netops_mcp::bigip::BigIpClient;
use netops_mcp::config::Config;
use netops_mcp::curl::CurlProxy;
use netops_mcp::tools::ToolOutcome;
use netops_mcp::{logging, server};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

/// MCP tool servers for curl and F5 BIG-IP
#[derive(Parser, Debug)]
#[command(name = "netops-mcp")]
#[command(version)]
#[command(about = "MCP tool servers for curl and F5 BIG-IP", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Dotenv file to load before reading configuration (default: ./.env)
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the curl tools over MCP
    CurlServer {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Serve the BIG-IP object listing tool over MCP
    BigipServer {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run curl once with the given argument string and print the result
    Invoke {
        /// Arguments for curl, quoted as in a shell (e.g. "-s https://example.com")
        #[arg(allow_hyphen_values = true)]
        args: String,
    },
    /// Print the curl manual
    Manual,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let env_file = load_env_file(args.env_file.as_deref())?;
    let config = load_config(args.config.as_deref())?;
    logging::init(&config.logging, args.verbose)?;

    if let Some(path) = env_file {
        debug!("Loaded environment from {:?}", path);
    }

    match args.command {
        Commands::CurlServer { host, port } => {
            let proxy = Arc::new(CurlProxy::new(&config.curl));
            info!(
                "{} v{} serving '{}'",
                netops_mcp::mcp::CURL_SERVER_NAME,
                env!("CARGO_PKG_VERSION"),
                proxy.program()
            );

            let router = server::curl_router(proxy, &config);
            let host = host.unwrap_or_else(|| config.server.host.clone());
            server::serve(router, &host, port.unwrap_or(config.server.curl_port)).await?;
        }
        Commands::BigipServer { host, port } => {
            config.bigip.validate()?;
            let client = BigIpClient::new(&config.bigip).context("Failed to create BIG-IP client")?;
            info!(
                "{} v{} targeting {}",
                netops_mcp::mcp::BIGIP_SERVER_NAME,
                env!("CARGO_PKG_VERSION"),
                client.base_url()
            );

            let router = server::bigip_router(Arc::new(client), &config);
            let host = host.unwrap_or_else(|| config.server.host.clone());
            server::serve(router, &host, port.unwrap_or(config.server.bigip_port)).await?;
        }
        Commands::Invoke { args: curl_args } => {
            let proxy = CurlProxy::new(&config.curl);
            return Ok(print_outcome(proxy.invoke(&curl_args).await));
        }
        Commands::Manual => {
            let proxy = CurlProxy::new(&config.curl);
            return Ok(print_outcome(proxy.manual().await));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Load a dotenv file; variables already set in the environment win
fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(".env");
            if !default.exists() {
                return Ok(None);
            }
            default
        }
    };

    dotenvy::from_path(&path).with_context(|| format!("Failed to load env file {:?}", path))?;
    Ok(Some(path))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {:?}", path);
            }
            Config::load_from_path(path)
        }
        None => Config::load(),
    }
}

/// Print a one-shot result; diagnostics exit non-zero
fn print_outcome(outcome: ToolOutcome) -> ExitCode {
    let failed = outcome.is_diagnostic();
    let text = outcome.into_text();
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
