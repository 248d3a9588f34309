mod format;
mod local;
mod remote;

use std::path::PathBuf;

use blackfang_dashboard::{AlertFilter, Section};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::local::{LocalArgs, SourceArgs};
use crate::remote::RemoteCommands;

#[derive(Debug, Parser)]
#[command(name = "blackfang")]
#[command(about = "BlackFang Intelligence dashboard from the terminal")]
struct Cli {
    /// Print rendered views as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in with the configured demo account and print one section
    Render {
        #[arg(long, default_value = "dashboard")]
        section: Section,
        /// Severity filter for the alert list (all, LOW, MEDIUM, HIGH)
        #[arg(long, default_value = "all")]
        filter: AlertFilter,
        #[command(flatten)]
        login: LocalArgs,
    },
    /// Walk through login, filtering, read toggles and a refresh
    Demo {
        #[command(flatten)]
        login: LocalArgs,
    },
    /// Drive a live session with timers from stdin
    Repl {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Talk to a running API server
    Remote {
        /// Base URL of the API server
        #[arg(long, env = "BLACKFANG_API_URL", default_value = "http://127.0.0.1:3000")]
        url: String,
        /// Where the login session is kept between runs
        #[arg(long, env = "BLACKFANG_SESSION_FILE", default_value = ".blackfang/session.json")]
        session_file: PathBuf,
        #[command(subcommand)]
        command: RemoteCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = blackfang_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Render {
            section,
            filter,
            login,
        }) => local::run_render(&config, &login, section, filter, cli.json)?,
        Some(Commands::Demo { login }) => local::run_demo(&config, &login, cli.json)?,
        Some(Commands::Repl { source }) => local::run_repl(&config, source, cli.json).await?,
        Some(Commands::Remote {
            url,
            session_file,
            command,
        }) => remote::run_remote(&url, session_file, command, cli.json).await?,
        None => println!("blackfang: try `blackfang render` or `blackfang --help`"),
    }

    Ok(())
}
