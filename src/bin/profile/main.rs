//! Profile Insight CLI
//!
//! Sign in to the platform and view your XP, level and audit stats.

mod client;
mod commands;
mod style;
mod wizard;

use anyhow::Context;
use clap::{Parser, Subcommand};
use profile_insight::Config;
use style::*;
use tracing_subscriber::EnvFilter;

use crate::client::ProfileClient;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "profile")]
#[command(version)]
#[command(about = "Profile Insight - Your XP, level and audit stats", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        env = "PROFILE_CONFIG",
        default_value = "config.toml",
        global = true
    )]
    config: String,

    /// Override the sign-in endpoint
    #[arg(long, global = true)]
    auth_url: Option<String>,

    /// Override the GraphQL endpoint
    #[arg(long, global = true)]
    graphql_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with your username or email
    #[command(visible_alias = "l")]
    Login {
        /// Username or email (prompted if omitted)
        #[arg(short, long)]
        identifier: Option<String>,

        /// Sign in again even if the current session is still valid
        #[arg(long)]
        force: bool,
    },

    /// Sign out and forget the session token
    Logout,

    /// Show your profile (default)
    #[command(visible_alias = "s")]
    Show {
        /// Print the metrics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect the stored session token
    #[command(visible_alias = "st")]
    Status,

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    // In-flight requests are dropped on Ctrl-C
    let result = tokio::select! {
        result = run(&cli) => result,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("Interrupted")),
    };

    if let Err(e) = result {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;

    let client = ProfileClient::from_config(
        &config,
        cli.auth_url.as_deref(),
        cli.graphql_url.as_deref(),
    )?;

    match &cli.command {
        Some(Commands::Login { identifier, force }) => {
            commands::login::run(&client, identifier.clone(), *force).await
        }
        Some(Commands::Logout) => commands::logout::run(&client),
        Some(Commands::Show { json }) => commands::show::run(&client, *json).await,
        Some(Commands::Status) => commands::status::run(&client),
        Some(Commands::Config) => commands::config::run(&config, &client),
        None => commands::show::run(&client, false).await,
    }
}

pub fn print_banner() {
    println!();
    println!("  {}", style_cyan("Profile Insight"));
    println!("  {}", style_dim(&format!("v{}", VERSION)));
    println!();
}
