//! Operator CLI for the group-broadcast backend.

mod cmd;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use broadcast_client::{
    ClientError, FileStore, GroupCache, GroupDirectory, JobDispatcher, SessionContext, Transport,
};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "broadcast-admin", about = "Drive the group-broadcast backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured accounts and their authorization state
    Accounts,
    /// Show whether the active account is logged in
    AuthStatus,
    /// List groups for the active account
    Groups {
        /// Include channels and supergroups regardless of the stored preference
        #[arg(long)]
        all: bool,
        /// Ask the server to bypass its own cache
        #[arg(long)]
        refresh: bool,
    },
    /// Add group ids to the persisted selection
    Select { ids: Vec<i64> },
    /// Remove group ids from the persisted selection
    Deselect { ids: Vec<i64> },
    /// Show the persisted selection
    Selection,
    /// Clear the persisted selection
    ClearSelection,
    /// Submit a broadcast job and watch it to completion
    Send(SendArgs),
    /// Synchronous small-batch send, returning final counts directly
    TestSend(SendArgs),
    /// Show recent delivery log rows
    Logs {
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Invalidate the server-side group list cache
    ClearCache,
    /// Store the admin token for future invocations
    SetToken { token: String },
    /// Choose the active account
    SetAccount { account: String },
}

#[derive(Args)]
struct SendArgs {
    /// Message text
    #[arg(short, long)]
    message: String,
    /// Parse mode: plain, markdown or html
    #[arg(long, default_value = "plain")]
    parse_mode: String,
    /// Keep link previews enabled
    #[arg(long)]
    with_preview: bool,
    /// Delay between targets, in milliseconds
    #[arg(long, default_value_t = 1500)]
    delay_ms: u64,
    /// How many times to repeat the batch
    #[arg(long, default_value_t = 1)]
    rounds: u32,
    /// Pause between repeats, in seconds
    #[arg(long, default_value_t = 1200)]
    round_interval: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,broadcast_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            if let Some(client_err) = err.downcast_ref::<ClientError>() {
                eprintln!("{} {}", "hint:".yellow(), client_err.advice());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let store = Arc::new(FileStore::open(&config.state_path));
    let mut session = SessionContext::load(store.clone());
    if let Some(token) = &config.admin_token {
        session.set_token(token.clone());
    }

    let transport = Arc::new(Transport::new(
        config.api_url.clone(),
        session.token().unwrap_or_default(),
    )?);
    let directory = GroupDirectory::new(transport.clone(), GroupCache::new(store));
    let dispatcher = JobDispatcher::new(transport);

    match cli.command {
        Commands::Accounts => cmd::accounts::list(&directory).await,
        Commands::AuthStatus => cmd::accounts::auth_status(&directory, &session).await,
        Commands::Groups { all, refresh } => {
            cmd::groups::list(&directory, &mut session, all, refresh).await
        }
        Commands::Select { ids } => cmd::selection::add(&mut session, ids),
        Commands::Deselect { ids } => cmd::selection::remove(&mut session, ids),
        Commands::Selection => cmd::selection::show(&session),
        Commands::ClearSelection => cmd::selection::clear(&mut session),
        Commands::Send(args) => cmd::send::broadcast(&dispatcher, &session, args).await,
        Commands::TestSend(args) => cmd::send::test_send(&dispatcher, &session, args).await,
        Commands::Logs { limit } => cmd::logs::show(&directory, limit).await,
        Commands::ClearCache => cmd::groups::clear_cache(&directory, &session).await,
        Commands::SetToken { token } => {
            session.set_token(token);
            println!("{}", "token saved".green());
            Ok(())
        }
        Commands::SetAccount { account } => {
            session.set_account(account);
            println!("active account: {}", session.account().bold());
            Ok(())
        }
    }
}
