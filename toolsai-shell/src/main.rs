//! Tools-AI command line shell.
//!
//! Runs the license handshake on every start, then executes one command
//! against the local session and credential state.
//!
//! Usage:
//!   toolsai login <username> <license-key>
//!   toolsai api-key set <value>

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use toolsai_license::InitOutcome;
use toolsai_shell::{mask_credential, AppContext, ShellConfig};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "toolsai")]
#[command(about = "Tools-AI license and API key management")]
struct Args {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show session and credential status
    Status,
    /// Log in with a username and license key
    Login { username: String, license_key: String },
    /// Register and log in
    Register { username: String, license_key: String },
    /// End the session and forget saved credentials
    Logout,
    /// Print this device's hardware id
    Hwid,
    /// Manage the generation API key
    ApiKey {
        #[command(subcommand)]
        action: ApiKeyAction,
    },
}

#[derive(Subcommand, Debug)]
enum ApiKeyAction {
    /// Save an API key (empty clears it)
    Set { value: String },
    /// Remove the saved API key
    Clear,
    /// Show the active API key, masked
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let mut config = ShellConfig::load_or_default(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    debug!(data_dir = %config.data_dir().display(), "Starting");

    let ctx = AppContext::open(&config)?;
    match ctx.session().initialize().await {
        Ok(InitOutcome::ResumeFailed) => {
            warn!("Saved login is no longer valid; please log in again");
        }
        Ok(outcome) => info!("{}", outcome.message()),
        Err(e) => warn!(error = %e, "License service unavailable"),
    }

    run(&ctx, args.command).await
}

async fn run(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            let state = ctx.session().state().await;
            println!("State:       {state:?}");
            match ctx.session().session_info().await {
                Some(info) => {
                    println!("User:        {}", info.username);
                    println!("Plan:        {}", info.subscription.plan_name);
                    println!("Expires:     {}", info.subscription.expiry.to_rfc3339());
                    println!("Days left:   {}", info.subscription.days_remaining);
                    if let Some(at) = chrono::DateTime::from_timestamp(info.last_login, 0) {
                        println!("Last login:  {}", at.to_rfc3339());
                    }
                }
                None => println!("Not logged in"),
            }
            println!("Authorized:  {}", ctx.session().is_authorized().await);
        }
        Command::Login {
            username,
            license_key,
        } => {
            let info = ctx
                .sign_in(&username, &license_key)
                .await
                .context("Login failed")?;
            println!(
                "Welcome, {}! {} days remaining on plan '{}'.",
                info.username, info.subscription.days_remaining, info.subscription.plan_name
            );
        }
        Command::Register {
            username,
            license_key,
        } => {
            let info = ctx.register_and_sign_in(&username, &license_key).await?;
            println!(
                "Registered and logged in as {}. {} days remaining.",
                info.username, info.subscription.days_remaining
            );
        }
        Command::Logout => {
            ctx.session().logout().await.context("Logout failed")?;
            println!("Logged out.");
        }
        Command::Hwid => {
            println!("{}", ctx.session().hardware_id());
        }
        Command::ApiKey { action } => match action {
            ApiKeyAction::Set { value } => {
                ctx.credentials()
                    .set_credential(&value)
                    .await
                    .context("Failed to save API key")?;
                println!("API key updated.");
            }
            ApiKeyAction::Clear => {
                ctx.credentials()
                    .clear_credential()
                    .await
                    .context("Failed to clear API key")?;
                println!("API key cleared.");
            }
            ApiKeyAction::Show => {
                let credential = ctx.tool_credential().await?;
                println!(
                    "{} (from {})",
                    mask_credential(credential.value()),
                    credential.source()
                );
            }
        },
    }
    Ok(())
}
