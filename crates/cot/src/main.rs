mod cli;

use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use cot_core::{config::Config, pacing::FixedDelay, Broadcaster, GroupOutcome};
use cot_grammers::{GrammersApi, SessionConfig, TelegramChatService, TelegramSession};

use crate::cli::{BroadcastArgs, Cli, Commands, LoginArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cot_core::logging::init("cot")?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Broadcast(args) => broadcast(args).await,
        Commands::Login(args) => login(args).await,
    }
}

async fn broadcast(args: BroadcastArgs) -> anyhow::Result<()> {
    let message = tokio::fs::read_to_string(&args.msg_file)
        .await
        .with_context(|| format!("read file {} failed", args.msg_file.display()))?;
    if message.trim().is_empty() {
        bail!("message file {} is empty", args.msg_file.display());
    }

    let groups = match &args.group_list {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("open file {} failed", path.display()))?,
        ),
        None => None,
    };

    let cfg = Config::load()?;
    let session = TelegramSession::open(&SessionConfig::from(&cfg))
        .await
        .context("Telegram session start failed")?;

    let outcome = run_broadcast(&session, &cfg, &args, &message, groups.as_deref()).await;
    session.close().await;
    outcome
}

async fn run_broadcast(
    session: &TelegramSession,
    cfg: &Config,
    args: &BroadcastArgs,
    message: &str,
    groups: Option<&str>,
) -> anyhow::Result<()> {
    session.ensure_authorized().await?;

    let (service, updates) = TelegramChatService::new(GrammersApi::new(session.client()));
    let mut broadcaster = Broadcaster::connect(
        Arc::new(service),
        updates,
        Box::new(FixedDelay::new(cfg.pacing_interval)),
        cfg.eligibility_policy(),
    )
    .await?;

    match (&args.group_name, groups) {
        (Some(group), _) => {
            let report = broadcaster
                .broadcast(group, message)
                .await
                .with_context(|| format!("broadcast to '{group}' failed"))?;
            info!(
                "broadcast to {} done: {}/{} delivered",
                report.group,
                report.succeeded,
                report.attempted()
            );
            Ok(())
        }
        (None, Some(list)) => {
            let outcomes = broadcaster.broadcast_group_list(list.lines(), message).await;
            require_some_group(&outcomes)
        }
        (None, None) => Ok(()),
    }
}

/// A group list where every group failed is a failed run.
fn require_some_group(outcomes: &[GroupOutcome]) -> anyhow::Result<()> {
    if !outcomes.is_empty() && outcomes.iter().all(|o| o.result.is_err()) {
        bail!("all {} groups failed", outcomes.len());
    }
    Ok(())
}

async fn login(args: LoginArgs) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let Some(phone) = args.phone.or_else(|| cfg.phone.clone()) else {
        bail!("a phone number is required (--phone or PHONE)");
    };

    let session = TelegramSession::open(&SessionConfig::from(&cfg))
        .await
        .context("Telegram session start failed")?;
    let outcome = session.login(&phone, read_login_code).await;
    session.close().await;

    let user_id = outcome?;
    println!("Signed in as user {user_id}; session saved to {}", cfg.session_file);
    Ok(())
}

fn read_login_code() -> cot_core::Result<String> {
    print!("Enter the code Telegram sent you: ");
    let mut code = String::new();
    io::stdout()
        .flush()
        .and_then(|_| io::stdin().read_line(&mut code))
        .map_err(|e| cot_core::Error::External(format!("reading login code failed: {e}")))?;
    Ok(code)
}
