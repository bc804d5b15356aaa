use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cot")]
#[command(about = "Broadcasts a message to the members of Telegram groups", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a message to every member of a group (or of each group in a list)
    Broadcast(BroadcastArgs),

    /// Sign the session file in with a login code sent by Telegram
    Login(LoginArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Phone number of the account, in international format (falls back to PHONE)
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["group_name", "group_list"])))]
pub struct BroadcastArgs {
    /// Public username of the group to broadcast to
    #[arg(long)]
    pub group_name: Option<String>,

    /// Path to a file with one group per line
    #[arg(long)]
    pub group_list: Option<PathBuf>,

    /// Path to the file holding the message text
    #[arg(long)]
    pub msg_file: PathBuf,
}
