use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Connectivity diagnostics for the beacon backend client.
///
/// Mirrors the checks a stranded device would run: sweep every candidate
/// URL, run one discovery pass, or exercise the full fallback path with a
/// real API call.
#[derive(Debug, Parser)]
#[command(name = "beacon", version, about)]
pub struct Cli {
    /// Path to a JSON client configuration; defaults are used when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path of the persisted endpoint state file.
    #[arg(long, global = true, default_value = ".beacon-state.json")]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe every candidate endpoint and report each outcome.
    Probe,
    /// Run one discovery pass and print the selected endpoint.
    Discover,
    /// Resilient health check (cached endpoint first, fallback on failure).
    Health,
    /// Log in through the resilient dispatch path.
    Login(LoginArgs),
}

#[derive(Debug, clap::Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,
}
