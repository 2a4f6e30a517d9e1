use clap::Parser;
use std::path::PathBuf;
use war_core::DEFAULT_SHUFFLE_ROUNDS;

/// Web server for the two-player card game War.
#[derive(Debug, Clone, Parser)]
#[command(name = "war_server", version, about)]
pub struct Config {
    /// Listen hostname
    #[arg(long, env = "WAR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Listen port number
    #[arg(long, env = "WAR_PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite database file; games are kept in memory when omitted
    #[arg(long, env = "WAR_DATABASE")]
    pub database: Option<PathBuf>,

    /// Directory served under /public
    #[arg(long, env = "WAR_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Riffle rounds applied to each new deck
    #[arg(long, env = "WAR_SHUFFLE_ROUNDS", default_value_t = DEFAULT_SHUFFLE_ROUNDS)]
    pub shuffle_rounds: usize,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}
