//! tablelist binary.
//!
//! Prints the tables visible to the configured database account.
//!
//! # Security Guarantees
//! - Read-only database operations only
//! - Passwords are masked in the configuration echo unless `--reveal-secrets` is given
//! - Credentials never reach the logs

use clap::Parser;
use tablelist::{Cli, execute};
use tablelist_core::{ConnectorRegistry, init_logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let registry = ConnectorRegistry::with_default_drivers();
    tracing::debug!(?registry, "drivers registered");

    execute(&cli, &registry, std::io::stdout().lock()).await
}
