//! Command line front end for tablelist.
//!
//! Connection settings come from the environment (`JDBC_URL`,
//! `JDBC_USER`, `JDBC_PASSWORD`); flags only tune logging,
//! timeouts and how the settings are echoed.

use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::time::Duration;
use tablelist_core::{ConnectorRegistry, DatabaseSettings, EchoPolicy, RunOptions, list_tables};

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "tablelist")]
#[command(about = "List the tables visible to a database account")]
#[command(version)]
#[command(long_about = "
tablelist - print the tables a database account can see

Reads the connection settings from the environment, runs one read-only
query against INFORMATION_SCHEMA.TABLES and prints schema, name and type
of every table as a fixed-width report on stdout.

ENVIRONMENT:
  JDBC_URL       Connection URL (postgres://, mysql://, mariadb://, jdbc: prefix allowed)
  JDBC_USER      Account name
  JDBC_PASSWORD  Account password

EXAMPLES:
  JDBC_URL=jdbc:postgresql://localhost/shop JDBC_USER=app JDBC_PASSWORD=... tablelist
  tablelist --query-timeout 30 -v
  tablelist drivers
")]
pub struct Cli {
    /// Logging flags
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Optional subcommand; without one the report is printed
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Seconds to wait for the connection to open
    #[arg(
        long,
        env = "TABLELIST_CONNECT_TIMEOUT",
        value_parser = parse_seconds,
        value_name = "SECONDS"
    )]
    pub connect_timeout: Option<Duration>,

    /// Seconds to wait for each result of the query
    #[arg(
        long,
        env = "TABLELIST_QUERY_TIMEOUT",
        value_parser = parse_seconds,
        value_name = "SECONDS"
    )]
    pub query_timeout: Option<Duration>,

    /// Echo the password and URL userinfo in plaintext
    #[arg(long, help = "Echo configuration values without masking secrets")]
    pub reveal_secrets: bool,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the supported URL schemes
    Drivers,
}

/// Flags shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, help = "Suppress all log output except errors")]
    pub quiet: bool,
}

impl Cli {
    /// Timeouts requested on the command line.
    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        let mut options = RunOptions::default();
        if let Some(timeout) = self.connect_timeout {
            options = options.with_connect_timeout(timeout);
        }
        if let Some(timeout) = self.query_timeout {
            options = options.with_query_timeout(timeout);
        }
        options
    }

    /// How the configuration echo treats secrets.
    #[must_use]
    pub const fn echo_policy(&self) -> EchoPolicy {
        if self.reveal_secrets {
            EchoPolicy::Plaintext
        } else {
            EchoPolicy::Redacted
        }
    }
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: u64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number of seconds"))?;
    if seconds == 0 {
        return Err("timeout must be at least one second".to_string());
    }
    Ok(Duration::from_secs(seconds))
}

/// Writes one line per registered scheme.
///
/// # Errors
/// Propagates write failures.
pub fn write_driver_list<W: Write>(
    registry: &ConnectorRegistry,
    out: &mut W,
) -> std::io::Result<()> {
    if registry.is_empty() {
        writeln!(
            out,
            "No drivers compiled in. Rebuild with --features postgresql,mysql"
        )?;
        return Ok(());
    }

    writeln!(out, "Supported URL schemes:")?;
    for (scheme, connector) in registry.schemes() {
        writeln!(
            out,
            "  {scheme:<12} {:<12} e.g. {}",
            connector.name(),
            connector.example_url()
        )?;
    }
    Ok(())
}

/// Loads the settings from the environment and prints the table report.
///
/// Settings are echoed to `out` before the report.
///
/// # Errors
/// Returns the error of the first step that failed.
pub async fn run_report<W: Write>(
    registry: &ConnectorRegistry,
    policy: EchoPolicy,
    options: &RunOptions,
    mut out: W,
) -> tablelist_core::Result<usize> {
    let settings = DatabaseSettings::from_env(&mut out, policy)?;
    list_tables(registry, &settings, options, out).await
}

/// Runs the command selected by `cli`, writing to `out`.
///
/// # Errors
/// Returns any configuration, connection, query or output failure.
pub async fn execute<W: Write>(
    cli: &Cli,
    registry: &ConnectorRegistry,
    mut out: W,
) -> anyhow::Result<()> {
    match cli.command {
        Some(Command::Drivers) => {
            write_driver_list(registry, &mut out)?;
            Ok(())
        }
        None => {
            let rows = run_report(registry, cli.echo_policy(), &cli.run_options(), out).await?;
            tracing::debug!(rows, "done");
            Ok(())
        }
    }
}
