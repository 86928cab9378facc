//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use palliative_rx_core::monitor::DEFAULT_EXPIRY_WARNING_DAYS;
use palliative_rx_core::{Database, DbResult, MonitorSettings};

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str =
    "palliative_rx_server=info,palliative_rx_core=info,tower_http=info,warn";

/// Database path that selects a throwaway in-memory store.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Parser)]
#[command(name = "palliative-rx", version, about = "Palliative-care pharmacy management server")]
pub struct Cli {
    /// SQLite database file, or ":memory:"
    #[arg(long, env = "PALLIATIVE_RX_DATABASE", default_value = "palliative-rx.db", global = true)]
    pub database: PathBuf,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0", global = true)]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000, global = true)]
    pub port: u16,

    /// Directory of frontend files served at `/`
    #[arg(long, env = "STATIC_DIR", default_value = "public", global = true)]
    pub static_dir: PathBuf,

    /// Seconds between inventory monitor passes
    #[arg(long, default_value_t = 60, global = true)]
    pub worker_interval_secs: u64,

    /// Warn about stock expiring within this many days
    #[arg(long, default_value_t = DEFAULT_EXPIRY_WARNING_DAYS, global = true)]
    pub expiry_warning_days: i64,

    /// Serve without the background inventory monitor
    #[arg(long, global = true)]
    pub no_worker: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Replace all data with the demo data set
    Seed,
    /// Run one inventory monitor pass and print its report
    Scan,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }

    pub fn open_database(&self) -> DbResult<Database> {
        if self.database.as_os_str() == IN_MEMORY_DATABASE {
            Database::open_in_memory()
        } else {
            Database::open(&self.database)
        }
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            expiry_warning_days: self.expiry_warning_days,
        }
    }

    pub fn worker_interval(&self) -> Duration {
        Duration::from_secs(self.worker_interval_secs.max(1))
    }
}
