use crate::bridge::VerificationLevel;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rpresence
#[derive(Parser)]
#[command(
    name = "rpresence",
    version = env!("CARGO_PKG_VERSION"),
    about = "Timed presence sessions with liveness taps, streak rewards and wallet flows",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Make the simulated host cancel every command
    #[arg(global = true, long = "dev-cancel", hide = true)]
    pub dev_cancel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Sign in with the wallet held by the host app
    Login,

    /// Prove personhood through the host app
    Verify {
        #[arg(long, default_value = "daily-presence", help = "Action identifier")]
        action: String,

        #[arg(long, help = "Signal bound to the proof (default: wallet address)")]
        signal: Option<String>,

        #[arg(long, value_enum, default_value = "orb")]
        level: VerificationLevel,
    },

    /// Show balance, streak and boost state
    Status,

    /// Buy a one-time miss forgiveness for the next session
    Boost,

    /// Run a real-time presence session (Enter = tap, q = quit)
    Session {
        #[arg(
            long = "tick-every",
            default_value_t = 60,
            help = "Print the countdown every N seconds (0 = never)"
        )]
        tick_every: u32,
    },

    /// Run a session on a virtual clock with scripted taps
    Simulate {
        #[arg(long, help = "Comma-separated tap offsets in seconds, e.g. 60,120,180")]
        taps: Option<String>,

        #[arg(long, help = "Tap every N seconds")]
        every: Option<u32>,

        #[arg(long = "quit-at", help = "Quit at this second")]
        quit_at: Option<u32>,

        #[arg(long, help = "Completion date (YYYY-MM-DD), default today")]
        date: Option<String>,

        #[arg(long, short, help = "Also print the countdown")]
        verbose: bool,
    },

    /// Top up the balance with a host payment
    Buy {
        /// Amount of external currency to pay (e.g. 0.5)
        amount: String,
    },

    /// Submit a contract call through the host
    Tx {
        #[arg(long, help = "Contract address")]
        contract: String,

        #[arg(long, help = "Function to call")]
        function: String,

        /// Call arguments
        args: Vec<String>,
    },

    /// List recent sessions (or balance movements with --ledger)
    History {
        #[arg(long, short, default_value_t = 10)]
        limit: usize,

        #[arg(long, help = "Show balance movements instead of sessions")]
        ledger: bool,
    },
}
