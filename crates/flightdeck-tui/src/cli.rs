//! CLI argument parsing for flightdeck.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flightdeck")]
#[command(about = "Double-tap Shift quick launcher for the terminal", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug logging (logs to /tmp/flightdeck.log)
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive TUI mode (default)
    Tui,

    /// List configured keymaps, marking entries that cannot launch
    Keymaps,

    /// Print the URL a key would open
    Resolve {
        /// Keymap key
        key: String,
        /// Text to substitute for the query placeholder
        #[arg(default_value = "")]
        query: String,
    },
}
