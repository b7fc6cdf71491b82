use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "calgrid", version, about = "Terminal date grid with persistent selection")]
pub struct Cli {
    /// Log level written to the log files (trace|debug|info|warn|error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a project calendar in the current directory
    Init {
        /// Optional calendar name
        #[arg(long)]
        name: Option<String>,
        /// First date in YYYY-MM-DD format (defaults to January 1st)
        #[arg(long)]
        start: Option<String>,
        /// Last date in YYYY-MM-DD format (defaults to December 31st)
        #[arg(long)]
        end: Option<String>,
        /// Allow more than one selected date
        #[arg(long)]
        multi: bool,
    },
    /// Print the segment containing a date (defaults to today)
    Show {
        /// Date in YYYY-MM-DD format
        date: Option<String>,
    },
    /// Toggle dates in the selection
    Select {
        /// Dates in YYYY-MM-DD format
        #[arg(required = true)]
        dates: Vec<String>,
        /// Keep dates that are already selected instead of toggling them off
        #[arg(long)]
        keep: bool,
    },
    /// Clear the selection
    DeselectAll,
    /// Describe the cell showing a date
    Status {
        /// Date in YYYY-MM-DD format
        date: String,
    },
    /// Launch the interactive TUI
    Tui,
}
