mod cli;
mod commands;
mod logging;
mod storage;
mod ui;
mod viewport;

use anyhow::{anyhow, Result};
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let log_dir = storage::data_dir()?.join("logs");
    logging::init_logging(&args.log_level, &log_dir).map_err(|err| anyhow!(err))?;

    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init {
            name,
            start,
            end,
            multi,
        } => commands::init(name, start, end, multi),
        cli::Command::Show { date } => commands::show(date),
        cli::Command::Select { dates, keep } => commands::select(dates, keep),
        cli::Command::DeselectAll => commands::deselect_all(),
        cli::Command::Status { date } => commands::status(date),
        cli::Command::Tui => commands::tui(),
    }
}
