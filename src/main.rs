// Entrypoint for the local game: one positional command per invocation,
// run against the save file and written back when it changes the world.

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use worldc::commands;
use worldc::state::{StateStore, DEFAULT_STATE_PATH};
use worldc::ui::TerminalPrompter;

#[derive(Parser, Debug)]
#[command(name = "worldc", version, about = "Local world management game", long_about = None)]
struct Cli {
    /// Save file to operate on.
    #[arg(long, default_value = DEFAULT_STATE_PATH)]
    state: PathBuf,
    /// Command and its arguments, e.g. `build farm 3`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    worldc::logging::init();
    let cli = Cli::parse();

    // No command at all: show the usage text and fail.
    if cli.args.is_empty() {
        println!("{}", commands::HELP);
        return Ok(ExitCode::FAILURE);
    }

    let command = match commands::parse_args(&cli.args) {
        Ok(command) => command,
        Err(e) => {
            println!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    // Load the save file; a missing or corrupt file ends the run.
    let store = StateStore::new(cli.state);
    let mut state = match store.load() {
        Ok(state) => state,
        Err(e) => {
            println!("Error loading state: {e:#}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut prompter = TerminalPrompter::new();
    commands::execute(&command, &mut state, &mut prompter, &mut io::stdout())?;

    // Only commands that can change the world write the file back.
    if command.is_mutating() {
        if let Err(e) = store.save(&state) {
            println!("Error saving state: {e:#}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
