// UI layer: interactive menus and prompts built on `dialoguer`. The
// command tables themselves live in `shell`; this module only collects
// input, shows spinners and drives the loops.

use crate::api::{id_text, ApiClient, Credentials};
use crate::commands::{parse_answer, Prompter, ReaderPrompter};
use crate::session::{ColonySession, FleetSession};
use crate::shell::{ColonyShell, FleetShell, Flow};
use anyhow::Result;
use crossterm::tty::IsTty;
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, StdinLock, Stdout, Write};
use std::time::Duration;
use tracing::info;

/// Asks the research questions. On a terminal this is a dialoguer prompt;
/// when stdin is piped the answers are read from it directly, since
/// dialoguer refuses to run without a TTY. Anything that is not a
/// non-negative integer counts as zero.
pub enum TerminalPrompter {
    Interactive,
    Piped(ReaderPrompter<StdinLock<'static>, Stdout>),
}

impl TerminalPrompter {
    pub fn new() -> Self {
        let stdin = io::stdin();
        if stdin.is_tty() {
            TerminalPrompter::Interactive
        } else {
            TerminalPrompter::Piped(ReaderPrompter::new(stdin.lock(), io::stdout()))
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask_number(&mut self, question: &str) -> io::Result<u64> {
        match self {
            TerminalPrompter::Interactive => {
                let answer: String = Input::new()
                    .with_prompt(question)
                    .allow_empty(true)
                    .interact_text()?;
                Ok(parse_answer(&answer))
            }
            TerminalPrompter::Piped(reader) => reader.ask_number(question),
        }
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Read one command line after a prompt.
fn read_line(prompt: &str) -> Result<String> {
    let line: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(line)
}

/// Feed prompt lines to `dispatch` until it asks to stop.
fn run_shell<F>(prompt: &str, mut dispatch: F) -> Result<Flow>
where
    F: FnMut(&str, &mut dyn Write) -> io::Result<Flow>,
{
    loop {
        let line = read_line(prompt)?;
        // Lock stdout for the whole command so its output is not interleaved.
        let mut stdout = io::stdout().lock();
        let flow = dispatch(&line, &mut stdout)?;
        stdout.flush()?;
        if flow != Flow::Continue {
            return Ok(flow);
        }
    }
}

/// `colonyc` main menu. Logging out comes back here; only "Exit" or
/// `quit` inside the shell ends the program.
pub fn colony_main_menu(api: &ApiClient) -> Result<()> {
    loop {
        let items = vec!["Login", "Register", "Exit"];
        // `Select` shows a keyboard-navigable list in the terminal.
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => {
                // A failed login was already reported; show the menu again.
                let Some(session) = handle_login(api)? else {
                    continue;
                };
                println!("Type 'help' for the command list.");
                // The session lives only for this pass of the loop, so
                // `logout` drops it and lands back on the menu.
                let shell = ColonyShell::new(api, &session).colored(io::stdout().is_tty());
                if run_shell(&format!("{}@colony", session.username), |line, out| {
                    shell.dispatch(line, out)
                })? == Flow::Quit
                {
                    break;
                }
            }
            1 => handle_register(api)?,
            _ => break,
        }
    }
    Ok(())
}

fn ask_credentials() -> Result<Credentials> {
    let username: String = Input::new().with_prompt("Username").interact_text()?;
    let password: String = Password::new().with_prompt("Password").interact()?;
    Ok(Credentials { username, password })
}

/// Collect credentials and log in, returning the new session if OK.
fn handle_login(api: &ApiClient) -> Result<Option<ColonySession>> {
    let req = ask_credentials()?;
    // Keep the spinner up only while the request is in flight.
    let spinner = spinner("Logging in...");
    let result = api.login(&req);
    spinner.finish_and_clear();

    match result {
        Ok(resp) => {
            let session = ColonySession {
                user_id: id_text(&resp.user_id),
                username: req.username,
            };
            info!(user = %session.username, "logged in");
            println!("Welcome {}!", session.username);
            Ok(Some(session))
        }
        Err(e) => {
            println!("Login failed: {:#}", e);
            Ok(None)
        }
    }
}

fn handle_register(api: &ApiClient) -> Result<()> {
    let req = ask_credentials()?;
    let spinner = spinner("Registering...");
    let result = api.register(&req);
    spinner.finish_and_clear();

    match result {
        Ok(resp) => {
            if !resp.message.is_empty() {
                println!("{}", resp.message);
            }
            println!("Registered successfully, please login.");
        }
        Err(e) => println!("Register failed: {:#}", e),
    }
    Ok(())
}

/// `fleetc` command loop.
pub fn fleet_loop(api: &ApiClient, session: &mut FleetSession) -> Result<()> {
    match session.player_id() {
        Some(id) => println!("Resuming as player {id}. Type 'help' for the command list."),
        None => println!("Type 'help' for the command list, 'register <name>' to start."),
    }
    let mut shell = FleetShell::new(api, session).colored(io::stdout().is_tty());
    run_shell("fleet", |line, out| shell.dispatch(line, out))?;
    Ok(())
}
