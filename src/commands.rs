// Local CLI commands: turns positional arguments into a `Command`, runs it
// against the loaded `GameState` and writes the result as plain text.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::warn;

use crate::ships::{Investment, ShipClass};
use crate::state::GameState;
use crate::world::{self, Setting};

pub const HELP: &str = "\
Usage: worldc <command> [args]
Commands:
  show                                  - Display the current game state.
  build <infrastructure> <number>       - Build specified amount of infrastructure.
  destroy <infrastructure> <number>     - Destroy specified amount of infrastructure.
  set <TaxRate|Happiness> <value>       - Set the tax rate or happiness.
  construct <ship_class> <number>       - Construct specified amount of ships based on class.
  research <class> <name>               - Start a new research project for a ship.";

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Usage: worldc {0}")]
    Usage(&'static str),
    #[error("invalid {context} '{value}'")]
    InvalidNumber { value: String, context: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    Build { kind: String, amount: i64 },
    Destroy { kind: String, amount: i64 },
    Set { key: String, value: f64 },
    Construct { class: String, amount: i64 },
    Research { class: String, name: String },
    Help,
}

impl Command {
    /// Whether the state must be written back after running.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Command::Show | Command::Help)
    }
}

/// Source of answers for the interactive research questions. Read
/// failures are errors; a malformed answer is not.
pub trait Prompter {
    fn ask_number(&mut self, question: &str) -> io::Result<u64>;
}

/// Malformed or negative answers count as zero.
pub fn parse_answer(text: &str) -> u64 {
    text.trim().parse().unwrap_or(0)
}

/// Answers taken from a reader one whitespace-separated token at a time,
/// so `100 1` on one line and `100\n1\n` on two both work. Each question
/// is echoed to `output`. Running out of input answers zero.
pub struct ReaderPrompter<R, W> {
    input: R,
    output: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> ReaderPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ReaderPrompter {
            input,
            output,
            pending: VecDeque::new(),
        }
    }
}

impl<R: BufRead, W: Write> Prompter for ReaderPrompter<R, W> {
    fn ask_number(&mut self, question: &str) -> io::Result<u64> {
        writeln!(self.output, "{question}")?;
        self.output.flush()?;
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(0);
            }
            self.pending
                .extend(line.split_whitespace().map(String::from));
        }
        Ok(self.pending.pop_front().map_or(0, |token| parse_answer(&token)))
    }
}

fn parse_amount(value: &str, context: &'static str) -> Result<i64, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidNumber {
        value: value.to_string(),
        context,
    })
}

/// Parse the arguments after the program name.
pub fn parse_args(args: &[String]) -> Result<Command, CommandError> {
    let Some(verb) = args.first() else {
        return Ok(Command::Help);
    };
    let rest = &args[1..];
    let cmd = match verb.as_str() {
        "show" => Command::Show,
        "build" | "destroy" => {
            let [kind, amount, ..] = rest else {
                return Err(CommandError::Usage(if verb == "build" {
                    "build <infrastructure> <number>"
                } else {
                    "destroy <infrastructure> <number>"
                }));
            };
            let amount = parse_amount(amount, "number")?;
            if verb == "build" {
                Command::Build { kind: kind.clone(), amount }
            } else {
                Command::Destroy { kind: kind.clone(), amount }
            }
        }
        "set" => {
            let [key, value, ..] = rest else {
                return Err(CommandError::Usage("set <TaxRate|Happiness> <value>"));
            };
            let value = value.parse().map_err(|_| CommandError::InvalidNumber {
                value: value.clone(),
                context: "value",
            })?;
            Command::Set { key: key.clone(), value }
        }
        "construct" => {
            let [class, amount, ..] = rest else {
                return Err(CommandError::Usage("construct <ship_class> <number>"));
            };
            Command::Construct {
                class: class.clone(),
                amount: parse_amount(amount, "number")?,
            }
        }
        "research" => {
            let [class, name, ..] = rest else {
                return Err(CommandError::Usage("research <class> <name>"));
            };
            Command::Research {
                class: class.clone(),
                name: name.clone(),
            }
        }
        _ => Command::Help,
    };
    Ok(cmd)
}

/// Run one command. Rule violations are reported on `out` and leave the
/// state as it was.
pub fn execute(
    cmd: &Command,
    state: &mut GameState,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> io::Result<()> {
    match cmd {
        Command::Show => render_state(state, out),
        Command::Help => writeln!(out, "{HELP}"),
        Command::Build { kind, amount } => match world::build(state, kind, *amount) {
            Ok(total) => writeln!(
                out,
                "Built {amount} {kind}. Total {kind}: {total}. Minerals left: {}",
                state.minerals
            ),
            Err(e) => report(out, "Build", e),
        },
        Command::Destroy { kind, amount } => match world::destroy(state, kind, *amount) {
            Ok(remaining) => writeln!(
                out,
                "Destroyed {amount} {kind}. Remaining {kind}: {remaining}. Minerals: {}",
                state.minerals
            ),
            Err(e) => report(out, "Destroy", e),
        },
        Command::Set { key, value } => {
            let result = Setting::parse(key).and_then(|setting| world::set(state, setting, *value));
            match result {
                Ok(()) => writeln!(out, "{key} set to {value:.2}"),
                Err(e) => report(out, "Set", e),
            }
        }
        Command::Construct { class, amount } => {
            let class: ShipClass = match class.parse() {
                Ok(class) => class,
                Err(e) => return writeln!(out, "{e}"),
            };
            let (name, fleet) = match world::construct(state, class, *amount) {
                Ok(ship) => (ship.name.clone(), ship.amount),
                Err(e) => return report(out, "Construct", e),
            };
            writeln!(out, "Constructed {amount} x {name} ({class}). Fleet size: {fleet}")?;
            writeln!(out, "StarCoins left: {}", state.star_coins)
        }
        Command::Research { class, name } => research(state, class, name, prompter, out),
    }
}

fn report(out: &mut dyn Write, action: &str, err: world::WorldError) -> io::Result<()> {
    warn!(%err, "{action} rejected");
    writeln!(out, "{action} failed: {err}")
}

fn research(
    state: &mut GameState,
    class: &str,
    name: &str,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> io::Result<()> {
    let class: ShipClass = match class.parse() {
        Ok(class) => class,
        Err(e) => return writeln!(out, "{e}"),
    };

    let star_coins =
        prompter.ask_number("How many StarCoins do you want to put into this research project?")?;
    let dev_points =
        prompter.ask_number("How many Development Points do you want to add to this project?")?;

    let ship = world::research(state, class, name, Investment { star_coins, dev_points });
    writeln!(out, "Research complete! Developed new ship: {}", ship.name)?;
    writeln!(out, "Ship Details:")?;
    writeln!(
        out,
        "  Class: {}, Health: {}, Fuel Capacity: {}, Fuel Efficiency: {:.2}, Damage: {}, Personnel Limit: {}, Price: {}",
        ship.class,
        ship.health,
        ship.fuel_capacity,
        ship.fuel_efficiency,
        ship.damage,
        ship.personnel_limit,
        ship.price
    )
}

/// Text for the `show` command.
pub fn render_state(state: &GameState, out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "Food: {}, Water: {}, Minerals: {}",
        state.food, state.water, state.minerals
    )?;
    writeln!(
        out,
        "Population: {}, Happiness: {:.2}%",
        state.population, state.happiness
    )?;
    writeln!(out, "Research Points: {}", state.research_points)?;
    writeln!(
        out,
        "StarCoins: {}, TaxRate: {:.2}",
        state.star_coins, state.tax_rate
    )?;
    writeln!(out, "Ticks Passed: {}", state.ticks_passed)?;

    writeln!(out, "Infrastructure:")?;
    for (kind, count) in &state.infrastructure {
        writeln!(out, "  {kind}: {count}")?;
    }

    writeln!(out, "Ships:")?;
    for (class, ships) in &state.ships {
        writeln!(out, "Class {class}:")?;
        for ship in ships {
            writeln!(
                out,
                "  {} (Level: {}, Amount: {})",
                ship.name, ship.level, ship.amount
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Answers(Vec<u64>);

    impl Prompter for Answers {
        fn ask_number(&mut self, _question: &str) -> io::Result<u64> {
            Ok(if self.0.is_empty() { 0 } else { self.0.remove(0) })
        }
    }

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn run(line: &str, state: &mut GameState, answers: Vec<u64>) -> String {
        let cmd = parse_args(&args(line)).unwrap();
        let mut out = Vec::new();
        execute(&cmd, state, &mut Answers(answers), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_positional_commands() {
        assert_eq!(parse_args(&args("show")), Ok(Command::Show));
        assert_eq!(
            parse_args(&args("build farm 3")),
            Ok(Command::Build {
                kind: "farm".into(),
                amount: 3
            })
        );
        assert_eq!(parse_args(&args("teleport")), Ok(Command::Help));
        assert_eq!(parse_args(&[]), Ok(Command::Help));
        assert_eq!(
            parse_args(&args("research Enforcer")),
            Err(CommandError::Usage("research <class> <name>"))
        );
        assert!(matches!(
            parse_args(&args("build farm lots")),
            Err(CommandError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn only_show_and_help_are_read_only() {
        assert!(!Command::Show.is_mutating());
        assert!(!Command::Help.is_mutating());
        assert!(parse_args(&args("set TaxRate 0.1")).unwrap().is_mutating());
    }

    #[test]
    fn research_enforcer_prints_details() {
        let mut state = GameState::default();
        let text = run("research Enforcer Warden", &mut state, vec![100, 1]);
        assert!(text.contains("Developed new ship: Warden"));
        assert!(text.contains("Damage: 10"));
        assert!(text.contains("Price: 50"));
        assert_eq!(state.ships["Enforcer"].len(), 1);
    }

    #[test]
    fn research_unknown_class_is_rejected() {
        let mut state = GameState::default();
        let text = run("research Dreadnought Hammer", &mut state, vec![100, 1]);
        assert_eq!(text.trim(), "Unknown ship class: Dreadnought");
        assert!(state.ships.is_empty());
    }

    #[test]
    fn malformed_answers_count_as_zero() {
        assert_eq!(parse_answer(" 42\n"), 42);
        assert_eq!(parse_answer("lots"), 0);
        assert_eq!(parse_answer("-5"), 0);
    }

    #[test]
    fn reader_prompter_takes_tokens_across_lines() {
        let mut echoed = Vec::new();
        let mut prompter = ReaderPrompter::new(io::Cursor::new("\n100 \n  1\nspare\n"), &mut echoed);
        assert_eq!(prompter.ask_number("coins?").unwrap(), 100);
        assert_eq!(prompter.ask_number("points?").unwrap(), 1);
        assert_eq!(prompter.ask_number("again?").unwrap(), 0);
        assert_eq!(prompter.ask_number("empty?").unwrap(), 0);
        drop(prompter);
        assert_eq!(String::from_utf8(echoed).unwrap(), "coins?\npoints?\nagain?\nempty?\n");
    }

    #[test]
    fn piped_research_answers_reach_the_design() {
        let mut state = GameState::default();
        let cmd = parse_args(&args("research Enforcer Warden")).unwrap();
        let mut prompter = ReaderPrompter::new(io::Cursor::new("100\n1\n"), io::sink());
        let mut out = Vec::new();
        execute(&cmd, &mut state, &mut prompter, &mut out).unwrap();
        let ship = &state.ships["Enforcer"][0];
        assert_eq!(ship.damage, 10);
        assert_eq!(ship.price, 50);
    }

    #[test]
    fn failed_build_reports_and_keeps_state() {
        let mut state = GameState::default();
        let text = run("build farm 2", &mut state, vec![]);
        assert!(text.starts_with("Build failed: not enough minerals"));
        assert!(state.infrastructure.is_empty());
    }

    #[test]
    fn show_lists_everything() {
        let mut state = GameState {
            food: 5,
            happiness: 80.0,
            tax_rate: 0.1,
            minerals: 20,
            ..GameState::default()
        };
        run("build mine 1", &mut state, vec![]);
        run("research Pioneer Ark", &mut state, vec![0, 0]);
        let text = run("show", &mut state, vec![]);
        assert!(text.contains("Food: 5, Water: 0, Minerals: 10"));
        assert!(text.contains("Happiness: 80.00%"));
        assert!(text.contains("StarCoins: 0, TaxRate: 0.10"));
        assert!(text.contains("  mine: 1"));
        assert!(text.contains("Class Pioneer:\n  Ark (Level: 1, Amount: 0)"));
    }
}
