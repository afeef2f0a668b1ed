// Line-oriented command tables for the networked clients. A line is split
// on whitespace and the first token picks the command. Each command makes
// at most one request; a failure is printed once and the shell carries on.

use crossterm::style::Stylize;
use std::fmt::Display;
use std::io::{self, Write};
use tracing::{info, warn};

use crate::api::{
    id_text, ApiClient, BuildRequest, BurnRequest, Colony, FleetBuildRequest,
    FleetRegisterRequest, LaunchRequest, Location, StateReply,
};
use crate::session::{ColonySession, FleetSession};
use crate::ships::ShipClass;

/// What the caller's loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Logout,
    Quit,
}

pub const COLONY_HELP: &str = "\
Commands:
  state                                 - Show your colonies.
  build <colony_id> <building> [count]  - Request buildings in a colony.
  whoami                                - Show the logged-in user.
  logout                                - Return to the main menu.
  help                                  - Show this list.
  quit                                  - Leave the client.";

pub const FLEET_HELP: &str = "\
Commands:
  status                                      - Show server status.
  register <name>                             - Register a new player.
  build <colony_id> <building>                - Request a building.
  burn <amount>                               - Burn currency at the bank.
  launch <colony_id> <class> <count> <x> <y>  - Launch ships towards a target.
  whoami                                      - Show the registered player.
  help                                        - Show this list.
  quit                                        - Leave the client.";

pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

fn usage(out: &mut dyn Write, text: &str) -> io::Result<Flow> {
    writeln!(out, "Usage: {text}")?;
    Ok(Flow::Continue)
}

/// Report a failed request. Colour is only used when `color` is set,
/// which callers do when stdout is a terminal.
fn failed(out: &mut dyn Write, color: bool, command: &str, err: impl Display) -> io::Result<Flow> {
    warn!(command, error = %err, "request failed");
    let text = format!("{command} failed: {err}");
    if color {
        writeln!(out, "{}", text.red())?;
    } else {
        writeln!(out, "{text}")?;
    }
    Ok(Flow::Continue)
}

fn unknown(out: &mut dyn Write, verb: &str) -> io::Result<Flow> {
    writeln!(out, "Unknown command: {verb}. Type 'help' for the command list.")?;
    Ok(Flow::Continue)
}

pub fn render_colony(out: &mut dyn Write, colony: &Colony) -> io::Result<()> {
    writeln!(
        out,
        "Colony {} \"{}\" at ({:.1}, {:.1}), population {}",
        id_text(&colony.id),
        colony.name,
        colony.location.x,
        colony.location.y,
        colony.population
    )?;
    for (building, count) in &colony.buildings {
        writeln!(out, "  {building}: {count}")?;
    }
    for (resource, amount) in &colony.resources {
        writeln!(out, "  {resource} = {amount:.1}")?;
    }
    Ok(())
}

/// Commands available once a `colonyc` user is logged in.
pub struct ColonyShell<'a> {
    api: &'a ApiClient,
    session: &'a ColonySession,
    color: bool,
}

impl<'a> ColonyShell<'a> {
    pub fn new(api: &'a ApiClient, session: &'a ColonySession) -> Self {
        ColonyShell {
            api,
            session,
            color: false,
        }
    }

    /// Highlight failures in red.
    pub fn colored(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn dispatch(&self, line: &str, out: &mut dyn Write) -> io::Result<Flow> {
        let tokens = tokenize(line);
        let Some((&verb, args)) = tokens.split_first() else {
            return Ok(Flow::Continue);
        };
        match verb {
            "state" => self.state(out),
            "build" => self.build(args, out),
            "whoami" => {
                writeln!(
                    out,
                    "Logged in as {} (id {})",
                    self.session.username, self.session.user_id
                )?;
                Ok(Flow::Continue)
            }
            "logout" => {
                info!(user = %self.session.username, "logged out");
                writeln!(out, "Logged out.")?;
                Ok(Flow::Logout)
            }
            "help" => {
                writeln!(out, "{COLONY_HELP}")?;
                Ok(Flow::Continue)
            }
            "quit" | "exit" => Ok(Flow::Quit),
            other => unknown(out, other),
        }
    }

    fn state(&self, out: &mut dyn Write) -> io::Result<Flow> {
        match self.api.state(&self.session.user_id) {
            Ok(StateReply::Snapshot(snapshot)) => {
                writeln!(out, "Tick: {}", snapshot.tick)?;
                if snapshot.colonies.is_empty() {
                    writeln!(out, "No colonies yet.")?;
                }
                for colony in &snapshot.colonies {
                    render_colony(out, colony)?;
                }
                Ok(Flow::Continue)
            }
            Ok(StateReply::Raw(body)) => {
                writeln!(out, "{body}")?;
                Ok(Flow::Continue)
            }
            Err(e) => failed(out, self.color, "state", format!("{e:#}")),
        }
    }

    fn build(&self, args: &[&str], out: &mut dyn Write) -> io::Result<Flow> {
        const USAGE: &str = "build <colony_id> <building> [count]";
        let [colony_id, building, rest @ ..] = args else {
            return usage(out, USAGE);
        };
        let count = match rest.first() {
            None => 1,
            Some(text) => match text.parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => return usage(out, USAGE),
            },
        };
        let req = BuildRequest {
            user_id: self.session.user_id.clone(),
            colony_id: colony_id.to_string(),
            building: building.to_string(),
            count,
        };
        match self.api.build(&req) {
            Ok(body) => {
                writeln!(out, "Build requested: {count} x {building} in colony {colony_id}")?;
                if !body.trim().is_empty() {
                    writeln!(out, "{}", body.trim())?;
                }
                Ok(Flow::Continue)
            }
            Err(e) => failed(out, self.color, "build", format!("{e:#}")),
        }
    }
}

/// Commands of the `fleetc` client.
pub struct FleetShell<'a> {
    api: &'a ApiClient,
    session: &'a mut FleetSession,
    color: bool,
}

impl<'a> FleetShell<'a> {
    pub fn new(api: &'a ApiClient, session: &'a mut FleetSession) -> Self {
        FleetShell {
            api,
            session,
            color: false,
        }
    }

    /// Highlight failures in red.
    pub fn colored(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn dispatch(&mut self, line: &str, out: &mut dyn Write) -> io::Result<Flow> {
        let tokens = tokenize(line);
        let Some((&verb, args)) = tokens.split_first() else {
            return Ok(Flow::Continue);
        };
        match verb {
            "status" => self.status(out),
            "register" => self.register(args, out),
            "build" => self.build(args, out),
            "burn" => self.burn(args, out),
            "launch" => self.launch(args, out),
            "whoami" => {
                match self.session.player_id() {
                    Some(id) => writeln!(out, "Player id: {id}")?,
                    None => writeln!(out, "Not registered.")?,
                }
                Ok(Flow::Continue)
            }
            "help" => {
                writeln!(out, "{FLEET_HELP}")?;
                Ok(Flow::Continue)
            }
            "quit" | "exit" => Ok(Flow::Quit),
            other => unknown(out, other),
        }
    }

    /// The player id, or a hint printed when there is none yet.
    fn player(&self, out: &mut dyn Write) -> io::Result<Option<String>> {
        match self.session.player_id() {
            Some(id) => Ok(Some(id.to_string())),
            None => {
                writeln!(out, "No player id yet: run 'register <name>' first.")?;
                Ok(None)
            }
        }
    }

    fn status(&self, out: &mut dyn Write) -> io::Result<Flow> {
        match self.api.status() {
            Ok(status) => {
                writeln!(
                    out,
                    "Tick: {}, Players: {}, Colonies: {}",
                    status.tick, status.players, status.colonies
                )?;
                if !status.message.is_empty() {
                    writeln!(out, "{}", status.message)?;
                }
                Ok(Flow::Continue)
            }
            Err(e) => failed(out, self.color, "status", format!("{e:#}")),
        }
    }

    fn register(&mut self, args: &[&str], out: &mut dyn Write) -> io::Result<Flow> {
        let [name, ..] = args else {
            return usage(out, "register <name>");
        };
        let req = FleetRegisterRequest {
            name: name.to_string(),
        };
        let resp = match self.api.register_player(&req) {
            Ok(resp) => resp,
            Err(e) => return failed(out, self.color, "register", format!("{e:#}")),
        };
        let player_id = id_text(&resp.user_id);
        if player_id.is_empty() {
            writeln!(out, "Registered {name}, but the server sent no player id.")?;
            return Ok(Flow::Continue);
        }
        if let Err(e) = self.session.set_player(&player_id) {
            warn!(error = %e, "player id kept for this run only");
        }
        writeln!(out, "Registered {name} as player {player_id}.")?;
        if !resp.message.is_empty() {
            writeln!(out, "{}", resp.message)?;
        }
        Ok(Flow::Continue)
    }

    fn build(&self, args: &[&str], out: &mut dyn Write) -> io::Result<Flow> {
        let [colony_id, building, ..] = args else {
            return usage(out, "build <colony_id> <building>");
        };
        let Some(player_id) = self.player(out)? else {
            return Ok(Flow::Continue);
        };
        let req = FleetBuildRequest {
            player_id,
            colony_id: colony_id.to_string(),
            building: building.to_string(),
        };
        match self.api.build_structure(&req) {
            Ok(body) => print_body(out, "Build requested.", &body),
            Err(e) => failed(out, self.color, "build", format!("{e:#}")),
        }
    }

    fn burn(&self, args: &[&str], out: &mut dyn Write) -> io::Result<Flow> {
        let Some(amount) = args.first().and_then(|a| a.parse::<u64>().ok()) else {
            return usage(out, "burn <amount>");
        };
        let Some(player_id) = self.player(out)? else {
            return Ok(Flow::Continue);
        };
        match self.api.burn(&BurnRequest { player_id, amount }) {
            Ok(body) => print_body(out, &format!("Burned {amount}."), &body),
            Err(e) => failed(out, self.color, "burn", format!("{e:#}")),
        }
    }

    fn launch(&self, args: &[&str], out: &mut dyn Write) -> io::Result<Flow> {
        const USAGE: &str = "launch <colony_id> <class> <count> <x> <y>";
        let [colony_id, class, count, x, y, ..] = args else {
            return usage(out, USAGE);
        };
        let class: ShipClass = match class.parse() {
            Ok(class) => class,
            Err(e) => {
                writeln!(out, "{e}")?;
                return Ok(Flow::Continue);
            }
        };
        let (Ok(count), Ok(x), Ok(y)) = (count.parse::<u64>(), x.parse::<f64>(), y.parse::<f64>())
        else {
            return usage(out, USAGE);
        };
        let Some(player_id) = self.player(out)? else {
            return Ok(Flow::Continue);
        };
        let req = LaunchRequest {
            player_id,
            colony_id: colony_id.to_string(),
            ship_class: class.to_string(),
            count,
            target: Location { x, y },
        };
        match self.api.launch(&req) {
            Ok(body) => print_body(
                out,
                &format!("Launched {count} {class} from colony {colony_id} towards ({x}, {y})."),
                &body,
            ),
            Err(e) => failed(out, self.color, "launch", format!("{e:#}")),
        }
    }
}

fn print_body(out: &mut dyn Write, headline: &str, body: &str) -> io::Result<Flow> {
    writeln!(out, "{headline}")?;
    if !body.trim().is_empty() {
        writeln!(out, "{}", body.trim())?;
    }
    Ok(Flow::Continue)
}
