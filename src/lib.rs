// Library root
// -----------
// Shared code for the three binaries: `worldc` (local game on a JSON save
// file), `colonyc` and `fleetc` (clients of the remote game server).
//
// Module responsibilities:
// - `state`: the save document and whole-file load/save.
// - `ships`: ship classes and the research stat formulas.
// - `world`: game rules that mutate the state (build, destroy, set,
//   construct, research).
// - `commands`: positional local commands and their text output.
// - `config` / `session`: explicit client configuration and sessions.
// - `api`: blocking HTTP calls to the game server.
// - `shell`: command tables of the networked clients.
// - `ui`: terminal menus and prompts driving the loops.
// - `logging`: tracing subscriber setup.
pub mod api;
pub mod commands;
pub mod config;
pub mod logging;
pub mod session;
pub mod shell;
pub mod ships;
pub mod state;
pub mod ui;
pub mod world;
