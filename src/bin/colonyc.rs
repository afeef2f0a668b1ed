// Entrypoint for the colony client: resolve the server from `--server`,
// build the API client and hand it to the menu loop.

use clap::Parser;
use worldc::api::ApiClient;
use worldc::config::{ClientConfig, DEFAULT_SERVER_URL};
use worldc::ui::colony_main_menu;

#[derive(Parser, Debug)]
#[command(name = "colonyc", version, about = "Colony client for the world server", long_about = None)]
struct Cli {
    /// Base URL of the game server.
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server: String,
}

fn main() -> anyhow::Result<()> {
    worldc::logging::init();
    let cli = Cli::parse();
    let config = ClientConfig::new(cli.server);
    tracing::info!(server = %config.server_url, "starting colony client");

    let api = ApiClient::new(&config)?;
    colony_main_menu(&api)?;
    Ok(())
}
