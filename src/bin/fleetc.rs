// Entrypoint for the fleet client. The server URL comes from
// `WORLD_SERVER_URL`; the player id is remembered in the home directory.

use worldc::api::ApiClient;
use worldc::config::ClientConfig;
use worldc::session::FleetSession;
use worldc::ui::fleet_loop;

fn main() -> anyhow::Result<()> {
    worldc::logging::init();
    let config = ClientConfig::from_env();
    tracing::info!(server = %config.server_url, "starting fleet client");

    let api = ApiClient::new(&config)?;
    let mut session = FleetSession::from_home();
    fleet_loop(&api, &mut session)?;
    Ok(())
}
