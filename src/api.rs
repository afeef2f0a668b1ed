// API client module: a small blocking HTTP client for the game server.
// Two endpoint families exist: the original colony endpoints (`/login`,
// `/register`, `/build`, `/state`) and the newer `/api/*` endpoints used
// by the fleet client. Each call is exactly one request; nothing retries.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::ClientConfig;

/// Blocking client bound to one server.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// Login and registration payload of the colony endpoints.
#[derive(Serialize, Deserialize, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Reply to `/login`. The server may send the id as a number or a string,
/// so it is kept as a raw JSON value.
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub user_id: serde_json::Value,
}

/// Reply to both `/register` and `/api/register`.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RegisterResponse {
    #[serde(default, alias = "player_id", alias = "id")]
    pub user_id: serde_json::Value,
    #[serde(default)]
    pub message: String,
}

/// Reply to `/api/status`.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct StatusResponse {
    pub tick: u64,
    pub players: u64,
    pub colonies: u64,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

/// Server-owned settlement as seen in a state snapshot.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Colony {
    pub id: serde_json::Value,
    pub name: String,
    pub location: Location,
    pub buildings: BTreeMap<String, u64>,
    pub resources: BTreeMap<String, f64>,
    pub population: u64,
}

/// Body of `GET /state` when the server sends the expected shape.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub colonies: Vec<Colony>,
}

/// `GET /state` result: parsed when possible, otherwise the body as-is.
#[derive(Debug, PartialEq)]
pub enum StateReply {
    Snapshot(WorldSnapshot),
    Raw(String),
}

impl StateReply {
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<WorldSnapshot>(&body) {
            Ok(snapshot) => StateReply::Snapshot(snapshot),
            Err(e) => {
                debug!(error = %e, "state body is not a snapshot, keeping raw text");
                StateReply::Raw(body)
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BuildRequest {
    pub user_id: String,
    pub colony_id: String,
    pub building: String,
    pub count: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FleetRegisterRequest {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FleetBuildRequest {
    pub player_id: String,
    pub colony_id: String,
    pub building: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BurnRequest {
    pub player_id: String,
    pub amount: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LaunchRequest {
    pub player_id: String,
    pub colony_id: String,
    pub ship_class: String,
    pub count: u64,
    pub target: Location,
}

/// Render a JSON id without quotes around strings.
pub fn id_text(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: config.server_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request and turn any non-success status into an error
    /// carrying the status and the response body.
    fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
        let res = req
            .send()
            .with_context(|| format!("Failed to send {} request", what))?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_else(|_| "".into());
            warn!(%status, what, "server rejected request");
            anyhow::bail!("server returned {} - {}", status, txt.trim());
        }
        debug!(status = %res.status(), what, "request ok");
        Ok(res)
    }

    fn send_text(&self, req: RequestBuilder, what: &str) -> Result<String> {
        let res = self.send(req, what)?;
        res.text()
            .with_context(|| format!("Reading {} response body", what))
    }

    /// `POST /login`.
    pub fn login(&self, req: &Credentials) -> Result<LoginResponse> {
        let res = self.send(self.client.post(self.url("/login")).json(req), "login")?;
        res.json().context("Parsing login response json")
    }

    /// `POST /register`.
    pub fn register(&self, req: &Credentials) -> Result<RegisterResponse> {
        let res = self.send(self.client.post(self.url("/register")).json(req), "register")?;
        res.json().context("Parsing register response json")
    }

    /// `POST /build` for one of the user's colonies.
    pub fn build(&self, req: &BuildRequest) -> Result<String> {
        self.send_text(self.client.post(self.url("/build")).json(req), "build")
    }

    /// `GET /state` for the given user.
    pub fn state(&self, user_id: &str) -> Result<StateReply> {
        let req = self
            .client
            .get(self.url("/state"))
            .query(&[("user_id", user_id)]);
        Ok(StateReply::from_body(self.send_text(req, "state")?))
    }

    /// `GET /api/status`.
    pub fn status(&self) -> Result<StatusResponse> {
        let res = self.send(self.client.get(self.url("/api/status")), "status")?;
        res.json().context("Parsing status response json")
    }

    /// `POST /api/register`.
    pub fn register_player(&self, req: &FleetRegisterRequest) -> Result<RegisterResponse> {
        let res = self.send(
            self.client.post(self.url("/api/register")).json(req),
            "register",
        )?;
        res.json().context("Parsing register response json")
    }

    /// `POST /api/build`.
    pub fn build_structure(&self, req: &FleetBuildRequest) -> Result<String> {
        self.send_text(self.client.post(self.url("/api/build")).json(req), "build")
    }

    /// `POST /api/bank/burn`.
    pub fn burn(&self, req: &BurnRequest) -> Result<String> {
        self.send_text(self.client.post(self.url("/api/bank/burn")).json(req), "burn")
    }

    /// `POST /api/fleet/launch`.
    pub fn launch(&self, req: &LaunchRequest) -> Result<String> {
        self.send_text(
            self.client.post(self.url("/api/fleet/launch")).json(req),
            "launch",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_bodies_are_parsed() {
        let body = r#"{"tick": 12, "colonies": [
            {"id": 3, "name": "Ceres", "location": {"x": 1.5, "y": -2.0},
             "buildings": {"farm": 2}, "resources": {"food": 40.0}, "population": 120}
        ]}"#;
        let StateReply::Snapshot(snapshot) = StateReply::from_body(body.into()) else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.tick, 12);
        let colony = &snapshot.colonies[0];
        assert_eq!(id_text(&colony.id), "3");
        assert_eq!(colony.location, Location { x: 1.5, y: -2.0 });
        assert_eq!(colony.buildings["farm"], 2);
    }

    #[test]
    fn other_bodies_stay_raw() {
        assert_eq!(
            StateReply::from_body("colonies: none yet".into()),
            StateReply::Raw("colonies: none yet".into())
        );
    }

    #[test]
    fn register_response_accepts_player_id() {
        let resp: RegisterResponse =
            serde_json::from_str(r#"{"player_id": "p-9", "message": "welcome"}"#).unwrap();
        assert_eq!(id_text(&resp.user_id), "p-9");
        assert_eq!(resp.message, "welcome");
    }

    #[test]
    fn client_keeps_configured_url() {
        let api = ApiClient::new(&ClientConfig::new("http://127.0.0.1:9/")).unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:9");
        assert_eq!(api.url("/api/status"), "http://127.0.0.1:9/api/status");
    }
}
