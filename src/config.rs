// Client configuration for the networked programs. The server URL is the
// only setting; it is resolved once at startup and passed down explicitly.

/// Used when neither a flag nor the environment names a server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
/// Environment variable read by `fleetc`.
pub const SERVER_URL_ENV: &str = "WORLD_SERVER_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: String,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        let url: String = server_url.into();
        ClientConfig {
            server_url: url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Configuration from `WORLD_SERVER_URL`, falling back to the default.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(SERVER_URL_ENV).ok())
    }

    pub fn from_env_value(value: Option<String>) -> Self {
        match value {
            Some(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(
            ClientConfig::new("http://game.example:9000/").server_url,
            "http://game.example:9000"
        );
    }

    #[test]
    fn empty_env_value_uses_default() {
        assert_eq!(ClientConfig::from_env_value(None), ClientConfig::default());
        assert_eq!(
            ClientConfig::from_env_value(Some("  ".into())).server_url,
            DEFAULT_SERVER_URL
        );
        assert_eq!(
            ClientConfig::from_env_value(Some("http://10.0.0.2:8080".into())).server_url,
            "http://10.0.0.2:8080"
        );
    }
}
