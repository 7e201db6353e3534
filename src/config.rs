use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub seed_path: String,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>()?,
            Err(_) => 3000,
        };
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            seed_path: std::env::var("SEED_PATH").unwrap_or_else(|_| "data/users.json".into()),
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            seed_path: "data/users.json".into(),
            cors_origin: "http://localhost:5173".into(),
        }
    }
}

/// Settings for the remote client used by the list synchroniser.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api".into()),
        }
    }
}

pub const DEFAULT_LOG_FILTER: &str = "useradmin=debug,axum=info,tower_http=info";

/// How the server binary sets up `tracing-subscriber`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives, from `RUST_LOG`.
    pub filter: String,
    /// `LOG_FORMAT=json` switches to one JSON object per line.
    pub json: bool,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("RUST_LOG").ok(),
            std::env::var("LOG_FORMAT").ok(),
        )
    }

    fn from_vars(filter: Option<String>, format: Option<String>) -> Self {
        Self {
            filter: filter
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
            json: format.is_some_and(|f| f.eq_ignore_ascii_case("json")),
        }
    }
}
