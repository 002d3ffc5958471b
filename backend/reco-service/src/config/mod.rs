use serde::Deserialize;

// ============================================
// Service Configuration
// ============================================
//
// All knobs come from the environment (plus .env in development).
// `Config::from_env` fails fast on anything unparsable so a bad
// deployment dies at startup instead of mid-request.

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub engine: EngineConfig,
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Dimensionality of the hashed text embeddings.
    pub embedding_dim: usize,
    /// Directory holding fitted model artifacts. When set and populated,
    /// startup loads from disk instead of fitting from the database.
    pub model_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    pub enabled: bool,
    /// Seconds between staleness checks.
    pub interval_secs: u64,
    /// Minimum new interactions since the last fit before a refresh runs.
    pub min_events: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            port: std::env::var("APP_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")?,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_connections),
        };

        let engine = EngineConfig {
            embedding_dim: std::env::var("EMBEDDING_DIM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_embedding_dim),
            model_dir: std::env::var("MODEL_DIR").ok().filter(|v| !v.is_empty()),
        };

        let refresh = RefreshConfig {
            enabled: std::env::var("REFRESH_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            interval_secs: std::env::var("REFRESH_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_refresh_interval_secs),
            min_events: std::env::var("REFRESH_MIN_EVENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_refresh_min_events),
        };

        Ok(Config {
            app,
            database,
            engine,
            refresh,
        })
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_embedding_dim() -> usize {
    256
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_refresh_min_events() -> i64 {
    100
}
