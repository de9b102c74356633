use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Runtime settings for the trivia service.
///
/// Sources are layered: built-in defaults, then an optional `trivia.{toml,json,yaml}`
/// file in the working directory, then `TRIVIA_*` environment variables
/// (`TRIVIA_DB_PATH`, `TRIVIA_HOST`, `TRIVIA_PORT`, `TRIVIA_MAX_CONNECTIONS`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_env(Environment::with_prefix("TRIVIA"))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("db_path", "trivia.db")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("max_connections", 5)?
            .add_source(File::with_name("trivia").required(false))
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
