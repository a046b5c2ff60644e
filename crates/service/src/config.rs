/// Process configuration, read once at startup.
///
/// Object-storage settings keep their historical unprefixed names
/// (`BUCKET_NAME`, `BUCKET_REGION`, `ACCESS_KEY`, `SECRET_ACCESS_KEY`);
/// everything else lives under `APP_`.
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid APP_* settings: {0}")]
    App(#[source] envy::Error),

    #[error("invalid object storage settings: {0}")]
    Storage(#[source] envy::Error),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    pub jwt_secret: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    pub bucket_name: String,
    pub bucket_region: String,
    pub access_key: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub s3_endpoint: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_path() -> String {
    "./data".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let app = envy::prefixed("APP_")
            .from_iter(vars.clone())
            .map_err(ConfigError::App)?;
        let storage = envy::from_iter(vars).map_err(ConfigError::Storage)?;

        Ok(Config { app, storage })
    }
}

impl AppConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
