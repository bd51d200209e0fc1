// rest_api/src/config.rs

use std::path::Path;

use anyhow::{bail, Context, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const ENV_PREFIX: &str = "HOSPITAL";

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RestApiConfig {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub cors_origin: String,
    pub bcrypt_cost: u32,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("token_ttl_hours", DEFAULT_TOKEN_TTL_HOURS)?
        .set_default("cors_origin", DEFAULT_CORS_ORIGIN)?
        .set_default("bcrypt_cost", lib::DEFAULT_BCRYPT_COST as i64)?)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<RestApiConfig> {
    let config: RestApiConfig = builder
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Missing or invalid configuration (database_path and jwt_secret are required)")?;

    if config.jwt_secret.trim().is_empty() {
        bail!("jwt_secret must not be empty");
    }
    if config.database_path.trim().is_empty() {
        bail!("database_path must not be empty");
    }
    if config.token_ttl_hours <= 0 {
        bail!("token_ttl_hours must be positive");
    }
    Ok(config)
}

/// Loads configuration: built-in defaults, then the optional YAML file, then
/// `HOSPITAL_*` environment variables.
pub fn load_rest_api_config(config_file: Option<&Path>) -> Result<RestApiConfig> {
    let mut builder = defaults()?;
    if let Some(path) = config_file {
        if !path.exists() {
            bail!("Config file {} does not exist", path.display());
        }
        builder = builder.add_source(File::from(path));
    }
    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
    finish(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_yaml(yaml: &str) -> Result<RestApiConfig> {
        finish(defaults()?.add_source(File::from_str(yaml, FileFormat::Yaml)))
    }

    #[test]
    fn should_fill_defaults() {
        let config = from_yaml("database_path: ./data/hospital\njwt_secret: s3cret\n").unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.cors_origin, DEFAULT_CORS_ORIGIN);
    }

    #[test]
    fn should_require_secret_and_database_path() {
        assert!(from_yaml("database_path: ./data\n").is_err());
        assert!(from_yaml("jwt_secret: s3cret\n").is_err());
        assert!(from_yaml("database_path: ./data\njwt_secret: \"  \"\n").is_err());
    }

    #[test]
    fn should_override_port() {
        let config = from_yaml("database_path: ./d\njwt_secret: x\nport: 8088\n").unwrap();
        assert_eq!(config.port, 8088);
    }
}
