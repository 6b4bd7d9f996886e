use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,

    // Session tokens
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,

    // Seed script
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("TOOLHUB")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 8080)?
            .set_default("token_ttl_minutes", 60 * 24)?
            .set_default("admin_email", "admin@toolhub.local")?
            .set_default("admin_name", "Administrator")?
            .set_default("admin_password", "")?
            .build()?;

        config.try_deserialize()
    }
}
