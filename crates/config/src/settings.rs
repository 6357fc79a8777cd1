use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub invites: InviteSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

/// Knobs for invitation-code issuance and redemption.
#[derive(Debug, Deserialize, Clone)]
pub struct InviteSettings {
    /// Length of standard invitation codes.
    pub code_length: usize,
    /// Length of personalized (issuer-chosen) codes.
    pub personalized_code_length: usize,
    /// Days until a freshly issued code expires.
    pub default_ttl_days: i64,
    /// Uses granted to a freshly issued code.
    pub default_uses: u32,
    /// Uses granted to the bootstrap code issued at owner signup.
    pub owner_code_uses: u32,
    /// TTL in days of the bootstrap code issued at owner signup.
    pub owner_code_ttl_days: i64,
    /// Attempts to find an unused code string before giving up.
    pub generation_attempts: u32,
    /// Full re-read attempts after losing a redemption race.
    pub redeem_attempts: u32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("CORRAL"),
            )
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "corral")?
            .set_default("invites.code_length", 6)?
            .set_default("invites.personalized_code_length", 8)?
            .set_default("invites.default_ttl_days", 30)?
            .set_default("invites.default_uses", 1)?
            .set_default("invites.owner_code_uses", 10)?
            .set_default("invites.owner_code_ttl_days", 365)?
            .set_default("invites.generation_attempts", 20)?
            .set_default("invites.redeem_attempts", 3)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
