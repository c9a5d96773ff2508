use crate::error::ConfigError;

/// Where the connection string for the target database is read from
pub const CONNECTION_STRING_VAR: &str = "AZURE_POSTGRES_CONNECTION_STRING";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first if a `.env` file should count.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(CONNECTION_STRING_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(CONNECTION_STRING_VAR))?;
        Ok(Config { database_url })
    }
}
