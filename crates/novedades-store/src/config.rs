use std::fmt;

use novedades_core::ConfigError;

/// Connection settings for the live PostgreSQL server.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

impl DbConfig {
    /// Assemble settings from optional sources (flags or environment).
    ///
    /// Every value is required; the error names the environment variable
    /// that would have supplied the first absent one.
    pub fn from_parts(
        host: Option<String>,
        name: Option<String>,
        user: Option<String>,
        password: Option<String>,
        port: Option<String>,
    ) -> Result<Self, ConfigError> {
        let host = host.ok_or(ConfigError::Missing("DB_HOST"))?;
        let name = name.ok_or(ConfigError::Missing("DB_NAME"))?;
        let user = user.ok_or(ConfigError::Missing("DB_USER"))?;
        let password = password.ok_or(ConfigError::Missing("DB_PASSWORD"))?;
        let port = port.ok_or(ConfigError::Missing("DB_PORT"))?;
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::invalid("DB_PORT", format!("{port:?}: {e}")))?;
        Ok(Self {
            host,
            name,
            user,
            password,
            port,
        })
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("port", &self.port)
            .finish()
    }
}

impl fmt::Display for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.name)
    }
}
