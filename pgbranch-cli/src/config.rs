//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use pgbranch_postgres::{PgConfig, SslMode};

use crate::error::CliResult;

/// Default config file name (lives in the working directory)
pub const CONFIG_FILE_NAME: &str = "pgbranch.toml";

/// Default migrations directory
pub const MIGRATIONS_DIR: &str = "migrations";

/// pgbranch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database server
    pub database: DatabaseConfig,

    /// Migration file output
    pub migrations: MigrationConfig,

    /// Merge behavior
    pub merge: MergeConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path`, or `pgbranch.toml` in `dir` when present, or defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = dir.join(CONFIG_FILE_NAME);
                if default.exists() {
                    Self::load(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Database server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Password, if the server requires one.
    pub password: Option<String>,
    /// Default database, used when a command needs one and none is named.
    pub database: Option<String>,
    /// `disable`, `prefer` or `require`.
    pub sslmode: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            database: None,
            sslmode: "prefer".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Connection settings for database `name` on this server.
    pub fn pg_config_for(&self, name: &str) -> CliResult<PgConfig> {
        let ssl_mode: SslMode = self.sslmode.parse()?;
        let mut builder = PgConfig::builder()
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .database(name)
            .ssl_mode(ssl_mode)
            .application_name("pgbranch");
        if let Some(password) = &self.password {
            builder = builder.password(password);
        }
        Ok(builder.build()?)
    }

    /// A connection URL for database `name` on this server.
    pub fn connection_url_for(&self, name: &str) -> CliResult<String> {
        Ok(self.pg_config_for(name)?.to_url()?)
    }
}

/// Migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Directory for migration files
    pub directory: PathBuf,

    /// Precede each statement with a description comment
    pub include_comments: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(MIGRATIONS_DIR),
            include_comments: true,
        }
    }
}

/// Merge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Keep applying after a failed statement
    pub continue_on_error: bool,

    /// Deadline for applying a merge, in seconds
    pub timeout_secs: Option<u64>,
}

impl MergeConfig {
    /// The apply deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
