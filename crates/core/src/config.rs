use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub slack: SlackConfig,
    pub email: EmailConfig,
    pub workflow: WorkflowSection,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub connection_string: SecretString,
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub connection_string: SecretString,
}

/// Company the workflow operates for, plus the departments its invoices may
/// name. The department list feeds front-end input validation only.
#[derive(Clone, Debug)]
pub struct WorkflowSection {
    pub company_name: String,
    pub departments: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

/// Programmatic overrides (CLI flags). Highest precedence layer.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub company_name: Option<String>,
    pub departments: Option<Vec<String>>,
    pub slack_connection_string: Option<String>,
    pub email_connection_string: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://routey.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            slack: SlackConfig { connection_string: "slack".to_string().into() },
            email: EmailConfig { connection_string: "email".to_string().into() },
            workflow: WorkflowSection {
                company_name: "Light".to_string(),
                departments: vec!["Marketing".to_string(), "Finance".to_string()],
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    /// Layered load: defaults, then the TOML file (if any), then `ROUTEY_*`
    /// environment variables, then explicit overrides, then validation.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("routey.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(slack) = patch.slack {
            if let Some(connection_string) = slack.connection_string {
                self.slack.connection_string = connection_string.into();
            }
        }

        if let Some(email) = patch.email {
            if let Some(connection_string) = email.connection_string {
                self.email.connection_string = connection_string.into();
            }
        }

        if let Some(workflow) = patch.workflow {
            if let Some(company_name) = workflow.company_name {
                self.workflow.company_name = company_name;
            }
            if let Some(departments) = workflow.departments {
                self.workflow.departments = departments;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ROUTEY_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("ROUTEY_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("ROUTEY_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("ROUTEY_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("ROUTEY_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("ROUTEY_SLACK_CONNECTION_STRING") {
            self.slack.connection_string = value.into();
        }
        if let Some(value) = read_env("ROUTEY_EMAIL_CONNECTION_STRING") {
            self.email.connection_string = value.into();
        }

        if let Some(value) = read_env("ROUTEY_COMPANY_NAME") {
            self.workflow.company_name = value;
        }
        if let Some(value) = read_env("ROUTEY_COMPANY_DEPARTMENTS") {
            self.workflow.departments = split_departments(&value);
        }

        if let Some(value) = read_env("ROUTEY_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("ROUTEY_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(company_name) = overrides.company_name {
            self.workflow.company_name = company_name;
        }
        if let Some(departments) = overrides.departments {
            self.workflow.departments = departments;
        }
        if let Some(connection_string) = overrides.slack_connection_string {
            self.slack.connection_string = connection_string.into();
        }
        if let Some(connection_string) = overrides.email_connection_string {
            self.email.connection_string = connection_string.into();
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_connection_string("slack.connection_string", &self.slack.connection_string)?;
        validate_connection_string("email.connection_string", &self.email.connection_string)?;
        validate_workflow(&self.workflow)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Comma-separated department list, entries trimmed, blanks dropped.
pub fn split_departments(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("routey.toml"), PathBuf::from("config/routey.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_connection_string(key: &str, value: &SecretString) -> Result<(), ConfigError> {
    if value.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(format!("{key} is required")));
    }
    Ok(())
}

fn validate_workflow(workflow: &WorkflowSection) -> Result<(), ConfigError> {
    if workflow.company_name.trim().is_empty() {
        return Err(ConfigError::Validation("workflow.company_name is required".to_string()));
    }
    if workflow.departments.is_empty() {
        return Err(ConfigError::Validation(
            "workflow.departments must list at least one department".to_string(),
        ));
    }
    if workflow.departments.iter().any(|department| department.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "workflow.departments must not contain blank entries".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    slack: Option<TransportPatch>,
    email: Option<TransportPatch>,
    workflow: Option<WorkflowPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TransportPatch {
    connection_string: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkflowPatch {
    company_name: Option<String>,
    departments: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
