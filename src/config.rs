use crate::error::{AgentError, Result};
use crate::source::SourceMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub agent: AgentInfo,
    pub gmail: GmailConfig,
    pub limits: Limits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Advertised in the discovery card.
    pub public_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub organization: String,
    pub organization_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmailConfig {
    pub credentials_path: String,
    pub source: SourceMode,
}

/// How many emails each handler asks the source for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub check: usize,
    pub summarize: usize,
    pub categorize: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            public_url: "http://localhost:8000".to_string(),
        }
    }
}

impl Default for AgentInfo {
    fn default() -> Self {
        Self {
            name: "Email Ethan".to_string(),
            description: "AI-powered email management assistant".to_string(),
            version: "1.0.0".to_string(),
            organization: "Holladworld".to_string(),
            organization_url: "https://github.com/Holladworld".to_string(),
        }
    }
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            credentials_path: "credentials.json".to_string(),
            source: SourceMode::Auto,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            check: 5,
            summarize: 3,
            categorize: 10,
        }
    }
}

impl Config {
    /// Reads `path` if it exists (defaults otherwise), then applies
    /// `EMAIL_ETHAN_*` environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(AgentError::Config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AgentError::Config(e.to_string()))
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = var("EMAIL_ETHAN_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("EMAIL_ETHAN_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| AgentError::Config(format!("invalid EMAIL_ETHAN_PORT '{}'", port)))?;
        }
        if let Some(mode) = var("EMAIL_ETHAN_SOURCE") {
            self.gmail.source = mode.parse().map_err(AgentError::Config)?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
