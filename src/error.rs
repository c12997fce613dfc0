#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Email source error: {0}")]
    Source(#[source] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
