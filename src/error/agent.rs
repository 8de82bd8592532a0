use mlagent_schema::errno;
use thiserror::Error as ThisError;

use super::ResultCode;
use crate::pipeline::EngineError;

#[derive(Debug, ThisError)]
pub enum AgentError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Store is not connected")]
    NotConnected,

    #[error("Schema version mismatch for table {table}: stored {stored}, supported {supported}")]
    SchemaMismatch {
        table: String,
        stored: i64,
        supported: i64,
    },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Method not available: {0}")]
    Unsupported(String),
}

impl AgentError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AgentError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AgentError::NotFound(msg.into())
    }
}

impl ResultCode for AgentError {
    fn result_code(&self) -> i32 {
        match self {
            AgentError::InvalidArgument(_)
            | AgentError::NotFound(_)
            | AgentError::InvalidState(_) => errno::EINVAL,

            AgentError::NotConnected
            | AgentError::SchemaMismatch { .. }
            | AgentError::DatabaseError(_)
            | AgentError::JsonError(_)
            | AgentError::IoError(_) => errno::EIO,

            AgentError::Engine(e) => e.result_code(),

            AgentError::Timeout(_) => errno::ETIMEDOUT,

            AgentError::RactorError(_) | AgentError::Unsupported(_) => errno::ENOSYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failures_share_the_invalid_argument_code() {
        assert_eq!(AgentError::not_found("m").result_code(), errno::EINVAL);
        assert_eq!(AgentError::invalid_argument("m").result_code(), errno::EINVAL);
        assert_eq!(
            AgentError::InvalidState("active".into()).result_code(),
            errno::EINVAL
        );
    }

    #[test]
    fn storage_and_engine_failures_are_distinguishable() {
        assert_eq!(AgentError::NotConnected.result_code(), errno::EIO);
        assert_eq!(
            AgentError::from(EngineError::Parse("x".into())).result_code(),
            errno::ESTRPIPE
        );
        assert_eq!(
            AgentError::from(EngineError::Timeout).result_code(),
            errno::ETIMEDOUT
        );
        assert_eq!(
            AgentError::Timeout("get_state".into()).result_code(),
            errno::ETIMEDOUT
        );
    }
}
