use crate::error::AgentError;
use async_trait::async_trait;
use mlagent_schema::{Call, Method, Reply};

/// One group of remote methods served by the agent.
///
/// The daemon lists its modules explicitly; [`AgentService`](super::AgentService) probes and
/// initializes them in that order and exits them in reverse.
#[async_trait]
pub trait ServiceModule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Methods this module answers. Each method belongs to exactly one module.
    fn methods(&self) -> &'static [Method];

    /// Whether the module can run in this process. A failing probe skips the module.
    async fn probe(&self) -> Result<(), AgentError> {
        Ok(())
    }

    async fn init(&self) -> Result<(), AgentError> {
        Ok(())
    }

    async fn exit(&self) {}

    async fn handle(&self, call: Call) -> Result<Reply, AgentError>;
}

/// Error for a call routed to a module that does not serve it.
pub(crate) fn misrouted(module: &str, call: &Call) -> AgentError {
    AgentError::Unsupported(format!("{:?} is not served by the {module} module", call.method()))
}
