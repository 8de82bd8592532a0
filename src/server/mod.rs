pub mod router;

pub use router::{AgentState, agent_router};
