//! Service façade: the remote method surface and the modules behind it.

mod agent;
mod model;
mod module;
mod pipeline;
mod resource;

pub use agent::AgentService;
pub use model::ModelModule;
pub use module::ServiceModule;
pub use pipeline::PipelineModule;
pub use resource::ResourceModule;
