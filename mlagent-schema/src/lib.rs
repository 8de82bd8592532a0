pub mod call;
pub mod errno;
pub mod model;
pub mod pipeline;
pub mod resource;

pub use call::{Call, Interface, Method, Reply};
pub use model::ModelInfo;
pub use pipeline::{PipelineId, PipelineState};
pub use resource::ResourceInfo;
