pub mod config;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod server;
pub mod service;
mod utils;

pub use error::AgentError;
pub use mlagent_schema as schema;
