//! Database module: the service store and the actor that serializes access to it.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and insert payloads
//! - `schema.rs`: SQL DDL and supported schema versions (SQLite-first)
//! - `store.rs`: transactional operations over one connection
//! - `actor.rs`: actor owning the store; one connect/disconnect per message

pub mod actor;
pub mod models;
pub mod schema;
pub mod store;

pub use actor::{DbActorHandle, open, spawn};
pub use models::{DbModel, DbResource, ModelCreate, ResourceCreate};
pub use schema::SQLITE_INIT;
pub use store::{ModelSelector, Store};
