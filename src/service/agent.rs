//! The agent façade: routes remote calls to service modules and turns every outcome into a
//! [`Reply`] carrying a result code.

use super::module::ServiceModule;
use crate::db::store::require;
use crate::error::{AgentError, ResultCode};
use ahash::AHashMap;
use mlagent_schema::{Call, Method, Reply};
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AgentService {
    modules: Vec<Arc<dyn ServiceModule>>,
    routes: AHashMap<Method, Arc<dyn ServiceModule>>,
}

impl AgentService {
    /// Probes and initializes `candidates` in order and builds the method table from the ones
    /// that come up. A module that fails either step is skipped and its methods answer
    /// `-ENOSYS`.
    pub async fn start(candidates: Vec<Arc<dyn ServiceModule>>) -> Self {
        let mut modules = Vec::with_capacity(candidates.len());
        let mut routes = AHashMap::new();

        for module in candidates {
            let name = module.name();
            if let Err(e) = module.probe().await {
                warn!(module = name, error = %e, "module probe failed; skipped");
                continue;
            }
            if let Err(e) = module.init().await {
                warn!(module = name, error = %e, "module init failed; skipped");
                continue;
            }

            for &method in module.methods() {
                match routes.entry(method) {
                    Entry::Vacant(slot) => {
                        slot.insert(Arc::clone(&module));
                    }
                    Entry::Occupied(_) => {
                        warn!(module = name, ?method, "method already served by another module");
                    }
                }
            }
            info!(module = name, methods = module.methods().len(), "module loaded");
            modules.push(module);
        }

        Self { modules, routes }
    }

    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub async fn call(&self, call: Call) -> Reply {
        let method = call.method();
        match self.route(call).await {
            Ok(reply) => {
                debug!(?method, "call served");
                reply
            }
            Err(e) => {
                let code = e.result_code();
                warn!(interface = ?method.interface(), ?method, code, error = %e, "call failed");
                Reply::error(code)
            }
        }
    }

    /// Exits loaded modules in reverse load order.
    pub async fn shutdown(&self) {
        for module in self.modules.iter().rev() {
            module.exit().await;
            info!(module = module.name(), "module exited");
        }
    }

    async fn route(&self, call: Call) -> Result<Reply, AgentError> {
        check_args(&call)?;
        let module = self.routes.get(&call.method()).ok_or_else(|| {
            AgentError::Unsupported(format!("{:?} has no loaded module", call.method()))
        })?;
        module.handle(call).await
    }
}

/// Shape checks shared by every transport: names and required strings non-empty, ids
/// positive.
fn check_args(call: &Call) -> Result<(), AgentError> {
    match call {
        Call::SetPipeline { name, description } => {
            require(name, "name")?;
            require(description, "description")
        }
        Call::GetPipeline { name }
        | Call::DeletePipeline { name }
        | Call::LaunchPipeline { name }
        | Call::GetActivatedModel { name }
        | Call::GetAllModels { name }
        | Call::GetResource { name }
        | Call::DeleteResource { name }
        | Call::GetModel { name, .. }
        | Call::ActivateModel { name, .. }
        | Call::DeleteModel { name, .. } => require(name, "name"),
        Call::StartPipeline { id }
        | Call::StopPipeline { id }
        | Call::DestroyPipeline { id }
        | Call::GetState { id } => {
            if *id <= 0 {
                return Err(AgentError::invalid_argument(format!("invalid pipeline id {id}")));
            }
            Ok(())
        }
        Call::RegisterModel { name, path, .. } | Call::AddResource { name, path, .. } => {
            require(name, "name")?;
            require(path, "path")
        }
        Call::UpdateModelDescription {
            name, description, ..
        } => {
            require(name, "name")?;
            require(description, "description")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_names_and_bad_ids() {
        assert!(check_args(&Call::GetPipeline { name: String::new() }).is_err());
        assert!(check_args(&Call::StartPipeline { id: 0 }).is_err());
        assert!(check_args(&Call::GetState { id: -4 }).is_err());
        assert!(
            check_args(&Call::RegisterModel {
                name: "m".into(),
                path: String::new(),
                activate: true,
                description: String::new(),
                app_info: String::new(),
            })
            .is_err()
        );
        assert!(
            check_args(&Call::AddResource {
                name: "r".into(),
                path: "/p".into(),
                description: String::new(),
                app_info: String::new(),
            })
            .is_ok()
        );
    }
}
