use crate::db::models::{DbModel, DbResource, ModelCreate, ResourceCreate};
use crate::db::store::{ModelSelector, Store};
use crate::error::AgentError;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use tracing::{info, warn};

/// Messages handled by the database actor. Each one is served inside its own
/// connect/disconnect bracket, so no connection outlives a single logical operation.
#[derive(Debug)]
pub enum DbActorMessage {
    /// Open and close the store once; verifies the file and schema are usable.
    Probe(RpcReplyPort<Result<(), AgentError>>),

    SetPipeline {
        name: String,
        description: String,
        reply: RpcReplyPort<Result<(), AgentError>>,
    },
    GetPipeline(String, RpcReplyPort<Result<String, AgentError>>),
    DeletePipeline(String, RpcReplyPort<Result<(), AgentError>>),

    /// Register a model version and return the assigned version.
    RegisterModel(ModelCreate, RpcReplyPort<Result<u32, AgentError>>),
    UpdateModelDescription {
        name: String,
        version: u32,
        description: String,
        reply: RpcReplyPort<Result<(), AgentError>>,
    },
    ActivateModel {
        name: String,
        version: u32,
        reply: RpcReplyPort<Result<(), AgentError>>,
    },
    GetModel {
        name: String,
        selector: ModelSelector,
        reply: RpcReplyPort<Result<Vec<DbModel>, AgentError>>,
    },
    DeleteModel {
        name: String,
        version: u32,
        force: bool,
        reply: RpcReplyPort<Result<(), AgentError>>,
    },

    SetResource(ResourceCreate, RpcReplyPort<Result<(), AgentError>>),
    GetResource(String, RpcReplyPort<Result<Vec<DbResource>, AgentError>>),
    DeleteResource(String, RpcReplyPort<Result<(), AgentError>>),
}

impl DbActorMessage {
    /// Answer the caller with `err` without running the operation.
    fn reject(self, err: AgentError) {
        match self {
            DbActorMessage::Probe(reply)
            | DbActorMessage::DeletePipeline(_, reply)
            | DbActorMessage::SetResource(_, reply)
            | DbActorMessage::DeleteResource(_, reply)
            | DbActorMessage::SetPipeline { reply, .. }
            | DbActorMessage::UpdateModelDescription { reply, .. }
            | DbActorMessage::ActivateModel { reply, .. }
            | DbActorMessage::DeleteModel { reply, .. } => {
                let _ = reply.send(Err(err));
            }
            DbActorMessage::GetPipeline(_, reply) => {
                let _ = reply.send(Err(err));
            }
            DbActorMessage::RegisterModel(_, reply) => {
                let _ = reply.send(Err(err));
            }
            DbActorMessage::GetModel { reply, .. } => {
                let _ = reply.send(Err(err));
            }
            DbActorMessage::GetResource(_, reply) => {
                let _ = reply.send(Err(err));
            }
        }
    }
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn probe(&self) -> Result<(), AgentError> {
        ractor::call!(self.actor, DbActorMessage::Probe)
            .map_err(|e| AgentError::RactorError(format!("DbActor Probe RPC failed: {e}")))?
    }

    pub async fn set_pipeline(&self, name: String, description: String) -> Result<(), AgentError> {
        ractor::call!(self.actor, |reply| DbActorMessage::SetPipeline {
            name,
            description,
            reply
        })
        .map_err(|e| AgentError::RactorError(format!("DbActor SetPipeline RPC failed: {e}")))?
    }

    pub async fn get_pipeline(&self, name: String) -> Result<String, AgentError> {
        ractor::call!(self.actor, DbActorMessage::GetPipeline, name)
            .map_err(|e| AgentError::RactorError(format!("DbActor GetPipeline RPC failed: {e}")))?
    }

    pub async fn delete_pipeline(&self, name: String) -> Result<(), AgentError> {
        ractor::call!(self.actor, DbActorMessage::DeletePipeline, name).map_err(|e| {
            AgentError::RactorError(format!("DbActor DeletePipeline RPC failed: {e}"))
        })?
    }

    pub async fn register_model(&self, create: ModelCreate) -> Result<u32, AgentError> {
        ractor::call!(self.actor, DbActorMessage::RegisterModel, create).map_err(|e| {
            AgentError::RactorError(format!("DbActor RegisterModel RPC failed: {e}"))
        })?
    }

    pub async fn update_model_description(
        &self,
        name: String,
        version: u32,
        description: String,
    ) -> Result<(), AgentError> {
        ractor::call!(self.actor, |reply| DbActorMessage::UpdateModelDescription {
            name,
            version,
            description,
            reply
        })
        .map_err(|e| {
            AgentError::RactorError(format!("DbActor UpdateModelDescription RPC failed: {e}"))
        })?
    }

    pub async fn activate_model(&self, name: String, version: u32) -> Result<(), AgentError> {
        ractor::call!(self.actor, |reply| DbActorMessage::ActivateModel {
            name,
            version,
            reply
        })
        .map_err(|e| AgentError::RactorError(format!("DbActor ActivateModel RPC failed: {e}")))?
    }

    pub async fn get_model(
        &self,
        name: String,
        selector: ModelSelector,
    ) -> Result<Vec<DbModel>, AgentError> {
        ractor::call!(self.actor, |reply| DbActorMessage::GetModel {
            name,
            selector,
            reply
        })
        .map_err(|e| AgentError::RactorError(format!("DbActor GetModel RPC failed: {e}")))?
    }

    pub async fn delete_model(
        &self,
        name: String,
        version: u32,
        force: bool,
    ) -> Result<(), AgentError> {
        ractor::call!(self.actor, |reply| DbActorMessage::DeleteModel {
            name,
            version,
            force,
            reply
        })
        .map_err(|e| AgentError::RactorError(format!("DbActor DeleteModel RPC failed: {e}")))?
    }

    pub async fn set_resource(&self, create: ResourceCreate) -> Result<(), AgentError> {
        ractor::call!(self.actor, DbActorMessage::SetResource, create)
            .map_err(|e| AgentError::RactorError(format!("DbActor SetResource RPC failed: {e}")))?
    }

    pub async fn get_resource(&self, name: String) -> Result<Vec<DbResource>, AgentError> {
        ractor::call!(self.actor, DbActorMessage::GetResource, name)
            .map_err(|e| AgentError::RactorError(format!("DbActor GetResource RPC failed: {e}")))?
    }

    pub async fn delete_resource(&self, name: String) -> Result<(), AgentError> {
        ractor::call!(self.actor, DbActorMessage::DeleteResource, name).map_err(|e| {
            AgentError::RactorError(format!("DbActor DeleteResource RPC failed: {e}"))
        })?
    }

    /// Stop the actor; queued messages are dropped.
    pub fn stop(&self) {
        self.actor.stop(None);
    }
}

struct DbActorState {
    store: Store,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = Store;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        store: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!("DbActor initialized");
        Ok(DbActorState { store })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if let Err(e) = state.store.connect().await {
            warn!(error = %e, "store connect failed");
            message.reject(e);
            return Ok(());
        }

        Self::serve(&mut state.store, message).await;
        state.store.disconnect().await;
        Ok(())
    }
}

impl DbActor {
    async fn serve(store: &mut Store, message: DbActorMessage) {
        match message {
            DbActorMessage::Probe(reply) => {
                let _ = reply.send(Ok(()));
            }
            DbActorMessage::SetPipeline {
                name,
                description,
                reply,
            } => {
                let res = store.set_pipeline(&name, &description).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetPipeline(name, reply) => {
                let res = store.get_pipeline(&name).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeletePipeline(name, reply) => {
                let res = store.delete_pipeline(&name).await;
                let _ = reply.send(res);
            }
            DbActorMessage::RegisterModel(create, reply) => {
                let res = store.register_model(create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::UpdateModelDescription {
                name,
                version,
                description,
                reply,
            } => {
                let res = store
                    .update_model_description(&name, version, &description)
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::ActivateModel {
                name,
                version,
                reply,
            } => {
                let res = store.activate_model(&name, version).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetModel {
                name,
                selector,
                reply,
            } => {
                let res = store.get_model(&name, selector).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteModel {
                name,
                version,
                force,
                reply,
            } => {
                let res = store.delete_model(&name, version, force).await;
                let _ = reply.send(res);
            }
            DbActorMessage::SetResource(create, reply) => {
                let res = store.set_resource(create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetResource(name, reply) => {
                let res = store.get_resource(&name).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteResource(name, reply) => {
                let res = store.delete_resource(&name).await;
                let _ = reply.send(res);
            }
        }
    }
}

/// Spawn the database actor over `store` and return a cloneable handle.
pub async fn spawn(store: Store) -> Result<DbActorHandle, AgentError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, store)
        .await
        .map_err(|e| AgentError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

/// Convenience for tests and the daemon: build a [`Store`] and spawn its actor.
pub async fn open(database_url: &str, key_prefix: &str) -> Result<DbActorHandle, AgentError> {
    spawn(Store::new(database_url, key_prefix)?).await
}
