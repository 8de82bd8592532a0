//! Remote call surface of the agent.
//!
//! A [`Call`] is what a client sends; a [`Reply`] is what it gets back. The JSON form is
//! `{"method": "<Method>", "args": {...}}`.

use serde::{Deserialize, Serialize};

use crate::errno;
use crate::pipeline::{PipelineId, PipelineState};

/// Interface a method belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interface {
    Pipeline,
    Model,
    Resource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    SetPipeline,
    GetPipeline,
    DeletePipeline,
    LaunchPipeline,
    StartPipeline,
    StopPipeline,
    DestroyPipeline,
    GetState,
    RegisterModel,
    UpdateModelDescription,
    ActivateModel,
    GetModel,
    GetActivatedModel,
    GetAllModels,
    DeleteModel,
    AddResource,
    GetResource,
    DeleteResource,
}

impl Method {
    pub const PIPELINE: &'static [Method] = &[
        Method::SetPipeline,
        Method::GetPipeline,
        Method::DeletePipeline,
        Method::LaunchPipeline,
        Method::StartPipeline,
        Method::StopPipeline,
        Method::DestroyPipeline,
        Method::GetState,
    ];

    pub const MODEL: &'static [Method] = &[
        Method::RegisterModel,
        Method::UpdateModelDescription,
        Method::ActivateModel,
        Method::GetModel,
        Method::GetActivatedModel,
        Method::GetAllModels,
        Method::DeleteModel,
    ];

    pub const RESOURCE: &'static [Method] = &[
        Method::AddResource,
        Method::GetResource,
        Method::DeleteResource,
    ];

    pub fn interface(self) -> Interface {
        if Self::PIPELINE.contains(&self) {
            Interface::Pipeline
        } else if Self::MODEL.contains(&self) {
            Interface::Model
        } else {
            Interface::Resource
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "method", content = "args")]
pub enum Call {
    SetPipeline {
        name: String,
        description: String,
    },
    GetPipeline {
        name: String,
    },
    DeletePipeline {
        name: String,
    },
    LaunchPipeline {
        name: String,
    },
    StartPipeline {
        id: PipelineId,
    },
    StopPipeline {
        id: PipelineId,
    },
    DestroyPipeline {
        id: PipelineId,
    },
    GetState {
        id: PipelineId,
    },
    RegisterModel {
        name: String,
        path: String,
        #[serde(default)]
        activate: bool,
        #[serde(default)]
        description: String,
        #[serde(default)]
        app_info: String,
    },
    UpdateModelDescription {
        name: String,
        version: u32,
        description: String,
    },
    ActivateModel {
        name: String,
        version: u32,
    },
    GetModel {
        name: String,
        version: u32,
    },
    GetActivatedModel {
        name: String,
    },
    GetAllModels {
        name: String,
    },
    DeleteModel {
        name: String,
        version: u32,
        /// Allows deleting the active version. Absent means `false`.
        #[serde(default)]
        force: bool,
    },
    AddResource {
        name: String,
        path: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        app_info: String,
    },
    GetResource {
        name: String,
    },
    DeleteResource {
        name: String,
    },
}

impl Call {
    pub fn method(&self) -> Method {
        match self {
            Call::SetPipeline { .. } => Method::SetPipeline,
            Call::GetPipeline { .. } => Method::GetPipeline,
            Call::DeletePipeline { .. } => Method::DeletePipeline,
            Call::LaunchPipeline { .. } => Method::LaunchPipeline,
            Call::StartPipeline { .. } => Method::StartPipeline,
            Call::StopPipeline { .. } => Method::StopPipeline,
            Call::DestroyPipeline { .. } => Method::DestroyPipeline,
            Call::GetState { .. } => Method::GetState,
            Call::RegisterModel { .. } => Method::RegisterModel,
            Call::UpdateModelDescription { .. } => Method::UpdateModelDescription,
            Call::ActivateModel { .. } => Method::ActivateModel,
            Call::GetModel { .. } => Method::GetModel,
            Call::GetActivatedModel { .. } => Method::GetActivatedModel,
            Call::GetAllModels { .. } => Method::GetAllModels,
            Call::DeleteModel { .. } => Method::DeleteModel,
            Call::AddResource { .. } => Method::AddResource,
            Call::GetResource { .. } => Method::GetResource,
            Call::DeleteResource { .. } => Method::DeleteResource,
        }
    }
}

/// Reply to a [`Call`]. `result` is always present; the other fields are set only by the
/// methods that produce them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Reply {
    pub result: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PipelineId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// JSON text: a model object, a model array, or a resource array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl Reply {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn error(result: i32) -> Self {
        Self {
            result,
            ..Default::default()
        }
    }

    pub fn with_description(description: String) -> Self {
        Self {
            description: Some(description),
            ..Default::default()
        }
    }

    pub fn with_id(id: PipelineId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn with_state(state: PipelineState) -> Self {
        Self {
            state: Some(state.as_i32()),
            ..Default::default()
        }
    }

    pub fn with_version(version: u32) -> Self {
        Self {
            version: Some(version),
            ..Default::default()
        }
    }

    pub fn with_info(info: String) -> Self {
        Self {
            info: Some(info),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == errno::OK
    }
}
