use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a launched pipeline instance. Only meaningful inside the daemon process
/// that issued it.
pub type PipelineId = i64;

/// Engine-level state of a pipeline instance.
///
/// The numeric values are what `GetState` puts on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    VoidPending,
    Null,
    Ready,
    Paused,
    Playing,
}

impl PipelineState {
    pub fn as_i32(self) -> i32 {
        match self {
            PipelineState::VoidPending => 0,
            PipelineState::Null => 1,
            PipelineState::Ready => 2,
            PipelineState::Paused => 3,
            PipelineState::Playing => 4,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::VoidPending => "void-pending",
            PipelineState::Null => "null",
            PipelineState::Ready => "ready",
            PipelineState::Paused => "paused",
            PipelineState::Playing => "playing",
        };
        f.write_str(s)
    }
}
