//! In-process engine that checks descriptions and tracks states without running media.
//!
//! Descriptions use the launch-line shape `element [key=value ...] ! element ...`. A segment
//! starting with a caps string (`video/x-raw,format=RGB`) is accepted as-is, and `name.`
//! tokens refer back to named elements.

use mlagent_schema::PipelineState;
use std::time::Duration;
use tracing::trace;

use super::engine::{EngineError, EngineHandle, PipelineEngine};

#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunEngine;

impl DryRunEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineEngine for DryRunEngine {
    fn parse(&self, description: &str) -> Result<Box<dyn EngineHandle>, EngineError> {
        let elements = validate(description)?;
        trace!(elements, "dry-run pipeline constructed");
        Ok(Box::new(DryRunHandle {
            elements,
            state: PipelineState::Null,
        }))
    }
}

struct DryRunHandle {
    elements: usize,
    state: PipelineState,
}

impl EngineHandle for DryRunHandle {
    fn set_state(&mut self, target: PipelineState) -> Result<(), EngineError> {
        if target == PipelineState::VoidPending {
            return Err(EngineError::StateChange {
                target,
                reason: "void-pending is not a target state".to_string(),
            });
        }
        trace!(elements = self.elements, from = %self.state, to = %target, "dry-run transition");
        self.state = target;
        Ok(())
    }

    fn state(&self, _timeout: Duration) -> Result<PipelineState, EngineError> {
        Ok(self.state)
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        self.state = PipelineState::Null;
        Ok(())
    }
}

/// Returns the number of segments in `description`.
fn validate(description: &str) -> Result<usize, EngineError> {
    if description.trim().is_empty() {
        return Err(EngineError::Parse("empty description".to_string()));
    }

    let mut count = 0;
    for (idx, segment) in description.split('!').enumerate() {
        let mut tokens = segment.split_whitespace();
        let Some(head) = tokens.next() else {
            return Err(EngineError::Parse(format!("empty segment at position {idx}")));
        };

        let is_caps = head.contains('/');
        let is_reference = head.ends_with('.') && is_factory_name(head.trim_end_matches('.'));
        if !is_caps && !is_reference && !is_factory_name(head) {
            return Err(EngineError::Parse(format!("invalid element name {head:?}")));
        }

        for token in tokens {
            let ok = match token.split_once('=') {
                Some((key, _)) => is_factory_name(key),
                None => token.ends_with('.') && is_factory_name(token.trim_end_matches('.')),
            };
            if !ok {
                return Err(EngineError::Parse(format!(
                    "unexpected token {token:?} in segment {idx}"
                )));
            }
        }
        count += 1;
    }
    Ok(count)
}

fn is_factory_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_launch_lines() {
        assert_eq!(validate("videotestsrc ! fakesink").unwrap(), 2);
        assert_eq!(
            validate("videotestsrc num-buffers=3 ! video/x-raw,format=RGB ! tensor_converter ! tensor_sink name=out")
                .unwrap(),
            4
        );
        assert_eq!(validate("tee name=t t. ! queue ! fakesink").unwrap(), 3);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(matches!(validate(""), Err(EngineError::Parse(_))));
        assert!(matches!(validate("a ! ! b"), Err(EngineError::Parse(_))));
        assert!(matches!(validate("a ! b$c"), Err(EngineError::Parse(_))));
        assert!(matches!(validate("src junk ! sink"), Err(EngineError::Parse(_))));
    }

    #[test]
    fn tracks_requested_states() {
        let mut handle = DryRunEngine::new().parse("src ! sink").unwrap();
        assert_eq!(handle.state(Duration::ZERO).unwrap(), PipelineState::Null);
        handle.set_state(PipelineState::Playing).unwrap();
        handle.set_state(PipelineState::Playing).unwrap();
        assert_eq!(handle.state(Duration::ZERO).unwrap(), PipelineState::Playing);
        handle.shutdown().unwrap();
        assert_eq!(handle.state(Duration::ZERO).unwrap(), PipelineState::Null);
    }
}
