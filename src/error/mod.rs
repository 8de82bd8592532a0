mod agent;

pub use agent::AgentError;

/// Maps an error onto the negative-errno result domain carried in replies.
pub trait ResultCode {
    fn result_code(&self) -> i32;
}
