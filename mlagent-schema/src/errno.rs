//! Result codes carried in every [`Reply`](crate::Reply).
//!
//! Values are negated Linux errno numbers; `0` is success.

pub const OK: i32 = 0;
pub const EIO: i32 = -5;
pub const EINVAL: i32 = -22;
pub const ENOSYS: i32 = -38;
pub const ESTRPIPE: i32 = -86;
pub const ETIMEDOUT: i32 = -110;
