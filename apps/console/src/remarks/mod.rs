// Remark-driven lifecycle: append-only conversation log, derived
// Active/Closed state, reminder validation and display formatting.

pub mod conversation;
pub mod format;
pub mod handlers;
pub mod log;
pub mod reminder;
pub mod submit;
