// =============================================================================
// State Module
// =============================================================================

pub mod depositor;
pub mod exit_queue;
pub mod exit_request;
pub mod vault;

pub use depositor::*;
pub use exit_queue::*;
pub use exit_request::*;
pub use vault::*;
