pub mod keeper;
pub mod oracles;
pub mod registry;
pub mod reward_sync;

pub use keeper::*;
pub use oracles::*;
pub use registry::*;
pub use reward_sync::*;
