// =============================================================================
// Instructions Module - Keeper
// =============================================================================

pub mod admin;
pub mod harvest;
pub mod initialize;
pub mod oracles;
pub mod registry;
pub mod set_rewards_root;

pub use admin::*;
pub use harvest::*;
pub use initialize::*;
pub use oracles::*;
pub use registry::*;
pub use set_rewards_root::*;
