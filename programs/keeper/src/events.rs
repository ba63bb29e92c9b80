use anchor_lang::prelude::*;

use crate::state::VaultKind;

#[event]
pub struct KeeperInitialized {
    pub owner: Pubkey,
    pub chain_id: u64,
    pub required_oracles: u8,
    pub total_oracles: u8,
    pub rewards_delay: i64,
}

#[event]
pub struct OracleAdded {
    pub oracle: [u8; 20],
    pub total_oracles: u8,
}

#[event]
pub struct OracleRemoved {
    pub oracle: [u8; 20],
    pub total_oracles: u8,
    pub required_oracles: u8,
}

#[event]
pub struct RequiredOraclesUpdated {
    pub required_oracles: u8,
}

#[event]
pub struct RewardsDelayUpdated {
    pub rewards_delay: i64,
}

#[event]
pub struct OwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}

#[event]
pub struct RewardsRootUpdated {
    pub caller: Pubkey,
    pub rewards_root: [u8; 32],
    pub rewards_ipfs_hash: String,
    pub nonce: u64,
    pub timestamp: i64,
}

#[event]
pub struct Harvested {
    pub vault: Pubkey,
    pub rewards_root: [u8; 32],
    pub assets_delta: i64,
    pub nonce: u64,
}

#[event]
pub struct VaultAdded {
    pub caller: Pubkey,
    pub vault: Pubkey,
    pub kind: VaultKind,
    pub sub_vaults: u8,
}

#[event]
pub struct VaultImplUpdated {
    pub program_id: Pubkey,
    pub approved: bool,
}

#[event]
pub struct FactoryUpdated {
    pub factory: Pubkey,
    pub approved: bool,
}
