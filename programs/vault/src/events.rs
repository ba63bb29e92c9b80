use anchor_lang::prelude::*;

use keeper::state::VaultKind;

#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub admin: Pubkey,
    pub kind: VaultKind,
    pub asset_mint: Pubkey,
    pub share_mint: Pubkey,
    pub capacity: u64,
    pub fee_percent: u16,
    pub security_deposit: u64,
}

#[event]
pub struct VaultRegistered {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub kind: VaultKind,
    pub sub_vaults: u8,
}

#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub assets: u64,
    pub shares: u64,
}

#[event]
pub struct Redeemed {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub receiver: Pubkey,
    pub assets: u64,
    pub shares: u64,
}

#[event]
pub struct ExitQueueEntered {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub receiver: Pubkey,
    pub position_ticket: u128,
    pub shares: u64,
}

#[event]
pub struct ExitedAssetsClaimed {
    pub vault: Pubkey,
    pub receiver: Pubkey,
    pub prev_position_ticket: u128,
    /// Zero when the request was fully resolved and closed
    pub new_position_ticket: u128,
    pub claimed_shares: u64,
    pub claimed_assets: u64,
}

#[event]
pub struct CheckpointCreated {
    pub vault: Pubkey,
    pub shares: u64,
    pub assets: u64,
    pub total_tickets: u128,
}

#[event]
pub struct FeeSharesMinted {
    pub vault: Pubkey,
    pub receiver: Pubkey,
    pub shares: u64,
    pub assets: u64,
}

#[event]
pub struct StateUpdated {
    pub vault: Pubkey,
    pub caller: Pubkey,
    pub assets_delta: i64,
    pub rewards_nonce: u64,
    pub total_assets: u64,
    pub total_shares: u64,
}

#[event]
pub struct ValidatorsRegistered {
    pub vault: Pubkey,
    pub count: u32,
    pub validators_count: u32,
    pub assets: u64,
}

#[event]
pub struct FeeRecipientUpdated {
    pub vault: Pubkey,
    pub fee_recipient: Pubkey,
}

#[event]
pub struct FeePercentUpdated {
    pub vault: Pubkey,
    pub fee_percent: u16,
}

#[event]
pub struct ValidatorsManagerUpdated {
    pub vault: Pubkey,
    pub validators_manager: Pubkey,
}

#[event]
pub struct AdminTransferred {
    pub vault: Pubkey,
    pub previous_admin: Pubkey,
    pub new_admin: Pubkey,
}
