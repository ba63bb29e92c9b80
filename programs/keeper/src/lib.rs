use anchor_lang::prelude::*;

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod merkle;
pub mod signatures;
pub mod state;

use instructions::*;
use state::HarvestResult;

// Program ID - will be updated after first deploy
declare_id!("2MTw6MTjRB2jyvjk5ZGRKbEDrNoem8bLrJja56TTk94z");

#[program]
pub mod keeper {
    use super::*;

    /// Initialize the keeper and the vault registry
    ///
    /// # Arguments
    /// * `ctx` - Context containing all required accounts
    /// * `params` - Chain id, rewards delay and the initial oracle set
    ///
    /// # Accounts
    /// * `owner` - Keeper owner (signer, payer)
    /// * `keeper_state` - Keeper PDA to create
    /// * `registry` - Registry PDA to create
    ///
    pub fn initialize(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
        instructions::initialize::handler_initialize(ctx, params)
    }

    // =========================================================================
    // Oracle Management (owner only)
    // =========================================================================

    /// Register a new oracle signer
    pub fn add_oracle(ctx: Context<ManageOracles>, oracle: [u8; 20]) -> Result<()> {
        instructions::oracles::handler_add_oracle(ctx, oracle)
    }

    /// Remove an oracle signer. The threshold drops with the set if needed.
    pub fn remove_oracle(ctx: Context<ManageOracles>, oracle: [u8; 20]) -> Result<()> {
        instructions::oracles::handler_remove_oracle(ctx, oracle)
    }

    /// Change how many oracle signatures a rewards root needs
    pub fn set_required_oracles(ctx: Context<ManageOracles>, required_oracles: u8) -> Result<()> {
        instructions::oracles::handler_set_required_oracles(ctx, required_oracles)
    }

    // =========================================================================
    // Configuration (owner only)
    // =========================================================================

    /// Change the minimum time between rewards root updates
    pub fn update_rewards_delay(ctx: Context<UpdateRewardsDelay>, rewards_delay: i64) -> Result<()> {
        instructions::admin::handler_update_rewards_delay(ctx, rewards_delay)
    }

    /// Transfer keeper and registry ownership
    pub fn transfer_ownership(ctx: Context<TransferOwnership>) -> Result<()> {
        instructions::admin::handler_transfer_ownership(ctx)
    }

    // =========================================================================
    // Rewards
    // =========================================================================

    /// Accept a new rewards root signed by the oracle quorum
    ///
    /// # Arguments
    /// * `ctx` - Context containing all required accounts
    /// * `params` - Root, IPFS hash and the sorted oracle signatures
    ///
    pub fn set_rewards_root(ctx: Context<SetRewardsRoot>, params: SetRewardsRootParams) -> Result<()> {
        instructions::set_rewards_root::handler_set_rewards_root(ctx, params)
    }

    /// Pull a standard vault's reward from the current or previous round.
    /// Must be signed by the vault account.
    ///
    /// # Arguments
    /// * `ctx` - Context containing all required accounts
    /// * `params` - Cumulative reward and its Merkle proof
    ///
    pub fn harvest(ctx: Context<Harvest>, params: HarvestParams) -> Result<HarvestResult> {
        instructions::harvest::handler_harvest(ctx, params)
    }

    /// Pull a meta vault's proven reward once all of its sub-vaults have
    /// harvested the same round. Sub-vault RewardSync accounts are passed as
    /// remaining accounts.
    pub fn harvest_meta_vault(
        ctx: Context<HarvestMetaVault>,
        params: HarvestParams,
    ) -> Result<HarvestResult> {
        instructions::harvest::handler_harvest_meta_vault(ctx, params)
    }

    /// True when the vault is two or more rounds behind
    pub fn is_harvest_required(ctx: Context<RewardsStatus>) -> Result<bool> {
        instructions::harvest::handler_is_harvest_required(ctx)
    }

    /// True when a round newer than the vault's last harvest is available
    pub fn can_harvest(ctx: Context<RewardsStatus>) -> Result<bool> {
        instructions::harvest::handler_can_harvest(ctx)
    }

    // =========================================================================
    // Vault Registry
    // =========================================================================

    /// Register a vault (registry owner or approved factory). The vault account
    /// must sign, so registration goes through the vault program.
    pub fn add_vault(ctx: Context<AddVault>, params: AddVaultParams) -> Result<()> {
        instructions::registry::handler_add_vault(ctx, params)
    }

    /// Approve a program as a vault implementation (owner only)
    pub fn add_vault_impl(ctx: Context<ManageRegistry>, program_id: Pubkey) -> Result<()> {
        instructions::registry::handler_add_vault_impl(ctx, program_id)
    }

    /// Revoke a vault implementation (owner only)
    pub fn remove_vault_impl(ctx: Context<ManageRegistry>, program_id: Pubkey) -> Result<()> {
        instructions::registry::handler_remove_vault_impl(ctx, program_id)
    }

    /// Approve a vault factory (owner only)
    pub fn add_factory(ctx: Context<ManageRegistry>, factory: Pubkey) -> Result<()> {
        instructions::registry::handler_add_factory(ctx, factory)
    }

    /// Revoke a vault factory (owner only)
    pub fn remove_factory(ctx: Context<ManageRegistry>, factory: Pubkey) -> Result<()> {
        instructions::registry::handler_remove_factory(ctx, factory)
    }
}
