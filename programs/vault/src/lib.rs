// =============================================================================
// Vault - Liquid Staking Vault Program
// =============================================================================
//
// A vault pools deposits into validators and tracks ownership with shares:
// - Deposits mint shares at the current share price
// - Rewards reported by the keeper oracles move the share price
// - While validators hold the principal, exits wait in a checkpoint queue
//
// The keeper program owns the rewards rounds and the vault registry; vaults
// pull their reward from it through update_state.
// =============================================================================

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod state;

use anchor_lang::prelude::*;

pub use constants::*;
pub use error::*;
pub use instructions::*;
pub use state::*;

declare_id!("Auq4WrX7JYRPtsoAugsME6CobM8vHVEncX3EzssJejpE");

#[program]
pub mod vault {
    use super::*;

    // =========================================================================
    // Vault Initialization
    // =========================================================================

    /// Create a vault
    ///
    /// Creates:
    /// - Vault account (configuration and accounting)
    /// - Exit queue account (empty checkpoint ledger)
    /// - Asset token account (holds liquid assets)
    /// - Share mint (vault PDA is the mint authority)
    ///
    /// The creator pays the security deposit, whose shares are never minted.
    pub fn initialize_vault(
        ctx: Context<InitializeVault>,
        params: InitializeVaultParams,
    ) -> Result<()> {
        instructions::initialize_vault::handler_initialize_vault(ctx, params)
    }

    /// Register the vault with the keeper, signed by the vault PDA
    ///
    /// The caller must be the keeper registry owner or an approved factory.
    /// Meta vaults list their sub-vaults and pass each sub-vault's keeper
    /// VaultEntry as remaining accounts.
    pub fn register_vault<'info>(
        ctx: Context<'_, '_, '_, 'info, RegisterVault<'info>>,
        sub_vaults: Vec<Pubkey>,
    ) -> Result<()> {
        instructions::register_vault::handler_register_vault(ctx, sub_vaults)
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Deposit assets and mint share tokens to the receiver
    ///
    /// # Arguments
    /// * `assets` - Amount of assets to deposit (in base units)
    /// * `min_shares_out` - Minimum shares to receive (slippage protection, 0 to skip)
    pub fn deposit(ctx: Context<Deposit>, assets: u64, min_shares_out: u64) -> Result<()> {
        instructions::deposit::handler_deposit(ctx, assets, min_shares_out)
    }

    /// Burn shares for assets (uncollateralized vaults only)
    ///
    /// # Arguments
    /// * `shares` - Number of shares to burn
    /// * `min_assets_out` - Minimum assets to receive (slippage protection, 0 to skip)
    pub fn redeem(ctx: Context<Redeem>, shares: u64, min_assets_out: u64) -> Result<()> {
        instructions::redeem::handler_redeem(ctx, shares, min_assets_out)
    }

    /// Queue shares for exit (collateralized vaults only)
    ///
    /// # Returns
    /// * The position ticket of the new exit request
    pub fn enter_exit_queue(ctx: Context<EnterExitQueue>, shares: u64) -> Result<u128> {
        instructions::enter_exit_queue::handler_enter_exit_queue(ctx, shares)
    }

    /// Claim the resolved part of an exit request
    ///
    /// # Arguments
    /// * `checkpoint_index` - Checkpoint covering the request's position ticket
    pub fn claim_exited_assets(
        ctx: Context<ClaimExitedAssets>,
        checkpoint_index: u64,
    ) -> Result<ClaimResult> {
        instructions::claim_exited_assets::handler_claim_exited_assets(ctx, checkpoint_index)
    }

    // =========================================================================
    // State Sync (permissionless)
    // =========================================================================

    /// Harvest rewards from the keeper, charge the fee and advance the exit
    /// queue. Meta vaults prove their own reward and pass their sub-vaults'
    /// RewardSync accounts as remaining accounts.
    pub fn update_state<'info>(
        ctx: Context<'_, '_, '_, 'info, UpdateState<'info>>,
        params: UpdateStateParams,
    ) -> Result<()> {
        instructions::update_state::handler_update_state(ctx, params)
    }

    // =========================================================================
    // Validators (validators manager only)
    // =========================================================================

    /// Move principal for `count` validators to the deposit escrow
    pub fn register_validators(ctx: Context<RegisterValidators>, count: u32) -> Result<()> {
        instructions::register_validators::handler_register_validators(ctx, count)
    }

    // =========================================================================
    // Admin Operations
    // =========================================================================

    pub fn set_fee_recipient(ctx: Context<UpdateFeeConfig>, fee_recipient: Pubkey) -> Result<()> {
        instructions::admin::handler_set_fee_recipient(ctx, fee_recipient)
    }

    /// Fee in basis points (max 5000)
    pub fn set_fee_percent(ctx: Context<UpdateFeeConfig>, fee_percent: u16) -> Result<()> {
        instructions::admin::handler_set_fee_percent(ctx, fee_percent)
    }

    pub fn set_validators_manager(
        ctx: Context<UpdateVaultRole>,
        validators_manager: Pubkey,
    ) -> Result<()> {
        instructions::admin::handler_set_validators_manager(ctx, validators_manager)
    }

    pub fn transfer_admin(ctx: Context<UpdateVaultRole>, new_admin: Pubkey) -> Result<()> {
        instructions::admin::handler_transfer_admin(ctx, new_admin)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn convert_to_shares(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
        instructions::views::handler_convert_to_shares(ctx, assets)
    }

    pub fn convert_to_assets(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
        instructions::views::handler_convert_to_assets(ctx, shares)
    }

    /// Checkpoint index covering `position_ticket`, -1 while unresolved
    pub fn get_checkpoint_index(ctx: Context<ExitQueueView>, position_ticket: u128) -> Result<i64> {
        instructions::views::handler_get_checkpoint_index(ctx, position_ticket)
    }

    pub fn calculate_exited_assets(
        ctx: Context<ExitQueueView>,
        position_ticket: u128,
        shares: u64,
        checkpoint_index: u64,
    ) -> Result<ExitedAssets> {
        instructions::views::handler_calculate_exited_assets(
            ctx,
            position_ticket,
            shares,
            checkpoint_index,
        )
    }
}
