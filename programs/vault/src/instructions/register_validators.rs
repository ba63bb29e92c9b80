// =============================================================================
// Register Validators Instruction
// =============================================================================
// Moves validator principal (VALIDATOR_DEPOSIT per validator) out of the
// vault's liquid balance to the deposit escrow, where the staking deposit
// flow picks it up.
//
// The first registration collateralizes the vault: from then on redemptions
// go through the exit queue and the vault must keep up with keeper rounds.
// The keeper nonce is snapshotted at that moment so the vault starts fresh.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use keeper::constants::KEEPER_SEED;
use keeper::state::{KeeperState, VaultKind};

use crate::constants::*;
use crate::error::VaultError;
use crate::events::ValidatorsRegistered;
use crate::instructions::transfer_from_vault;
use crate::state::Vault;

#[derive(Accounts)]
pub struct RegisterValidators<'info> {
    #[account(
        constraint = validators_manager.key() == vault.validators_manager @ VaultError::Unauthorized
    )]
    pub validators_manager: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump,
        constraint = vault.kind == VaultKind::Standard @ VaultError::InvalidVaultKind
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [VAULT_ASSETS_SEED, vault.key().as_ref()],
        bump = vault.asset_account_bump
    )]
    pub asset_account: Account<'info, TokenAccount>,

    /// Receives the validator principal
    #[account(
        mut,
        address = vault.deposit_escrow @ VaultError::InvalidAddress
    )]
    pub deposit_escrow: Account<'info, TokenAccount>,

    #[account(
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump,
        seeds::program = keeper::ID
    )]
    pub keeper_state: Account<'info, KeeperState>,

    pub token_program: Program<'info, Token>,
}

pub fn handler_register_validators(ctx: Context<RegisterValidators>, count: u32) -> Result<()> {
    let keeper_nonce = ctx.accounts.keeper_state.rewards_nonce;
    let balance = ctx.accounts.asset_account.amount;

    let vault = &mut ctx.accounts.vault;
    vault.check_harvested(keeper_nonce)?;

    let withdrawable = vault.withdrawable_assets(balance)?;
    let assets = vault.register_validators(count, keeper_nonce)?;
    require!(assets <= withdrawable, VaultError::InsufficientAssets);

    transfer_from_vault(
        &ctx.accounts.token_program,
        &ctx.accounts.vault,
        &ctx.accounts.asset_account,
        ctx.accounts.deposit_escrow.to_account_info(),
        assets,
    )?;

    let vault = &ctx.accounts.vault;
    msg!(
        "Registered {} validators ({} assets), total {} at rewards nonce {}",
        count,
        assets,
        vault.validators_count,
        vault.rewards_nonce
    );

    emit!(ValidatorsRegistered {
        vault: vault.key(),
        count,
        validators_count: vault.validators_count,
        assets,
    });

    Ok(())
}
