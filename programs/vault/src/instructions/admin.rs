// =============================================================================
// Admin Instructions
// =============================================================================
// Configuration changes that only the vault admin can make.
//
// Fee settings decide how the next profit is split, so they require the vault
// to be harvested first: rewards earned under the old settings are never
// charged under the new ones.
// =============================================================================

use anchor_lang::prelude::*;
use keeper::constants::KEEPER_SEED;
use keeper::state::KeeperState;

use crate::constants::*;
use crate::error::VaultError;
use crate::events::{
    AdminTransferred, FeePercentUpdated, FeeRecipientUpdated, ValidatorsManagerUpdated,
};
use crate::state::Vault;

// =============================================================================
// Fee Settings
// =============================================================================

/// Accounts required for set_fee_recipient and set_fee_percent
#[derive(Accounts)]
pub struct UpdateFeeConfig<'info> {
    #[account(
        constraint = admin.key() == vault.admin @ VaultError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump,
        seeds::program = keeper::ID
    )]
    pub keeper_state: Account<'info, KeeperState>,
}

pub fn handler_set_fee_recipient(
    ctx: Context<UpdateFeeConfig>,
    fee_recipient: Pubkey,
) -> Result<()> {
    require!(
        fee_recipient != Pubkey::default(),
        VaultError::InvalidAddress
    );

    let vault = &mut ctx.accounts.vault;
    vault.check_harvested(ctx.accounts.keeper_state.rewards_nonce)?;
    vault.fee_recipient = fee_recipient;

    msg!("Fee recipient set to {}", fee_recipient);

    emit!(FeeRecipientUpdated {
        vault: vault.key(),
        fee_recipient,
    });

    Ok(())
}

pub fn handler_set_fee_percent(ctx: Context<UpdateFeeConfig>, fee_percent: u16) -> Result<()> {
    Vault::validate_fee_percent(fee_percent)?;

    let vault = &mut ctx.accounts.vault;
    vault.check_harvested(ctx.accounts.keeper_state.rewards_nonce)?;
    vault.fee_percent = fee_percent;

    msg!(
        "Fee percent set to {} bps ({}%)",
        fee_percent,
        fee_percent as u64 * 100 / BPS_DENOMINATOR
    );

    emit!(FeePercentUpdated {
        vault: vault.key(),
        fee_percent,
    });

    Ok(())
}

// =============================================================================
// Roles
// =============================================================================

/// Accounts required for set_validators_manager and transfer_admin
#[derive(Accounts)]
pub struct UpdateVaultRole<'info> {
    #[account(
        constraint = admin.key() == vault.admin @ VaultError::Unauthorized
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,
}

pub fn handler_set_validators_manager(
    ctx: Context<UpdateVaultRole>,
    validators_manager: Pubkey,
) -> Result<()> {
    require!(
        validators_manager != Pubkey::default(),
        VaultError::InvalidAddress
    );

    let vault = &mut ctx.accounts.vault;
    vault.validators_manager = validators_manager;

    msg!("Validators manager set to {}", validators_manager);

    emit!(ValidatorsManagerUpdated {
        vault: vault.key(),
        validators_manager,
    });

    Ok(())
}

/// Hands the admin role to `new_admin` in one step
pub fn handler_transfer_admin(ctx: Context<UpdateVaultRole>, new_admin: Pubkey) -> Result<()> {
    require!(new_admin != Pubkey::default(), VaultError::InvalidAddress);

    let vault = &mut ctx.accounts.vault;
    let previous_admin = vault.admin;
    vault.admin = new_admin;

    msg!("Admin transferred: {} -> {}", previous_admin, new_admin);

    emit!(AdminTransferred {
        vault: vault.key(),
        previous_admin,
        new_admin,
    });

    Ok(())
}
