// =============================================================================
// View Instructions
// =============================================================================
// Read-only queries returning data to the caller (simulate the transaction
// and read the return value). Nothing is written.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::{Checkpoints, ExitQueue, ExitedAssets, Rounding, Vault};

#[derive(Accounts)]
pub struct VaultView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,
}

#[derive(Accounts)]
pub struct ExitQueueView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [EXIT_QUEUE_SEED, vault.key().as_ref()],
        bump = vault.exit_queue_bump
    )]
    pub exit_queue: AccountLoader<'info, ExitQueue>,
}

pub fn handler_convert_to_shares(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
    ctx.accounts.vault.convert_to_shares(assets, Rounding::Down)
}

pub fn handler_convert_to_assets(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
    ctx.accounts.vault.convert_to_assets(shares, Rounding::Down)
}

/// Checkpoint covering `position_ticket`, or -1 while it is unresolved
pub fn handler_get_checkpoint_index(
    ctx: Context<ExitQueueView>,
    position_ticket: u128,
) -> Result<i64> {
    let exit_queue_info = ctx.accounts.exit_queue.to_account_info();
    let data = exit_queue_info.try_borrow_data()?;
    let checkpoints = Checkpoints::from_account_data(&data)?;

    Ok(checkpoints
        .checkpoint_index(position_ticket)
        .map_or(-1, |idx| idx as i64))
}

pub fn handler_calculate_exited_assets(
    ctx: Context<ExitQueueView>,
    position_ticket: u128,
    shares: u64,
    checkpoint_index: u64,
) -> Result<ExitedAssets> {
    let exit_queue_info = ctx.accounts.exit_queue.to_account_info();
    let data = exit_queue_info.try_borrow_data()?;
    let checkpoints = Checkpoints::from_account_data(&data)?;

    checkpoints.calculate_exited_assets(position_ticket, shares, checkpoint_index as usize)
}
