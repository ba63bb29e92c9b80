// =============================================================================
// Claim Exited Assets Instruction
// =============================================================================
// Pays out the part of an exit request that checkpoints have resolved.
//
// The caller supplies the checkpoint index covering the request's position
// ticket (see get_checkpoint_index). A partial claim rewrites the request with
// the advanced ticket and the remaining shares; a full claim closes it.
// Nothing resolved yet is not an error, the call just returns zeros.
//
// Checkpoints are read straight from the exit queue account data, so the
// cost of a claim does not depend on how long the ledger has grown. Paid out
// assets are added to the receiver's withdrawal statistics.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::VaultError;
use crate::events::ExitedAssetsClaimed;
use crate::instructions::transfer_from_vault;
use crate::state::{Checkpoints, ClaimOutcome, Depositor, ExitQueue, ExitRequest, Vault};

/// Returned to the caller
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClaimResult {
    /// Ticket the remaining shares continue from (0 when closed)
    pub new_position_ticket: u128,
    pub claimed_shares: u64,
    pub claimed_assets: u64,
}

#[derive(Accounts)]
pub struct ClaimExitedAssets<'info> {
    /// Request receiver; collects the assets and the rent of a closed request
    #[account(mut)]
    pub receiver: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [EXIT_QUEUE_SEED, vault.key().as_ref()],
        bump = vault.exit_queue_bump
    )]
    pub exit_queue: AccountLoader<'info, ExitQueue>,

    #[account(
        mut,
        seeds = [
            EXIT_REQUEST_SEED,
            vault.key().as_ref(),
            receiver.key().as_ref(),
            &exit_request.entry_ticket.to_le_bytes()
        ],
        bump = exit_request.bump,
        constraint = exit_request.receiver == receiver.key() @ VaultError::Unauthorized
    )]
    pub exit_request: Account<'info, ExitRequest>,

    /// Receiver's statistics, created on the first payout if needed
    #[account(
        init_if_needed,
        payer = receiver,
        space = 8 + Depositor::INIT_SPACE,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), receiver.key().as_ref()],
        bump
    )]
    pub receiver_stats: Account<'info, Depositor>,

    #[account(
        mut,
        seeds = [VAULT_ASSETS_SEED, vault.key().as_ref()],
        bump = vault.asset_account_bump
    )]
    pub asset_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = receiver_asset_account.mint == vault.asset_mint @ VaultError::InvalidAssetMint,
        constraint = receiver_asset_account.owner == receiver.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub receiver_asset_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handler_claim_exited_assets(
    ctx: Context<ClaimExitedAssets>,
    checkpoint_index: u64,
) -> Result<ClaimResult> {
    let clock = Clock::get()?;
    let exit_request = &mut ctx.accounts.exit_request;
    require!(
        exit_request.can_claim(clock.unix_timestamp),
        VaultError::ClaimTooEarly
    );

    let prev_position_ticket = exit_request.position_ticket;
    let exited = {
        let exit_queue_info = ctx.accounts.exit_queue.to_account_info();
        let data = exit_queue_info.try_borrow_data()?;
        let checkpoints = Checkpoints::from_account_data(&data)?;
        checkpoints.calculate_exited_assets(
            prev_position_ticket,
            exit_request.shares,
            checkpoint_index as usize,
        )?
    };

    // =========================================================================
    // Accounting (before any token movement)
    // =========================================================================

    let outcome = exit_request.settle(&exited)?;
    let new_position_ticket = match outcome {
        ClaimOutcome::Pending => {
            msg!("Nothing to claim yet at ticket {}", prev_position_ticket);
            return Ok(ClaimResult {
                new_position_ticket: prev_position_ticket,
                ..Default::default()
            });
        }
        ClaimOutcome::Partial { position_ticket } => position_ticket,
        ClaimOutcome::Completed => 0,
    };

    ctx.accounts.vault.release_unclaimed(exited.exited_assets)?;

    let vault_key = ctx.accounts.vault.key();
    let receiver = ctx.accounts.receiver.key();
    let receiver_stats = &mut ctx.accounts.receiver_stats;
    receiver_stats.init_if_new(vault_key, receiver, ctx.bumps.receiver_stats);
    receiver_stats.record_withdrawal(exited.exited_assets, clock.unix_timestamp)?;

    // =========================================================================
    // Transfer Assets: Vault -> Receiver
    // =========================================================================

    transfer_from_vault(
        &ctx.accounts.token_program,
        &ctx.accounts.vault,
        &ctx.accounts.asset_account,
        ctx.accounts.receiver_asset_account.to_account_info(),
        exited.exited_assets,
    )?;

    if outcome == ClaimOutcome::Completed {
        ctx.accounts
            .exit_request
            .close(ctx.accounts.receiver.to_account_info())?;
    }

    msg!(
        "Claimed {} shares for {} assets, unclaimed left {}",
        exited.burned_shares,
        exited.exited_assets,
        ctx.accounts.vault.unclaimed_assets
    );

    emit!(ExitedAssetsClaimed {
        vault: vault_key,
        receiver,
        prev_position_ticket,
        new_position_ticket,
        claimed_shares: exited.burned_shares,
        claimed_assets: exited.exited_assets,
    });

    Ok(ClaimResult {
        new_position_ticket,
        claimed_shares: exited.burned_shares,
        claimed_assets: exited.exited_assets,
    })
}
