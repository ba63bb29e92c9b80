// =============================================================================
// Enter Exit Queue Instruction
// =============================================================================
// Locks shares of a collateralized vault until validator withdrawals bring
// enough liquidity back. No assets move here. The share tokens are burned from
// the owner right away, but the shares stay in total_shares until update_state
// appends a checkpoint that retires them.
//
// The position ticket is the cumulative ticket count at entry:
//   ticket = tickets exited so far (latest checkpoint) + queued_shares
// and seeds the ExitRequest address together with the receiver.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount};
use keeper::constants::KEEPER_SEED;
use keeper::state::KeeperState;

use crate::constants::*;
use crate::error::VaultError;
use crate::events::ExitQueueEntered;
use crate::state::{ExitRequest, Vault};

#[derive(Accounts)]
pub struct EnterExitQueue<'info> {
    /// Share owner, pays the exit request rent
    #[account(mut)]
    pub owner: Signer<'info>,

    /// CHECK: Wallet that will claim the exited assets
    #[account(
        constraint = receiver.key() != Pubkey::default() @ VaultError::InvalidAddress
    )]
    pub receiver: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [SHARE_MINT_SEED, vault.key().as_ref()],
        bump = vault.share_mint_bump
    )]
    pub share_mint: Account<'info, Mint>,

    /// Owner's share token account (source of the queued shares)
    #[account(
        mut,
        constraint = owner_share_account.mint == share_mint.key() @ VaultError::InvalidShareMint,
        constraint = owner_share_account.owner == owner.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub owner_share_account: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = owner,
        space = 8 + ExitRequest::INIT_SPACE,
        seeds = [
            EXIT_REQUEST_SEED,
            vault.key().as_ref(),
            receiver.key().as_ref(),
            &vault.next_exit_ticket().to_le_bytes()
        ],
        bump
    )]
    pub exit_request: Account<'info, ExitRequest>,

    #[account(
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump,
        seeds::program = keeper::ID
    )]
    pub keeper_state: Account<'info, KeeperState>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Returns the position ticket
pub fn handler_enter_exit_queue(ctx: Context<EnterExitQueue>, shares: u64) -> Result<u128> {
    require!(
        ctx.accounts.owner_share_account.amount >= shares,
        VaultError::InsufficientShares
    );

    let keeper_nonce = ctx.accounts.keeper_state.rewards_nonce;
    let clock = Clock::get()?;

    let vault = &mut ctx.accounts.vault;
    vault.check_harvested(keeper_nonce)?;
    let position_ticket = vault.enter_exit_queue(shares)?;

    // =========================================================================
    // Burn Share Tokens from Owner
    // =========================================================================

    let burn_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Burn {
            mint: ctx.accounts.share_mint.to_account_info(),
            from: ctx.accounts.owner_share_account.to_account_info(),
            authority: ctx.accounts.owner.to_account_info(),
        },
    );
    token::burn(burn_ctx, shares)?;

    let vault = &ctx.accounts.vault;

    let exit_request = &mut ctx.accounts.exit_request;
    exit_request.vault = vault.key();
    exit_request.owner = ctx.accounts.owner.key();
    exit_request.receiver = ctx.accounts.receiver.key();
    exit_request.entry_ticket = position_ticket;
    exit_request.position_ticket = position_ticket;
    exit_request.shares = shares;
    exit_request.timestamp = clock.unix_timestamp;
    exit_request.bump = ctx.bumps.exit_request;

    msg!(
        "Entered exit queue: {} shares at ticket {}, queued total {}",
        shares,
        position_ticket,
        vault.queued_shares
    );

    emit!(ExitQueueEntered {
        vault: vault.key(),
        owner: exit_request.owner,
        receiver: exit_request.receiver,
        position_ticket,
        shares,
    });

    Ok(position_ticket)
}
