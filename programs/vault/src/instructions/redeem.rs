// =============================================================================
// Redeem Instruction
// =============================================================================
// Burns shares for assets at the current price. Only available while the vault
// has no validators; once principal is locked, holders go through the exit
// queue instead.
//
// The payout must fit in the withdrawable assets: the liquid balance minus
// assets reserved for exit claims and for shares already queued.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount};
use keeper::constants::KEEPER_SEED;
use keeper::state::KeeperState;

use crate::constants::*;
use crate::error::VaultError;
use crate::events::Redeemed;
use crate::instructions::transfer_from_vault;
use crate::state::{Depositor, Vault};

/// Accounts required for the redeem instruction
#[derive(Accounts)]
pub struct Redeem<'info> {
    /// Share owner, must sign to burn shares; pays the stats rent if needed
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    /// Owner's statistics; shares bought on a market have no deposit record
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + Depositor::INIT_SPACE,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub depositor_stats: Account<'info, Depositor>,

    #[account(
        mut,
        seeds = [SHARE_MINT_SEED, vault.key().as_ref()],
        bump = vault.share_mint_bump
    )]
    pub share_mint: Account<'info, Mint>,

    /// Owner's share token account (source of shares to burn)
    #[account(
        mut,
        constraint = owner_share_account.mint == share_mint.key() @ VaultError::InvalidShareMint,
        constraint = owner_share_account.owner == owner.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub owner_share_account: Account<'info, TokenAccount>,

    #[account(
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump,
        seeds::program = keeper::ID
    )]
    pub keeper_state: Account<'info, KeeperState>,

    #[account(
        mut,
        seeds = [VAULT_ASSETS_SEED, vault.key().as_ref()],
        bump = vault.asset_account_bump
    )]
    pub asset_account: Account<'info, TokenAccount>,

    /// Destination of the redeemed assets
    #[account(
        mut,
        constraint = receiver_asset_account.mint == vault.asset_mint @ VaultError::InvalidAssetMint
    )]
    pub receiver_asset_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Handler for the redeem instruction
///
/// # Arguments
/// * `shares` - Number of shares to burn
/// * `min_assets_out` - Minimum assets to receive (slippage protection, 0 to skip)
pub fn handler_redeem(ctx: Context<Redeem>, shares: u64, min_assets_out: u64) -> Result<()> {
    require!(
        ctx.accounts.owner_share_account.amount >= shares,
        VaultError::InsufficientShares
    );

    let vault_key = ctx.accounts.vault.key();
    let owner = ctx.accounts.owner.key();
    let keeper_nonce = ctx.accounts.keeper_state.rewards_nonce;
    let balance = ctx.accounts.asset_account.amount;

    // =========================================================================
    // Accounting (before any token movement)
    // =========================================================================

    let vault = &mut ctx.accounts.vault;
    vault.check_harvested(keeper_nonce)?;

    let assets = vault.redeem(shares, balance)?;
    if min_assets_out > 0 {
        require!(assets >= min_assets_out, VaultError::SlippageExceeded);
    }

    let clock = Clock::get()?;
    let depositor_stats = &mut ctx.accounts.depositor_stats;
    depositor_stats.init_if_new(vault_key, owner, ctx.bumps.depositor_stats);
    depositor_stats.record_withdrawal(assets, clock.unix_timestamp)?;

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

    // =========================================================================
    // Transfer Assets: Vault -> Receiver
    // =========================================================================

    transfer_from_vault(
        &ctx.accounts.token_program,
        &ctx.accounts.vault,
        &ctx.accounts.asset_account,
        ctx.accounts.receiver_asset_account.to_account_info(),
        assets,
    )?;

    msg!("Redeemed {} shares for {} assets", shares, assets);
    msg!(
        "Vault totals: {} assets / {} shares",
        ctx.accounts.vault.total_assets,
        ctx.accounts.vault.total_shares
    );

    emit!(Redeemed {
        vault: vault_key,
        owner,
        receiver: ctx.accounts.receiver_asset_account.owner,
        assets,
        shares,
    });

    Ok(())
}
