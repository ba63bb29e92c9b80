// =============================================================================
// Deposit Instruction
// =============================================================================
// Deposits assets and mints share tokens to a receiver.
//
// Flow:
// 1. Vault must not be two or more reward rounds behind the keeper
// 2. Shares = assets * total_shares / total_assets, rounded down
// 3. Total assets after the deposit must stay within capacity
// 4. Assets move from the caller to the vault
// 5. Share tokens are minted to the receiver's share account (vault PDA signs)
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};
use keeper::constants::KEEPER_SEED;
use keeper::state::KeeperState;

use crate::constants::*;
use crate::error::VaultError;
use crate::events::Deposited;
use crate::instructions::mint_shares;
use crate::state::{Depositor, Vault};

/// Accounts required for the deposit instruction
#[derive(Accounts)]
pub struct Deposit<'info> {
    // =========================================================================
    // Signers
    // =========================================================================

    /// Pays the assets and the depositor stats rent
    #[account(mut)]
    pub depositor: Signer<'info>,

    /// CHECK: Any wallet can receive shares
    pub receiver: UncheckedAccount<'info>,

    // =========================================================================
    // Vault Accounts
    // =========================================================================

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    /// Receiver's statistics, created on first deposit
    #[account(
        init_if_needed,
        payer = depositor,
        space = 8 + Depositor::INIT_SPACE,
        seeds = [DEPOSITOR_SEED, vault.key().as_ref(), receiver.key().as_ref()],
        bump
    )]
    pub depositor_stats: Account<'info, Depositor>,

    #[account(
        mut,
        seeds = [SHARE_MINT_SEED, vault.key().as_ref()],
        bump = vault.share_mint_bump
    )]
    pub share_mint: Account<'info, Mint>,

    #[account(
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump,
        seeds::program = keeper::ID
    )]
    pub keeper_state: Account<'info, KeeperState>,

    // =========================================================================
    // Token Accounts
    // =========================================================================

    /// Depositor's asset account (source of funds)
    #[account(
        mut,
        constraint = depositor_asset_account.mint == vault.asset_mint @ VaultError::InvalidAssetMint,
        constraint = depositor_asset_account.owner == depositor.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub depositor_asset_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [VAULT_ASSETS_SEED, vault.key().as_ref()],
        bump = vault.asset_account_bump
    )]
    pub asset_account: Account<'info, TokenAccount>,

    /// Receiver's share token account (destination for minted shares)
    #[account(
        mut,
        constraint = receiver_share_account.mint == share_mint.key() @ VaultError::InvalidShareMint,
        constraint = receiver_share_account.owner == receiver.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub receiver_share_account: Account<'info, TokenAccount>,

    // =========================================================================
    // Programs
    // =========================================================================

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Handler for the deposit instruction
///
/// # Arguments
/// * `assets` - Amount of assets to deposit (in base units)
/// * `min_shares_out` - Minimum shares to receive (slippage protection, 0 to skip)
pub fn handler_deposit(ctx: Context<Deposit>, assets: u64, min_shares_out: u64) -> Result<()> {
    require!(
        ctx.accounts.depositor_asset_account.amount >= assets,
        VaultError::InsufficientAssets
    );

    let vault_key = ctx.accounts.vault.key();
    let receiver = ctx.accounts.receiver.key();
    let keeper_nonce = ctx.accounts.keeper_state.rewards_nonce;

    // =========================================================================
    // Accounting (before any token movement)
    // =========================================================================

    let vault = &mut ctx.accounts.vault;
    vault.check_harvested(keeper_nonce)?;

    let shares = vault.deposit(assets)?;
    if min_shares_out > 0 {
        require!(shares >= min_shares_out, VaultError::SlippageExceeded);
    }

    let clock = Clock::get()?;
    let depositor_stats = &mut ctx.accounts.depositor_stats;
    depositor_stats.init_if_new(vault_key, receiver, ctx.bumps.depositor_stats);
    depositor_stats.record_deposit(assets, shares, clock.unix_timestamp)?;

    // =========================================================================
    // Transfer Assets: Depositor -> Vault
    // =========================================================================

    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.depositor_asset_account.to_account_info(),
            to: ctx.accounts.asset_account.to_account_info(),
            authority: ctx.accounts.depositor.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, assets)?;

    // =========================================================================
    // Mint Share Tokens to Receiver
    // =========================================================================

    mint_shares(
        &ctx.accounts.token_program,
        &ctx.accounts.vault,
        &ctx.accounts.share_mint,
        ctx.accounts.receiver_share_account.to_account_info(),
        shares,
    )?;

    msg!("Deposited {} assets for {} shares", assets, shares);
    msg!(
        "Vault totals: {} assets / {} shares",
        ctx.accounts.vault.total_assets,
        ctx.accounts.vault.total_shares
    );

    emit!(Deposited {
        vault: vault_key,
        caller: ctx.accounts.depositor.key(),
        receiver,
        assets,
        shares,
    });

    Ok(())
}
