// =============================================================================
// Initialize Vault Instruction
// =============================================================================
// Creates a vault with its asset token account, its share mint and an empty
// exit queue.
//
// The creator pays a fixed security deposit. Its shares count towards
// total_shares but are never minted as tokens, so nobody can redeem them; the
// share price starts at 1:1 and cannot be skewed by a dust first deposit plus
// a donation.
//
// Share tokens use the asset's decimals, and the vault PDA is the only mint
// authority.
//
// The vault still has to be registered with the keeper (register_vault) before
// it can harvest rewards.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};
use keeper::constants::KEEPER_SEED;
use keeper::state::{KeeperState, VaultKind};

use crate::constants::*;
use crate::error::VaultError;
use crate::events::VaultInitialized;
use crate::state::{ExitQueue, Vault};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializeVaultParams {
    /// Creator-chosen id, lets one creator own several vaults
    pub vault_id: u64,
    pub kind: VaultKind,
    /// Maximum total assets (0 = unlimited)
    pub capacity: u64,
    /// Performance fee in basis points
    pub fee_percent: u16,
    pub fee_recipient: Pubkey,
    pub validators_manager: Pubkey,
    /// Minimum seconds between exit queue checkpoints (None = 12h)
    pub exit_queue_update_delay: Option<i64>,
}

/// Accounts required for the initialize_vault instruction
#[derive(Accounts)]
#[instruction(params: InitializeVaultParams)]
pub struct InitializeVault<'info> {
    // =========================================================================
    // Signers
    // =========================================================================

    /// Creator and first admin, pays rent and the security deposit
    #[account(mut)]
    pub creator: Signer<'info>,

    // =========================================================================
    // Vault Accounts (PDAs created by this instruction)
    // =========================================================================

    #[account(
        init,
        payer = creator,
        space = 8 + Vault::INIT_SPACE,
        seeds = [VAULT_SEED, creator.key().as_ref(), &params.vault_id.to_le_bytes()],
        bump
    )]
    pub vault: Account<'info, Vault>,

    /// Checkpoint ledger, header only until the queue first advances
    #[account(
        init,
        payer = creator,
        space = ExitQueue::space(0),
        seeds = [EXIT_QUEUE_SEED, vault.key().as_ref()],
        bump
    )]
    pub exit_queue: AccountLoader<'info, ExitQueue>,

    /// Liquid assets of the vault (PDA-owned)
    #[account(
        init,
        payer = creator,
        token::mint = asset_mint,
        token::authority = vault,
        seeds = [VAULT_ASSETS_SEED, vault.key().as_ref()],
        bump
    )]
    pub asset_account: Account<'info, TokenAccount>,

    // =========================================================================
    // Tokens
    // =========================================================================

    pub asset_mint: Account<'info, Mint>,

    /// Vault share token, minted on deposits and fees
    #[account(
        init,
        payer = creator,
        mint::decimals = asset_mint.decimals,
        mint::authority = vault,
        seeds = [SHARE_MINT_SEED, vault.key().as_ref()],
        bump
    )]
    pub share_mint: Account<'info, Mint>,

    /// Creator's asset account paying the security deposit
    #[account(
        mut,
        constraint = creator_asset_account.mint == asset_mint.key() @ VaultError::InvalidAssetMint,
        constraint = creator_asset_account.owner == creator.key() @ VaultError::InvalidTokenAccountOwner
    )]
    pub creator_asset_account: Account<'info, TokenAccount>,

    /// Receives validator principal on registration
    #[account(
        constraint = deposit_escrow.mint == asset_mint.key() @ VaultError::InvalidAssetMint
    )]
    pub deposit_escrow: Account<'info, TokenAccount>,

    // =========================================================================
    // Keeper
    // =========================================================================

    #[account(
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump,
        seeds::program = keeper::ID
    )]
    pub keeper_state: Account<'info, KeeperState>,

    // =========================================================================
    // Programs
    // =========================================================================

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handler_initialize_vault(
    ctx: Context<InitializeVault>,
    params: InitializeVaultParams,
) -> Result<()> {
    // =========================================================================
    // Validate configuration
    // =========================================================================

    Vault::validate_fee_percent(params.fee_percent)?;
    require_keys_neq!(
        params.fee_recipient,
        Pubkey::default(),
        VaultError::InvalidAddress
    );
    require_keys_neq!(
        params.validators_manager,
        Pubkey::default(),
        VaultError::InvalidAddress
    );
    let exit_queue_update_delay = params
        .exit_queue_update_delay
        .unwrap_or(DEFAULT_EXIT_QUEUE_UPDATE_DELAY);
    Vault::validate_exit_queue_update_delay(exit_queue_update_delay)?;

    // =========================================================================
    // Store configuration
    // =========================================================================

    let vault_key = ctx.accounts.vault.key();

    {
        let mut exit_queue = ctx.accounts.exit_queue.load_init()?;
        exit_queue.vault = vault_key;
        exit_queue.bump = ctx.bumps.exit_queue;
    }

    let vault = &mut ctx.accounts.vault;

    vault.version = VAULT_VERSION;
    vault.creator = ctx.accounts.creator.key();
    vault.vault_id = params.vault_id;
    vault.admin = ctx.accounts.creator.key();
    vault.validators_manager = params.validators_manager;
    vault.fee_recipient = params.fee_recipient;
    vault.fee_percent = params.fee_percent;
    vault.kind = params.kind;
    vault.asset_mint = ctx.accounts.asset_mint.key();
    vault.asset_account = ctx.accounts.asset_account.key();
    vault.share_mint = ctx.accounts.share_mint.key();
    vault.deposit_escrow = ctx.accounts.deposit_escrow.key();
    vault.capacity = Vault::normalize_capacity(params.capacity);
    vault.exit_queue_update_delay = exit_queue_update_delay;
    vault.last_exit_queue_update = 0;
    vault.exited_tickets = 0;

    // meta vaults are collateralized from the start
    vault.rewards_nonce = match params.kind {
        VaultKind::Meta => ctx.accounts.keeper_state.rewards_nonce,
        VaultKind::Standard => 0,
    };

    vault.bump = ctx.bumps.vault;
    vault.asset_account_bump = ctx.bumps.asset_account;
    vault.share_mint_bump = ctx.bumps.share_mint;
    vault.exit_queue_bump = ctx.bumps.exit_queue;

    // =========================================================================
    // Security deposit: counted in total_shares, never minted
    // =========================================================================

    let shares = vault.deposit(SECURITY_DEPOSIT)?;

    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.creator_asset_account.to_account_info(),
            to: ctx.accounts.asset_account.to_account_info(),
            authority: ctx.accounts.creator.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, SECURITY_DEPOSIT)?;

    msg!("Vault initialized: {}", vault_key);
    msg!("Kind: {:?}, asset mint: {}", vault.kind, vault.asset_mint);
    msg!("Share mint: {}", vault.share_mint);
    msg!(
        "Capacity: {}, fee: {} bps, security deposit: {} assets / {} shares",
        vault.capacity,
        vault.fee_percent,
        SECURITY_DEPOSIT,
        shares
    );

    emit!(VaultInitialized {
        vault: vault_key,
        admin: vault.admin,
        kind: vault.kind,
        asset_mint: vault.asset_mint,
        share_mint: vault.share_mint,
        capacity: vault.capacity,
        fee_percent: vault.fee_percent,
        security_deposit: SECURITY_DEPOSIT,
    });

    Ok(())
}
