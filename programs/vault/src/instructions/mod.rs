// =============================================================================
// Instructions Module - Vault
// =============================================================================

pub mod admin;
pub mod claim_exited_assets;
pub mod deposit;
pub mod enter_exit_queue;
pub mod initialize_vault;
pub mod redeem;
pub mod register_validators;
pub mod register_vault;
pub mod update_state;
pub mod views;

pub use admin::*;
pub use claim_exited_assets::*;
pub use deposit::*;
pub use enter_exit_queue::*;
pub use initialize_vault::*;
pub use redeem::*;
pub use register_validators::*;
pub use register_vault::*;
pub use update_state::*;
pub use views::*;

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::constants::VAULT_SEED;
use crate::state::Vault;

/// Moves `amount` assets out of the vault's token account, signed by the
/// vault PDA
pub(crate) fn transfer_from_vault<'info>(
    token_program: &Program<'info, Token>,
    vault: &Account<'info, Vault>,
    asset_account: &Account<'info, TokenAccount>,
    to: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let vault_id = vault.vault_id.to_le_bytes();
    let vault_seeds = &[
        VAULT_SEED,
        vault.creator.as_ref(),
        vault_id.as_ref(),
        &[vault.bump],
    ];
    let signer_seeds = &[&vault_seeds[..]];

    let transfer_ctx = CpiContext::new_with_signer(
        token_program.to_account_info(),
        Transfer {
            from: asset_account.to_account_info(),
            to,
            authority: vault.to_account_info(),
        },
        signer_seeds,
    );

    token::transfer(transfer_ctx, amount)
}

/// Mints `shares` vault share tokens to `to`, signed by the vault PDA
pub(crate) fn mint_shares<'info>(
    token_program: &Program<'info, Token>,
    vault: &Account<'info, Vault>,
    share_mint: &Account<'info, Mint>,
    to: AccountInfo<'info>,
    shares: u64,
) -> Result<()> {
    if shares == 0 {
        return Ok(());
    }

    let vault_id = vault.vault_id.to_le_bytes();
    let vault_seeds = &[
        VAULT_SEED,
        vault.creator.as_ref(),
        vault_id.as_ref(),
        &[vault.bump],
    ];
    let signer_seeds = &[&vault_seeds[..]];

    let mint_ctx = CpiContext::new_with_signer(
        token_program.to_account_info(),
        MintTo {
            mint: share_mint.to_account_info(),
            to,
            authority: vault.to_account_info(),
        },
        signer_seeds,
    );

    token::mint_to(mint_ctx, shares)
}
