// =============================================================================
// Register Vault Instruction
// =============================================================================
// Registers the vault with the keeper so it can harvest rewards.
//
// The keeper only accepts a registration signed by the vault account itself.
// This program signs for the vault PDA and always passes the kind stored on
// the vault, so a standard vault can never be recorded as a meta vault (or the
// other way around). The caller must still be the registry owner or an
// approved factory; the keeper checks that.
//
// Meta vaults pass the keeper VaultEntry of every sub-vault as remaining
// accounts, in the same order as `sub_vaults`.
// =============================================================================

use anchor_lang::prelude::*;
use keeper::program::Keeper;

use crate::constants::*;
use crate::events::VaultRegistered;
use crate::state::Vault;

#[derive(Accounts)]
pub struct RegisterVault<'info> {
    /// Registry owner or approved factory; pays for the keeper records
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    // =========================================================================
    // Keeper Accounts (validated and created by the keeper program)
    // =========================================================================

    /// CHECK: Keeper registry PDA
    #[account(mut)]
    pub registry: UncheckedAccount<'info>,

    /// CHECK: Keeper VaultEntry PDA for this vault, created by the keeper
    #[account(mut)]
    pub vault_entry: UncheckedAccount<'info>,

    /// CHECK: Keeper RewardSync PDA for this vault, created by the keeper
    #[account(mut)]
    pub reward_sync: UncheckedAccount<'info>,

    pub keeper_program: Program<'info, Keeper>,
    pub system_program: Program<'info, System>,
}

pub fn handler_register_vault<'info>(
    ctx: Context<'_, '_, '_, 'info, RegisterVault<'info>>,
    sub_vaults: Vec<Pubkey>,
) -> Result<()> {
    let vault = &ctx.accounts.vault;
    let params = vault.keeper_registration(sub_vaults)?;
    let kind = params.kind;
    let sub_vaults_count = params.sub_vaults.len() as u8;

    let vault_id = vault.vault_id.to_le_bytes();
    let vault_seeds = &[
        VAULT_SEED,
        vault.creator.as_ref(),
        vault_id.as_ref(),
        &[vault.bump],
    ];
    let signer_seeds = &[&vault_seeds[..]];

    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.keeper_program.to_account_info(),
        keeper::cpi::accounts::AddVault {
            caller: ctx.accounts.caller.to_account_info(),
            registry: ctx.accounts.registry.to_account_info(),
            vault: vault.to_account_info(),
            vault_entry: ctx.accounts.vault_entry.to_account_info(),
            reward_sync: ctx.accounts.reward_sync.to_account_info(),
            system_program: ctx.accounts.system_program.to_account_info(),
        },
        signer_seeds,
    )
    .with_remaining_accounts(ctx.remaining_accounts.to_vec());
    keeper::cpi::add_vault(cpi_ctx, params)?;

    msg!(
        "Vault {} registered with the keeper as {:?}, {} sub-vaults",
        vault.key(),
        kind,
        sub_vaults_count
    );

    emit!(VaultRegistered {
        vault: vault.key(),
        caller: ctx.accounts.caller.key(),
        kind,
        sub_vaults: sub_vaults_count,
    });

    Ok(())
}
