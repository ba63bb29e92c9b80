use anchor_lang::prelude::*;

use crate::constants::{REGISTRY_SEED, REWARD_SYNC_SEED, VAULT_ENTRY_SEED};
use crate::error::KeeperError;
use crate::events::{FactoryUpdated, VaultAdded, VaultImplUpdated};
use crate::state::{Registry, RewardSync, VaultEntry, VaultKind};

// =============================================================================
// Vault Implementations and Factories (owner only)
// =============================================================================

#[derive(Accounts)]
pub struct ManageRegistry<'info> {
    #[account(
        constraint = owner.key() == registry.owner @ KeeperError::Unauthorized
    )]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,
}

pub fn handler_add_vault_impl(ctx: Context<ManageRegistry>, program_id: Pubkey) -> Result<()> {
    ctx.accounts.registry.add_vault_impl(program_id)?;

    msg!("Vault implementation approved: {}", program_id);
    emit!(VaultImplUpdated {
        program_id,
        approved: true,
    });

    Ok(())
}

pub fn handler_remove_vault_impl(ctx: Context<ManageRegistry>, program_id: Pubkey) -> Result<()> {
    ctx.accounts.registry.remove_vault_impl(&program_id)?;

    msg!("Vault implementation removed: {}", program_id);
    emit!(VaultImplUpdated {
        program_id,
        approved: false,
    });

    Ok(())
}

pub fn handler_add_factory(ctx: Context<ManageRegistry>, factory: Pubkey) -> Result<()> {
    ctx.accounts.registry.add_factory(factory)?;

    msg!("Factory approved: {}", factory);
    emit!(FactoryUpdated {
        factory,
        approved: true,
    });

    Ok(())
}

pub fn handler_remove_factory(ctx: Context<ManageRegistry>, factory: Pubkey) -> Result<()> {
    ctx.accounts.registry.remove_factory(&factory)?;

    msg!("Factory removed: {}", factory);
    emit!(FactoryUpdated {
        factory,
        approved: false,
    });

    Ok(())
}

// =============================================================================
// Add Vault
// =============================================================================
// Registers an existing vault account and opens its reward record.
// The vault account itself signs, which only its owning program can do for a
// PDA, so the kind recorded here is the one the vault program stores.
// Meta vaults pass the VaultEntry of every sub-vault as remaining accounts,
// in the same order as `sub_vaults`.

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct AddVaultParams {
    pub kind: VaultKind,
    pub sub_vaults: Vec<Pubkey>,
}

#[derive(Accounts)]
pub struct AddVault<'info> {
    /// Registry owner or an approved factory
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    /// Vault account, signed by its owning program; that program must be an
    /// approved implementation
    pub vault: Signer<'info>,

    #[account(
        init,
        payer = caller,
        space = 8 + VaultEntry::INIT_SPACE,
        seeds = [VAULT_ENTRY_SEED, vault.key().as_ref()],
        bump
    )]
    pub vault_entry: Account<'info, VaultEntry>,

    #[account(
        init,
        payer = caller,
        space = 8 + RewardSync::INIT_SPACE,
        seeds = [REWARD_SYNC_SEED, vault.key().as_ref()],
        bump
    )]
    pub reward_sync: Account<'info, RewardSync>,

    pub system_program: Program<'info, System>,
}

pub fn handler_add_vault(ctx: Context<AddVault>, params: AddVaultParams) -> Result<()> {
    let caller = ctx.accounts.caller.key();
    let vault = ctx.accounts.vault.key();
    let vault_program = *ctx.accounts.vault.owner;

    ctx.accounts
        .registry
        .register_vault(&caller, &vault_program, params.kind, &params.sub_vaults)?;

    if params.kind == VaultKind::Meta {
        require!(
            ctx.remaining_accounts.len() == params.sub_vaults.len(),
            KeeperError::InvalidSubVaults
        );
        for (info, sub_vault) in ctx.remaining_accounts.iter().zip(&params.sub_vaults) {
            let entry = load_vault_entry(info)?;
            require_keys_eq!(entry.vault, *sub_vault, KeeperError::InvalidSubVaults);
            require!(
                entry.kind == VaultKind::Standard,
                KeeperError::InvalidSubVaults
            );
        }
    }

    let vault_entry = &mut ctx.accounts.vault_entry;
    vault_entry.vault = vault;
    vault_entry.kind = params.kind;
    vault_entry.sub_vaults = params.sub_vaults;
    vault_entry.bump = ctx.bumps.vault_entry;

    let reward_sync = &mut ctx.accounts.reward_sync;
    reward_sync.vault = vault;
    reward_sync.nonce = 0;
    reward_sync.reward = 0;
    reward_sync.bump = ctx.bumps.reward_sync;

    msg!(
        "Vault added: vault={}, kind={:?}, sub_vaults={}, total_vaults={}",
        vault,
        vault_entry.kind,
        vault_entry.sub_vaults.len(),
        ctx.accounts.registry.vaults_count
    );

    emit!(VaultAdded {
        caller,
        vault,
        kind: vault_entry.kind,
        sub_vaults: vault_entry.sub_vaults.len() as u8,
    });

    Ok(())
}

fn load_vault_entry(info: &AccountInfo) -> Result<VaultEntry> {
    require_keys_eq!(*info.owner, crate::ID, KeeperError::InvalidSubVaults);
    let data = info.try_borrow_data()?;
    VaultEntry::try_deserialize(&mut &data[..])
}
