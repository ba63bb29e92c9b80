use anchor_lang::prelude::*;

use crate::constants::{KEEPER_SEED, REWARD_SYNC_SEED, VAULT_ENTRY_SEED};
use crate::error::KeeperError;
use crate::events::Harvested;
use crate::merkle::NodeHash;
use crate::state::{check_sub_vaults_synced, HarvestResult, KeeperState, RewardSync, VaultEntry, VaultKind};

// =============================================================================
// Harvest
// =============================================================================
// Called by a registered vault (its PDA signs through CPI) to pull the reward
// published for it in the current or previous round. The result is handed back
// as return data.

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct HarvestParams {
    /// Cumulative reward of the vault in the round being claimed
    pub reward: i64,
    /// Merkle proof of `(vault, reward)`
    pub proof: Vec<NodeHash>,
}

#[derive(Accounts)]
pub struct Harvest<'info> {
    pub vault: Signer<'info>,

    #[account(
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump
    )]
    pub keeper_state: Account<'info, KeeperState>,

    #[account(
        seeds = [VAULT_ENTRY_SEED, vault.key().as_ref()],
        bump = vault_entry.bump,
        constraint = vault_entry.kind == VaultKind::Standard @ KeeperError::InvalidVaultKind
    )]
    pub vault_entry: Account<'info, VaultEntry>,

    #[account(
        mut,
        seeds = [REWARD_SYNC_SEED, vault.key().as_ref()],
        bump = reward_sync.bump
    )]
    pub reward_sync: Account<'info, RewardSync>,
}

pub fn handler_harvest(ctx: Context<Harvest>, params: HarvestParams) -> Result<HarvestResult> {
    let vault = ctx.accounts.vault.key();
    let (nonce, rewards_root) =
        ctx.accounts
            .keeper_state
            .resolve_round(&vault, params.reward, &params.proof)?;

    let result = ctx.accounts.reward_sync.apply(nonce, params.reward)?;
    log_harvest(&vault, rewards_root, &result);

    Ok(result)
}

// =============================================================================
// Harvest Meta Vault
// =============================================================================
// A meta vault proves its own cumulative reward against the rewards root, the
// same way a standard vault does. On top of that, every sub-vault must already
// have harvested the same round, so the meta vault never books a round whose
// sub-vault rewards are still missing. The RewardSync record of every
// sub-vault is passed as a remaining account, in registration order.

#[derive(Accounts)]
pub struct HarvestMetaVault<'info> {
    pub vault: Signer<'info>,

    #[account(
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump
    )]
    pub keeper_state: Account<'info, KeeperState>,

    #[account(
        seeds = [VAULT_ENTRY_SEED, vault.key().as_ref()],
        bump = vault_entry.bump,
        constraint = vault_entry.kind == VaultKind::Meta @ KeeperError::InvalidVaultKind
    )]
    pub vault_entry: Account<'info, VaultEntry>,

    #[account(
        mut,
        seeds = [REWARD_SYNC_SEED, vault.key().as_ref()],
        bump = reward_sync.bump
    )]
    pub reward_sync: Account<'info, RewardSync>,
}

pub fn handler_harvest_meta_vault(
    ctx: Context<HarvestMetaVault>,
    params: HarvestParams,
) -> Result<HarvestResult> {
    let vault = ctx.accounts.vault.key();
    let (nonce, rewards_root) =
        ctx.accounts
            .keeper_state
            .resolve_round(&vault, params.reward, &params.proof)?;

    let sub_vaults = &ctx.accounts.vault_entry.sub_vaults;
    require!(
        ctx.remaining_accounts.len() == sub_vaults.len(),
        KeeperError::InvalidSubVaults
    );

    let mut records = Vec::with_capacity(sub_vaults.len());
    for (info, sub_vault) in ctx.remaining_accounts.iter().zip(sub_vaults) {
        let record = load_reward_sync(info)?;
        require_keys_eq!(record.vault, *sub_vault, KeeperError::InvalidSubVaults);
        records.push(record);
    }
    check_sub_vaults_synced(&records, nonce)?;

    let result = ctx.accounts.reward_sync.apply(nonce, params.reward)?;
    log_harvest(&vault, rewards_root, &result);

    Ok(result)
}

fn load_reward_sync(info: &AccountInfo) -> Result<RewardSync> {
    require_keys_eq!(*info.owner, crate::ID, KeeperError::InvalidSubVaults);
    let data = info.try_borrow_data()?;
    RewardSync::try_deserialize(&mut &data[..])
}

fn log_harvest(vault: &Pubkey, rewards_root: [u8; 32], result: &HarvestResult) {
    if !result.harvested {
        msg!("Vault {} already synced to nonce {}", vault, result.nonce);
        return;
    }

    msg!(
        "Harvested: vault={}, assets_delta={}, nonce={}",
        vault,
        result.assets_delta,
        result.nonce
    );

    emit!(Harvested {
        vault: *vault,
        rewards_root,
        assets_delta: result.assets_delta,
        nonce: result.nonce,
    });
}

// =============================================================================
// Views
// =============================================================================

#[derive(Accounts)]
pub struct RewardsStatus<'info> {
    /// CHECK: Only used to derive the reward record address
    pub vault: UncheckedAccount<'info>,

    #[account(
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump
    )]
    pub keeper_state: Account<'info, KeeperState>,

    #[account(
        seeds = [REWARD_SYNC_SEED, vault.key().as_ref()],
        bump = reward_sync.bump
    )]
    pub reward_sync: Account<'info, RewardSync>,
}

pub fn handler_is_harvest_required(ctx: Context<RewardsStatus>) -> Result<bool> {
    Ok(ctx
        .accounts
        .keeper_state
        .is_harvest_required(ctx.accounts.reward_sync.nonce))
}

pub fn handler_can_harvest(ctx: Context<RewardsStatus>) -> Result<bool> {
    Ok(ctx
        .accounts
        .keeper_state
        .can_harvest(ctx.accounts.reward_sync.nonce))
}
