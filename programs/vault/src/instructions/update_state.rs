// =============================================================================
// Update State Instruction
// =============================================================================
// Permissionless state sync, safe to call repeatedly:
// 1. Harvest the vault's reward from the keeper (CPI, signed by the vault PDA)
//    - every vault proves its own reward against the oracle Merkle root
//    - meta vaults also require all sub-vaults harvested on the same round
// 2. Apply the asset delta; profits mint fee share tokens to the fee recipient
// 3. Advance the exit queue with whatever liquidity is available, appending
//    one checkpoint to the end of the exit queue account
//
// A second call in the same round finds nothing to harvest and nothing new to
// release, and leaves the vault unchanged.
// =============================================================================

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::token::{Mint, Token, TokenAccount};
use keeper::constants::KEEPER_SEED;
use keeper::instructions::HarvestParams;
use keeper::program::Keeper;
use keeper::state::{HarvestResult, KeeperState, VaultKind};

use crate::constants::*;
use crate::error::VaultError;
use crate::events::{CheckpointCreated, FeeSharesMinted, StateUpdated};
use crate::instructions::mint_shares;
use crate::state::{Checkpoint, Checkpoints, ExitQueue, Vault};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct UpdateStateParams {
    /// The vault's reward and Merkle proof from the published rewards tree.
    /// May be skipped only while the vault is not stale.
    pub harvest: Option<HarvestParams>,
}

/// Accounts required for update_state.
///
/// Meta vaults pass the keeper RewardSync account of every sub-vault as
/// remaining accounts, in registration order.
#[derive(Accounts)]
pub struct UpdateState<'info> {
    /// Anyone; pays for exit queue growth
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.creator.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        mut,
        seeds = [EXIT_QUEUE_SEED, vault.key().as_ref()],
        bump = vault.exit_queue_bump
    )]
    pub exit_queue: AccountLoader<'info, ExitQueue>,

    #[account(
        seeds = [VAULT_ASSETS_SEED, vault.key().as_ref()],
        bump = vault.asset_account_bump
    )]
    pub asset_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [SHARE_MINT_SEED, vault.key().as_ref()],
        bump = vault.share_mint_bump
    )]
    pub share_mint: Account<'info, Mint>,

    /// Fee recipient's share token account
    #[account(
        mut,
        constraint = fee_recipient_share_account.mint == share_mint.key() @ VaultError::InvalidShareMint,
        constraint = fee_recipient_share_account.owner == vault.fee_recipient @ VaultError::InvalidTokenAccountOwner
    )]
    pub fee_recipient_share_account: Account<'info, TokenAccount>,

    // =========================================================================
    // Keeper Accounts (validated by the keeper program)
    // =========================================================================

    #[account(
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump,
        seeds::program = keeper::ID
    )]
    pub keeper_state: Account<'info, KeeperState>,

    /// CHECK: Keeper VaultEntry PDA for this vault
    pub vault_entry: UncheckedAccount<'info>,

    /// CHECK: Keeper RewardSync PDA for this vault
    #[account(mut)]
    pub reward_sync: UncheckedAccount<'info>,

    pub keeper_program: Program<'info, Keeper>,
    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handler_update_state<'info>(
    ctx: Context<'_, '_, '_, 'info, UpdateState<'info>>,
    params: UpdateStateParams,
) -> Result<()> {
    let clock = Clock::get()?;
    let vault_key = ctx.accounts.vault.key();

    // =========================================================================
    // 1. Harvest
    // =========================================================================

    let harvest = harvest_rewards(&ctx, params)?;

    // =========================================================================
    // 2. Apply asset delta and fee
    // =========================================================================

    if let Some(result) = harvest.filter(|r| r.harvested) {
        let vault = &mut ctx.accounts.vault;
        let fee = vault.apply_total_assets_delta(result.assets_delta)?;
        vault.rewards_nonce = vault.rewards_nonce.max(result.nonce);

        msg!(
            "Harvested {} assets at nonce {}, total assets {}",
            result.assets_delta,
            result.nonce,
            vault.total_assets
        );

        if fee.shares > 0 {
            mint_shares(
                &ctx.accounts.token_program,
                &ctx.accounts.vault,
                &ctx.accounts.share_mint,
                ctx.accounts.fee_recipient_share_account.to_account_info(),
                fee.shares,
            )?;

            msg!("Fee: {} assets as {} shares", fee.assets, fee.shares);

            emit!(FeeSharesMinted {
                vault: vault_key,
                receiver: ctx.accounts.vault.fee_recipient,
                shares: fee.shares,
                assets: fee.assets,
            });
        }
    }

    // =========================================================================
    // 3. Advance the exit queue
    // =========================================================================

    let balance = ctx.accounts.asset_account.amount;
    if let Some(batch) = ctx
        .accounts
        .vault
        .pending_exit_batch(balance, clock.unix_timestamp)?
    {
        let exit_queue_info = ctx.accounts.exit_queue.to_account_info();
        let (len, latest) = {
            let data = exit_queue_info.try_borrow_data()?;
            let checkpoints = Checkpoints::from_account_data(&data)?;
            (checkpoints.len(), checkpoints.latest())
        };

        let checkpoint = ctx
            .accounts
            .vault
            .apply_exit_batch(&latest, batch, clock.unix_timestamp)?;

        append_checkpoint(
            &exit_queue_info,
            &ctx.accounts.caller.to_account_info(),
            &ctx.accounts.system_program,
            len + 1,
            &checkpoint,
        )?;

        msg!(
            "Checkpoint {}: {} shares burned for {} assets",
            len,
            batch.shares,
            batch.assets
        );

        emit!(CheckpointCreated {
            vault: vault_key,
            shares: batch.shares,
            assets: batch.assets,
            total_tickets: checkpoint.total_tickets,
        });
    }

    let vault = &ctx.accounts.vault;
    msg!(
        "State updated: {} assets / {} shares, queued {}, unclaimed {}",
        vault.total_assets,
        vault.total_shares,
        vault.queued_shares,
        vault.unclaimed_assets
    );

    emit!(StateUpdated {
        vault: vault_key,
        caller: ctx.accounts.caller.key(),
        assets_delta: harvest
            .filter(|r| r.harvested)
            .map(|r| r.assets_delta)
            .unwrap_or_default(),
        rewards_nonce: vault.rewards_nonce,
        total_assets: vault.total_assets,
        total_shares: vault.total_shares,
    });

    Ok(())
}

/// Pulls the reward from the keeper. `None` when the vault has nothing to
/// harvest (no validators yet) or skipped a harvest it did not need.
fn harvest_rewards<'info>(
    ctx: &Context<'_, '_, '_, 'info, UpdateState<'info>>,
    params: UpdateStateParams,
) -> Result<Option<HarvestResult>> {
    let vault = &ctx.accounts.vault;
    if !vault.is_collateralized() {
        return Ok(None);
    }

    let Some(harvest_params) = params.harvest else {
        vault
            .check_harvested(ctx.accounts.keeper_state.rewards_nonce)
            .map_err(|_| error!(VaultError::MissingHarvestParams))?;
        return Ok(None);
    };

    let vault_id = vault.vault_id.to_le_bytes();
    let vault_seeds = &[
        VAULT_SEED,
        vault.creator.as_ref(),
        vault_id.as_ref(),
        &[vault.bump],
    ];
    let signer_seeds = &[&vault_seeds[..]];

    let result = match vault.kind {
        VaultKind::Standard => {
            let cpi_ctx = CpiContext::new_with_signer(
                ctx.accounts.keeper_program.to_account_info(),
                keeper::cpi::accounts::Harvest {
                    vault: vault.to_account_info(),
                    keeper_state: ctx.accounts.keeper_state.to_account_info(),
                    vault_entry: ctx.accounts.vault_entry.to_account_info(),
                    reward_sync: ctx.accounts.reward_sync.to_account_info(),
                },
                signer_seeds,
            );
            keeper::cpi::harvest(cpi_ctx, harvest_params)?.get()
        }
        VaultKind::Meta => {
            let cpi_ctx = CpiContext::new_with_signer(
                ctx.accounts.keeper_program.to_account_info(),
                keeper::cpi::accounts::HarvestMetaVault {
                    vault: vault.to_account_info(),
                    keeper_state: ctx.accounts.keeper_state.to_account_info(),
                    vault_entry: ctx.accounts.vault_entry.to_account_info(),
                    reward_sync: ctx.accounts.reward_sync.to_account_info(),
                },
                signer_seeds,
            )
            .with_remaining_accounts(ctx.remaining_accounts.to_vec());
            keeper::cpi::harvest_meta_vault(cpi_ctx, harvest_params)?.get()
        }
    };

    Ok(Some(result))
}

/// Resizes the exit queue account to hold `len` checkpoints, topping up rent
/// from `payer`, and writes `checkpoint` into the new last slot
fn append_checkpoint<'info>(
    exit_queue: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
    len: usize,
    checkpoint: &Checkpoint,
) -> Result<()> {
    let new_size = ExitQueue::space(len);
    let required_lamports = Rent::get()?.minimum_balance(new_size);
    let current_lamports = exit_queue.lamports();

    if required_lamports > current_lamports {
        let transfer_ctx = CpiContext::new(
            system_program.to_account_info(),
            system_program::Transfer {
                from: payer.clone(),
                to: exit_queue.clone(),
            },
        );
        system_program::transfer(transfer_ctx, required_lamports - current_lamports)?;
    }

    exit_queue.realloc(new_size, false)?;

    let mut data = exit_queue.try_borrow_mut_data()?;
    ExitQueue::write_last_checkpoint(&mut data, checkpoint)?;
    Ok(())
}
