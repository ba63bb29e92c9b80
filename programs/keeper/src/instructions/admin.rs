use anchor_lang::prelude::*;

use crate::constants::{KEEPER_SEED, REGISTRY_SEED};
use crate::error::KeeperError;
use crate::events::{OwnershipTransferred, RewardsDelayUpdated};
use crate::state::{KeeperState, Registry};

// =============================================================================
// Update Rewards Delay
// =============================================================================

#[derive(Accounts)]
pub struct UpdateRewardsDelay<'info> {
    #[account(
        constraint = owner.key() == keeper_state.owner @ KeeperError::Unauthorized
    )]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump
    )]
    pub keeper_state: Account<'info, KeeperState>,
}

pub fn handler_update_rewards_delay(
    ctx: Context<UpdateRewardsDelay>,
    rewards_delay: i64,
) -> Result<()> {
    KeeperState::validate_rewards_delay(rewards_delay)?;
    ctx.accounts.keeper_state.rewards_delay = rewards_delay;

    msg!("Rewards delay updated to {} seconds", rewards_delay);

    emit!(RewardsDelayUpdated { rewards_delay });

    Ok(())
}

// =============================================================================
// Transfer Ownership
// =============================================================================
// Hands both the keeper and the registry to a new owner.

#[derive(Accounts)]
pub struct TransferOwnership<'info> {
    #[account(
        constraint = owner.key() == keeper_state.owner @ KeeperError::Unauthorized
    )]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump
    )]
    pub keeper_state: Account<'info, KeeperState>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
        constraint = registry.owner == owner.key() @ KeeperError::Unauthorized
    )]
    pub registry: Account<'info, Registry>,

    /// CHECK: New owner address, validated to not be default
    #[account(
        constraint = new_owner.key() != Pubkey::default() @ KeeperError::InvalidAddress,
        constraint = new_owner.key() != owner.key() @ KeeperError::InvalidAddress
    )]
    pub new_owner: UncheckedAccount<'info>,
}

pub fn handler_transfer_ownership(ctx: Context<TransferOwnership>) -> Result<()> {
    let previous_owner = ctx.accounts.keeper_state.owner;
    let new_owner = ctx.accounts.new_owner.key();

    ctx.accounts.keeper_state.owner = new_owner;
    ctx.accounts.registry.owner = new_owner;

    msg!("Ownership transferred from {} to {}", previous_owner, new_owner);

    emit!(OwnershipTransferred {
        previous_owner,
        new_owner,
    });

    Ok(())
}
