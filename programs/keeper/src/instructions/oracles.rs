use anchor_lang::prelude::*;

use crate::constants::KEEPER_SEED;
use crate::error::KeeperError;
use crate::events::{OracleAdded, OracleRemoved, RequiredOraclesUpdated};
use crate::state::KeeperState;

// =============================================================================
// Oracle Set Management (owner only)
// =============================================================================

#[derive(Accounts)]
pub struct ManageOracles<'info> {
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

pub fn handler_add_oracle(ctx: Context<ManageOracles>, oracle: [u8; 20]) -> Result<()> {
    let oracles = &mut ctx.accounts.keeper_state.oracles;
    oracles.add_oracle(oracle)?;

    msg!("Oracle added, total oracles: {}", oracles.total_oracles());

    emit!(OracleAdded {
        oracle,
        total_oracles: oracles.total_oracles(),
    });

    Ok(())
}

pub fn handler_remove_oracle(ctx: Context<ManageOracles>, oracle: [u8; 20]) -> Result<()> {
    let oracles = &mut ctx.accounts.keeper_state.oracles;
    oracles.remove_oracle(&oracle)?;

    msg!(
        "Oracle removed, total oracles: {}, required: {}",
        oracles.total_oracles(),
        oracles.required_oracles
    );

    emit!(OracleRemoved {
        oracle,
        total_oracles: oracles.total_oracles(),
        required_oracles: oracles.required_oracles,
    });

    Ok(())
}

pub fn handler_set_required_oracles(
    ctx: Context<ManageOracles>,
    required_oracles: u8,
) -> Result<()> {
    let oracles = &mut ctx.accounts.keeper_state.oracles;
    oracles.set_required_oracles(required_oracles)?;

    msg!(
        "Required oracles set to {} of {}",
        required_oracles,
        oracles.total_oracles()
    );

    emit!(RequiredOraclesUpdated { required_oracles });

    Ok(())
}
