use anchor_lang::prelude::*;

use crate::constants::KEEPER_SEED;
use crate::events::RewardsRootUpdated;
use crate::state::KeeperState;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct SetRewardsRootParams {
    /// Root of the new rewards Merkle tree
    pub rewards_root: [u8; 32],
    /// IPFS hash of the full rewards tree
    pub rewards_ipfs_hash: String,
    /// Concatenated 65 byte oracle signatures, ordered by signer address
    pub signatures: Vec<u8>,
}

/// Submit a rewards root approved by the oracle quorum.
/// Anyone can relay it; the signatures carry the authority.
#[derive(Accounts)]
pub struct SetRewardsRoot<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [KEEPER_SEED],
        bump = keeper_state.bump
    )]
    pub keeper_state: Account<'info, KeeperState>,
}

pub fn handler_set_rewards_root(
    ctx: Context<SetRewardsRoot>,
    params: SetRewardsRootParams,
) -> Result<()> {
    let clock = Clock::get()?;
    let keeper_state = &mut ctx.accounts.keeper_state;

    let nonce = keeper_state.set_rewards_root(
        params.rewards_root,
        &params.rewards_ipfs_hash,
        &params.signatures,
        clock.unix_timestamp,
    )?;

    msg!(
        "Rewards root updated: nonce={}, next_nonce={}, ipfs={}",
        nonce,
        keeper_state.rewards_nonce,
        params.rewards_ipfs_hash
    );

    emit!(RewardsRootUpdated {
        caller: ctx.accounts.caller.key(),
        rewards_root: params.rewards_root,
        rewards_ipfs_hash: params.rewards_ipfs_hash,
        nonce,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
