use anchor_lang::prelude::*;

use crate::constants::{KEEPER_SEED, REGISTRY_SEED};
use crate::events::KeeperInitialized;
use crate::state::{KeeperState, OracleSet, Registry};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializeParams {
    /// EIP-712 domain chain id oracles sign for
    pub chain_id: u64,
    /// Minimum seconds between rewards root updates
    pub rewards_delay: i64,
    /// Initial oracle addresses
    pub oracles: Vec<[u8; 20]>,
    /// Signatures required to accept a rewards root
    pub required_oracles: u8,
}

/// Initialize the keeper and the vault registry
///
/// # Accounts
/// * `owner` - Keeper and registry owner (signer, payer)
/// * `keeper_state` - Keeper PDA to create
/// * `registry` - Registry PDA to create
///
#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        init,
        payer = owner,
        space = 8 + KeeperState::INIT_SPACE,
        seeds = [KEEPER_SEED],
        bump
    )]
    pub keeper_state: Account<'info, KeeperState>,

    #[account(
        init,
        payer = owner,
        space = 8 + Registry::INIT_SPACE,
        seeds = [REGISTRY_SEED],
        bump
    )]
    pub registry: Account<'info, Registry>,

    pub system_program: Program<'info, System>,
}

pub fn handler_initialize(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let oracles = OracleSet::new(params.oracles, params.required_oracles)?;

    let keeper_state = &mut ctx.accounts.keeper_state;
    keeper_state.initialize(
        owner,
        params.chain_id,
        params.rewards_delay,
        oracles,
        ctx.bumps.keeper_state,
    )?;

    let registry = &mut ctx.accounts.registry;
    registry.owner = owner;
    registry.vault_impls = Vec::new();
    registry.factories = Vec::new();
    registry.vaults_count = 0;
    registry.bump = ctx.bumps.registry;

    msg!(
        "Keeper initialized: owner={}, oracles={}/{}, rewards_delay={}",
        owner,
        keeper_state.oracles.required_oracles,
        keeper_state.oracles.total_oracles(),
        keeper_state.rewards_delay
    );

    emit!(KeeperInitialized {
        owner,
        chain_id: keeper_state.chain_id,
        required_oracles: keeper_state.oracles.required_oracles,
        total_oracles: keeper_state.oracles.total_oracles(),
        rewards_delay: keeper_state.rewards_delay,
    });

    Ok(())
}
