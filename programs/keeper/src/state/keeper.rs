use anchor_lang::prelude::*;

use crate::constants::{INITIAL_REWARDS_NONCE, MAX_IPFS_HASH_LENGTH, MAX_REWARDS_DELAY};
use crate::error::KeeperError;
use crate::merkle::{self, NodeHash};
use crate::signatures;
use crate::state::{OracleSet, RewardSync};

/// Global rewards state.
/// PDA: ["keeper"]
///
/// Every accepted rewards root advances `rewards_nonce` by one. Vaults harvest
/// against the current root or the one before it, so a vault may lag one round
/// behind but never two.
#[account]
#[derive(Default, Debug, InitSpace)]
pub struct KeeperState {
    /// Can manage oracles and configuration
    pub owner: Pubkey,

    /// Signers approving rewards roots
    pub oracles: OracleSet,

    /// Root of the latest rewards tree
    pub rewards_root: [u8; 32],

    /// Root of the round before the latest
    pub prev_rewards_root: [u8; 32],

    /// Nonce the next rewards root must be signed with
    pub rewards_nonce: u64,

    /// When the latest root was accepted
    pub last_rewards_timestamp: i64,

    /// Minimum seconds between two root updates
    pub rewards_delay: i64,

    /// EIP-712 domain chain id
    pub chain_id: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl KeeperState {
    pub fn initialize(
        &mut self,
        owner: Pubkey,
        chain_id: u64,
        rewards_delay: i64,
        oracles: OracleSet,
        bump: u8,
    ) -> Result<()> {
        Self::validate_rewards_delay(rewards_delay)?;
        self.owner = owner;
        self.oracles = oracles;
        self.rewards_root = [0u8; 32];
        self.prev_rewards_root = [0u8; 32];
        self.rewards_nonce = INITIAL_REWARDS_NONCE;
        self.last_rewards_timestamp = 0;
        self.rewards_delay = rewards_delay;
        self.chain_id = chain_id;
        self.bump = bump;
        Ok(())
    }

    pub fn validate_rewards_delay(rewards_delay: i64) -> Result<()> {
        require!(
            (0..=MAX_REWARDS_DELAY).contains(&rewards_delay),
            KeeperError::InvalidRewardsDelay
        );
        Ok(())
    }

    pub fn can_update_rewards(&self, now: i64) -> bool {
        self.last_rewards_timestamp.saturating_add(self.rewards_delay) <= now
    }

    /// Digest oracles must sign to approve `rewards_root` in the current round
    pub fn rewards_root_digest(&self, rewards_root: &[u8; 32], ipfs_hash: &str) -> [u8; 32] {
        signatures::rewards_root_digest(
            self.chain_id,
            &crate::ID,
            rewards_root,
            ipfs_hash,
            self.rewards_nonce,
        )
    }

    /// Accepts a new quorum-approved rewards root and opens the next round.
    /// Returns the nonce the root was signed with.
    pub fn set_rewards_root(
        &mut self,
        rewards_root: [u8; 32],
        ipfs_hash: &str,
        signatures: &[u8],
        now: i64,
    ) -> Result<u64> {
        require!(
            rewards_root != self.rewards_root,
            KeeperError::RewardsRootUnchanged
        );
        require!(
            !ipfs_hash.is_empty() && ipfs_hash.len() <= MAX_IPFS_HASH_LENGTH,
            KeeperError::InvalidIpfsHash
        );
        require!(self.can_update_rewards(now), KeeperError::TooEarlyUpdate);

        let digest = self.rewards_root_digest(&rewards_root, ipfs_hash);
        self.oracles.verify_signatures(&digest, signatures)?;

        let signed_nonce = self.rewards_nonce;
        self.prev_rewards_root = self.rewards_root;
        self.rewards_root = rewards_root;
        self.last_rewards_timestamp = now;
        self.rewards_nonce = signed_nonce
            .checked_add(1)
            .ok_or(KeeperError::MathOverflow)?;

        Ok(signed_nonce)
    }

    /// Finds which round `(vault, reward)` was published in.
    /// Returns the nonce a harvest of that round records, and its root.
    pub fn resolve_round(
        &self,
        vault: &Pubkey,
        reward: i64,
        proof: &[NodeHash],
    ) -> Result<(u64, [u8; 32])> {
        require!(
            self.rewards_root != [0u8; 32],
            KeeperError::RewardsRootNotSet
        );

        let leaf = merkle::rewards_leaf(vault, reward);
        if merkle::verify(proof, &self.rewards_root, leaf) {
            return Ok((self.rewards_nonce, self.rewards_root));
        }

        if self.prev_rewards_root != [0u8; 32]
            && merkle::verify(proof, &self.prev_rewards_root, leaf)
        {
            let nonce = self
                .rewards_nonce
                .checked_sub(1)
                .ok_or(KeeperError::MathUnderflow)?;
            return Ok((nonce, self.prev_rewards_root));
        }

        err!(KeeperError::InvalidProof)
    }

    /// True when a vault synced to `synced_nonce` is two or more rounds behind
    pub fn is_harvest_required(&self, synced_nonce: u64) -> bool {
        synced_nonce != 0 && synced_nonce.saturating_add(1) < self.rewards_nonce
    }

    /// True when a newer round than `synced_nonce` is available
    pub fn can_harvest(&self, synced_nonce: u64) -> bool {
        self.rewards_root != [0u8; 32] && synced_nonce < self.rewards_nonce
    }
}

/// Checks that every sub-vault of a meta vault has harvested the round the
/// meta vault is about to harvest.
///
/// The meta vault's own reward is proven against the rewards root like any
/// other vault; this only stops it from booking a round its sub-vaults have
/// not incorporated yet.
pub fn check_sub_vaults_synced(records: &[RewardSync], nonce: u64) -> Result<()> {
    require!(!records.is_empty(), KeeperError::InvalidSubVaults);
    require!(nonce != 0, KeeperError::SubVaultsNonceMismatch);

    for record in records {
        require!(
            record.nonce == nonce,
            KeeperError::SubVaultsNonceMismatch
        );
    }

    Ok(())
}
