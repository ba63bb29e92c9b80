use anchor_lang::prelude::*;

use crate::error::KeeperError;

/// Last rewards round a vault has incorporated.
/// PDA: ["reward_sync", vault]
///
/// `nonce == 0` means the vault has never harvested; such a vault has nothing
/// to report and is treated as up to date.
#[account]
#[derive(Default, Debug, InitSpace)]
pub struct RewardSync {
    /// Vault this record belongs to
    pub vault: Pubkey,

    /// Keeper nonce of the round last harvested
    pub nonce: u64,

    /// Cumulative reward reported for the vault in that round
    pub reward: i64,

    /// PDA bump seed
    pub bump: u8,
}

/// Outcome of a harvest, returned to the calling vault via return data
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HarvestResult {
    /// Change in total assets since the previous harvest
    pub assets_delta: i64,

    /// Nonce the vault is synced to after this call
    pub nonce: u64,

    /// False when the vault was already synced to this round
    pub harvested: bool,
}

impl RewardSync {
    /// Moves the record to `(nonce, reward)` and returns the asset delta.
    ///
    /// A round the vault has already seen (or an older one) leaves the record
    /// untouched and reports nothing harvested.
    pub fn apply(&mut self, nonce: u64, reward: i64) -> Result<HarvestResult> {
        if self.nonce >= nonce {
            return Ok(HarvestResult {
                assets_delta: 0,
                nonce: self.nonce,
                harvested: false,
            });
        }

        let assets_delta = reward
            .checked_sub(self.reward)
            .ok_or(KeeperError::MathOverflow)?;

        self.nonce = nonce;
        self.reward = reward;

        Ok(HarvestResult {
            assets_delta,
            nonce,
            harvested: true,
        })
    }
}
