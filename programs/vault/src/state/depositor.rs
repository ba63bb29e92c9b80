// =============================================================================
// Depositor State Account
// =============================================================================
// Shares are SPL tokens of the vault share mint and live in ordinary token
// accounts. This PDA keeps a wallet's lifetime statistics next to them: assets
// paid in through deposits and assets paid out through redeem or exit claims.
// =============================================================================

use anchor_lang::prelude::*;

use crate::error::VaultError;

/// Lifetime statistics of one wallet in a vault.
///
/// PDA derived from ["depositor", vault_pubkey, owner_pubkey].
#[account]
#[derive(Default, Debug, InitSpace)]
pub struct Depositor {
    // =========================================================================
    // Account References
    // =========================================================================

    /// The vault these statistics belong to
    pub vault: Pubkey,

    /// The wallet the statistics describe
    pub owner: Pubkey,

    // =========================================================================
    // Position Tracking
    // =========================================================================

    /// Share tokens minted to this wallet by deposits (cumulative).
    /// The current balance is in the wallet's share token account.
    pub shares_minted: u64,

    /// Total assets deposited (cumulative)
    pub total_deposited: u64,

    /// Total assets received through redeem or exit claims (cumulative)
    pub total_withdrawn: u64,

    /// Number of deposits credited to this wallet
    pub deposit_count: u32,

    // =========================================================================
    // Timestamps
    // =========================================================================

    pub last_deposit_timestamp: i64,
    pub last_withdrawal_timestamp: i64,

    /// Bump seed for this PDA
    pub bump: u8,
}

impl Depositor {
    /// Sets the references of a freshly created account. No-op afterwards.
    pub fn init_if_new(&mut self, vault: Pubkey, owner: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.vault = vault;
            self.owner = owner;
            self.bump = bump;
        }
    }

    pub fn record_deposit(&mut self, assets: u64, shares: u64, timestamp: i64) -> Result<()> {
        self.shares_minted = self
            .shares_minted
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;

        self.total_deposited = self
            .total_deposited
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;

        self.deposit_count = self
            .deposit_count
            .checked_add(1)
            .ok_or(VaultError::MathOverflow)?;

        self.last_deposit_timestamp = timestamp;

        Ok(())
    }

    /// Record assets paid out to this wallet
    pub fn record_withdrawal(&mut self, assets: u64, timestamp: i64) -> Result<()> {
        self.total_withdrawn = self
            .total_withdrawn
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;

        self.last_withdrawal_timestamp = timestamp;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposits_accumulate() {
        let mut depositor = Depositor::default();
        depositor.record_deposit(1_000, 990, 10).unwrap();
        depositor.record_deposit(500, 480, 20).unwrap();

        assert_eq!(depositor.shares_minted, 1_470);
        assert_eq!(depositor.total_deposited, 1_500);
        assert_eq!(depositor.deposit_count, 2);
        assert_eq!(depositor.last_deposit_timestamp, 20);
    }

    #[test]
    fn redeem_and_exit_claims_both_count_as_withdrawn() {
        let mut depositor = Depositor::default();
        depositor.record_deposit(1_000, 1_000, 10).unwrap();

        // instant redeem
        depositor.record_withdrawal(400, 20).unwrap();
        // two partial exit claims
        depositor.record_withdrawal(250, 30).unwrap();
        depositor.record_withdrawal(350, 40).unwrap();

        assert_eq!(depositor.total_withdrawn, 1_000);
        assert_eq!(depositor.last_withdrawal_timestamp, 40);
        assert_eq!(depositor.last_deposit_timestamp, 10);
    }

    #[test]
    fn withdrawn_total_cannot_wrap() {
        let mut depositor = Depositor {
            total_withdrawn: u64::MAX,
            ..Default::default()
        };
        assert!(depositor.record_withdrawal(1, 1).is_err());
        assert_eq!(depositor.total_withdrawn, u64::MAX);
    }

    #[test]
    fn references_are_set_once() {
        let vault = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut depositor = Depositor::default();

        depositor.init_if_new(vault, owner, 254);
        depositor.init_if_new(Pubkey::new_unique(), Pubkey::new_unique(), 1);

        assert_eq!(depositor.vault, vault);
        assert_eq!(depositor.owner, owner);
        assert_eq!(depositor.bump, 254);
    }
}
