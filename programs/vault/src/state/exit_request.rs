use anchor_lang::prelude::*;

use crate::constants::{EXIT_CLAIM_DELAY, EXIT_REQUEST_DUST};
use crate::error::VaultError;
use crate::state::ExitedAssets;

/// Shares waiting in the exit queue for one receiver.
/// PDA: ["exit_request", vault, receiver, entry_ticket_le]
///
/// After a partial claim the same account carries the remainder under an
/// advanced `position_ticket`; `entry_ticket` keeps the address stable.
#[account]
#[derive(Default, Debug, InitSpace)]
pub struct ExitRequest {
    pub vault: Pubkey,

    /// Holder whose shares were queued
    pub owner: Pubkey,

    /// Receives the assets and signs the claim
    pub receiver: Pubkey,

    /// Ticket assigned on entry, part of the PDA seeds
    pub entry_ticket: u128,

    /// First ticket not yet claimed
    pub position_ticket: u128,

    /// Shares not yet claimed
    pub shares: u64,

    /// When the shares entered the queue
    pub timestamp: i64,

    pub bump: u8,
}

/// What a claim does to the request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Nothing resolved yet, request untouched
    Pending,
    /// Some shares resolved, request continues from `position_ticket`
    Partial { position_ticket: u128 },
    /// All shares (or all but dust) resolved, request must be closed
    Completed,
}

impl ExitRequest {
    pub fn can_claim(&self, now: i64) -> bool {
        self.timestamp.saturating_add(EXIT_CLAIM_DELAY) <= now
    }

    /// Applies a resolved slice of the position to the request
    pub fn settle(&mut self, exited: &ExitedAssets) -> Result<ClaimOutcome> {
        if exited.burned_shares == 0 {
            return Ok(ClaimOutcome::Pending);
        }

        let remaining = self
            .shares
            .checked_sub(exited.burned_shares)
            .ok_or(VaultError::MathUnderflow)?;
        if remaining <= EXIT_REQUEST_DUST {
            self.shares = 0;
            return Ok(ClaimOutcome::Completed);
        }

        self.position_ticket = self
            .position_ticket
            .checked_add(exited.burned_shares as u128)
            .ok_or(VaultError::MathOverflow)?;
        self.shares = remaining;

        Ok(ClaimOutcome::Partial {
            position_ticket: self.position_ticket,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(shares: u64) -> ExitRequest {
        ExitRequest {
            entry_ticket: 1_000,
            position_ticket: 1_000,
            shares,
            timestamp: 500,
            ..Default::default()
        }
    }

    #[test]
    fn claim_delay_is_enforced() {
        let req = request(10);
        assert!(!req.can_claim(500 + EXIT_CLAIM_DELAY - 1));
        assert!(req.can_claim(500 + EXIT_CLAIM_DELAY));
    }

    #[test]
    fn partial_settlement_advances_the_ticket() {
        let mut req = request(500);
        let outcome = req
            .settle(&ExitedAssets {
                burned_shares: 300,
                exited_assets: 300,
            })
            .unwrap();

        assert_eq!(
            outcome,
            ClaimOutcome::Partial {
                position_ticket: 1_300
            }
        );
        assert_eq!(req.shares, 200);
        assert_eq!(req.entry_ticket, 1_000);
    }

    #[test]
    fn dust_remainder_completes_the_request() {
        let mut req = request(500);
        let outcome = req
            .settle(&ExitedAssets {
                burned_shares: 499,
                exited_assets: 498,
            })
            .unwrap();
        assert_eq!(outcome, ClaimOutcome::Completed);
    }

    #[test]
    fn nothing_resolved_is_pending() {
        let mut req = request(500);
        assert_eq!(
            req.settle(&ExitedAssets::default()).unwrap(),
            ClaimOutcome::Pending
        );
        assert_eq!(req.shares, 500);
    }
}
