// =============================================================================
// Vault State Account
// =============================================================================
// The Vault account is the accounting core of a liquid staking pool:
// - total_shares / total_assets define the share price
// - queued_shares are locked in the exit queue, waiting for liquidity
// - unclaimed_assets were released by the exit queue but not yet claimed
// - rewards_nonce is the last keeper round the vault has incorporated
//
// Every method takes balances and time as arguments so the rules can be
// exercised without a runtime. Instruction handlers only move tokens.
// =============================================================================

use anchor_lang::prelude::*;
use keeper::instructions::AddVaultParams;
use keeper::state::{VaultEntry, VaultKind};

use crate::constants::*;
use crate::error::VaultError;
use crate::state::Checkpoint;

/// Rounding direction for share/asset conversions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// `x * y / denominator` in 128-bit precision
pub fn mul_div(x: u64, y: u64, denominator: u64, rounding: Rounding) -> Result<u64> {
    require!(denominator != 0, VaultError::DivisionByZero);

    let product = (x as u128)
        .checked_mul(y as u128)
        .ok_or(VaultError::MathOverflow)?;
    let denominator = denominator as u128;

    let mut result = product / denominator;
    if rounding == Rounding::Up && product % denominator != 0 {
        result += 1;
    }

    u64::try_from(result).map_err(|_| error!(VaultError::MathOverflow))
}

/// Shares minted to the fee recipient on a profitable harvest
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeMint {
    pub shares: u64,
    pub assets: u64,
}

/// One exit queue advance: `shares` leave the queue for `assets`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExitBatch {
    pub shares: u64,
    pub assets: u64,
}

/// A liquid staking vault.
///
/// PDA derived from ["vault", creator_pubkey, vault_id_le].
#[account]
#[derive(Default, Debug, InitSpace)]
pub struct Vault {
    /// Account layout version
    pub version: u8,

    // =========================================================================
    // Identity & Authority
    // =========================================================================

    /// Wallet that created the vault (part of the PDA seeds)
    pub creator: Pubkey,

    /// Creator-chosen id (part of the PDA seeds)
    pub vault_id: u64,

    /// Can change fee settings and the validators manager
    pub admin: Pubkey,

    /// Can register validators
    pub validators_manager: Pubkey,

    /// Receives performance fee shares
    pub fee_recipient: Pubkey,

    /// Performance fee in basis points
    pub fee_percent: u16,

    /// Standard vault or aggregator of sub-vaults
    pub kind: VaultKind,

    // =========================================================================
    // Token Accounts
    // =========================================================================

    /// The staked asset mint
    pub asset_mint: Pubkey,

    /// SPL mint of the vault shares (mint authority: the vault PDA)
    pub share_mint: Pubkey,

    /// PDA token account holding liquid assets
    pub asset_account: Pubkey,

    /// Where validator principal is sent on registration
    pub deposit_escrow: Pubkey,

    // =========================================================================
    // Accounting
    // =========================================================================

    /// Maximum total assets deposits can reach (u64::MAX = unlimited)
    pub capacity: u64,

    /// Shares outstanding: minted share tokens, the security deposit shares
    /// and shares waiting in the exit queue
    pub total_shares: u64,

    pub total_assets: u64,

    /// Shares waiting in the exit queue, still counted in total_shares
    pub queued_shares: u64,

    /// Assets released by the exit queue and reserved for claims
    pub unclaimed_assets: u64,

    // =========================================================================
    // Validators & Rewards
    // =========================================================================

    pub validators_count: u32,

    /// Keeper nonce of the last incorporated rewards round
    pub rewards_nonce: u64,

    // =========================================================================
    // Exit Queue Settings
    // =========================================================================

    /// Minimum seconds between two checkpoints
    pub exit_queue_update_delay: i64,

    /// When the last checkpoint was appended (0 = never)
    pub last_exit_queue_update: i64,

    /// Tickets burned by the exit queue so far, equal to the latest
    /// checkpoint's total_tickets
    pub exited_tickets: u128,

    // =========================================================================
    // PDA Bumps
    // =========================================================================

    pub bump: u8,
    pub asset_account_bump: u8,
    pub share_mint_bump: u8,
    pub exit_queue_bump: u8,
}

impl Vault {
    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn validate_fee_percent(fee_percent: u16) -> Result<()> {
        require!(fee_percent <= MAX_FEE_PERCENT, VaultError::InvalidFeePercent);
        Ok(())
    }

    pub fn validate_exit_queue_update_delay(delay: i64) -> Result<()> {
        require!(
            (0..=MAX_EXIT_QUEUE_UPDATE_DELAY).contains(&delay),
            VaultError::InvalidExitQueueDelay
        );
        Ok(())
    }

    /// Zero capacity is stored as unlimited
    pub fn normalize_capacity(capacity: u64) -> u64 {
        if capacity == 0 {
            UNLIMITED_CAPACITY
        } else {
            capacity
        }
    }

    // =========================================================================
    // Collateralization & Freshness
    // =========================================================================

    /// Registration parameters for the keeper. The kind is always the one
    /// stored on this vault.
    pub fn keeper_registration(&self, sub_vaults: Vec<Pubkey>) -> Result<AddVaultParams> {
        VaultEntry::validate_sub_vaults(self.kind, &sub_vaults)
            .map_err(|_| error!(VaultError::InvalidSubVaults))?;
        Ok(AddVaultParams {
            kind: self.kind,
            sub_vaults,
        })
    }

    /// True once validator principal is locked. Meta vaults always are,
    /// their sub-vaults hold the validators.
    pub fn is_collateralized(&self) -> bool {
        match self.kind {
            VaultKind::Meta => true,
            VaultKind::Standard => self.validators_count > 0,
        }
    }

    /// Fails when a collateralized vault is two or more rounds behind the
    /// keeper. An uncollateralized vault has no rewards to miss.
    pub fn check_harvested(&self, keeper_rewards_nonce: u64) -> Result<()> {
        if !self.is_collateralized() {
            return Ok(());
        }
        require!(
            self.rewards_nonce.saturating_add(1) >= keeper_rewards_nonce,
            VaultError::NotHarvested
        );
        Ok(())
    }

    /// Records the first validators, collateralizing the vault at the
    /// keeper's current round
    pub fn register_validators(&mut self, count: u32, keeper_rewards_nonce: u64) -> Result<u64> {
        require!(count > 0, VaultError::InvalidValidatorsCount);

        if !self.is_collateralized() {
            self.rewards_nonce = keeper_rewards_nonce;
        }
        self.validators_count = self
            .validators_count
            .checked_add(count)
            .ok_or(VaultError::MathOverflow)?;

        (count as u64)
            .checked_mul(VALIDATOR_DEPOSIT)
            .ok_or_else(|| error!(VaultError::MathOverflow))
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    pub fn convert_to_shares(&self, assets: u64, rounding: Rounding) -> Result<u64> {
        if assets == 0 || self.total_shares == 0 {
            return Ok(assets);
        }
        mul_div(assets, self.total_shares, self.total_assets, rounding)
    }

    pub fn convert_to_assets(&self, shares: u64, rounding: Rounding) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(shares);
        }
        mul_div(shares, self.total_assets, self.total_shares, rounding)
    }

    /// Liquid assets not reserved for claims or queued shares
    pub fn withdrawable_assets(&self, balance: u64) -> Result<u64> {
        let queued_assets = self.convert_to_assets(self.queued_shares, Rounding::Up)?;
        let reserved = self
            .unclaimed_assets
            .checked_add(queued_assets)
            .ok_or(VaultError::MathOverflow)?;
        Ok(balance.saturating_sub(reserved))
    }

    // =========================================================================
    // Deposit & Redeem
    // =========================================================================

    /// Mints shares for `assets` and returns the amount minted
    pub fn deposit(&mut self, assets: u64) -> Result<u64> {
        require!(assets > 0, VaultError::InvalidAmount);

        let new_total_assets = self
            .total_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        require!(
            new_total_assets <= self.capacity,
            VaultError::CapacityExceeded
        );

        let shares = self.convert_to_shares(assets, Rounding::Down)?;
        require!(shares > 0, VaultError::ZeroShares);

        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        self.total_assets = new_total_assets;

        Ok(shares)
    }

    /// Burns `shares` for assets out of the liquid `balance`
    pub fn redeem(&mut self, shares: u64, balance: u64) -> Result<u64> {
        require!(shares > 0, VaultError::InvalidAmount);
        require!(!self.is_collateralized(), VaultError::Collateralized);

        let assets = self.convert_to_assets(shares, Rounding::Down)?;
        require!(assets > 0, VaultError::InvalidAmount);
        require!(
            assets <= self.withdrawable_assets(balance)?,
            VaultError::InsufficientAssets
        );

        self.total_shares = self
            .total_shares
            .checked_sub(shares)
            .ok_or(VaultError::MathUnderflow)?;
        self.total_assets = self
            .total_assets
            .checked_sub(assets)
            .ok_or(VaultError::MathUnderflow)?;

        Ok(assets)
    }

    // =========================================================================
    // Rewards
    // =========================================================================

    /// Applies a harvested asset delta. A profit mints fee shares priced after
    /// the profit is added; a loss only lowers total assets.
    pub fn apply_total_assets_delta(&mut self, assets_delta: i64) -> Result<FeeMint> {
        if assets_delta <= 0 {
            self.total_assets = self
                .total_assets
                .checked_sub(assets_delta.unsigned_abs())
                .ok_or(VaultError::MathUnderflow)?;
            return Ok(FeeMint::default());
        }

        let profit = assets_delta as u64;
        let new_total_assets = self
            .total_assets
            .checked_add(profit)
            .ok_or(VaultError::MathOverflow)?;
        let fee_assets = mul_div(
            profit,
            self.fee_percent as u64,
            BPS_DENOMINATOR,
            Rounding::Down,
        )?;

        let fee_shares = if fee_assets == 0 {
            0
        } else if self.total_shares == 0 {
            fee_assets
        } else {
            // fee_percent is capped at half, so the remainder is at least
            // half the profit and never zero
            let assets_after_fee = new_total_assets
                .checked_sub(fee_assets)
                .ok_or(VaultError::MathUnderflow)?;
            mul_div(
                fee_assets,
                self.total_shares,
                assets_after_fee,
                Rounding::Down,
            )?
        };

        self.total_assets = new_total_assets;
        self.total_shares = self
            .total_shares
            .checked_add(fee_shares)
            .ok_or(VaultError::MathOverflow)?;

        Ok(FeeMint {
            shares: fee_shares,
            assets: fee_assets,
        })
    }

    // =========================================================================
    // Exit Queue
    // =========================================================================

    /// Ticket the next queued position receives
    pub fn next_exit_ticket(&self) -> u128 {
        self.exited_tickets
            .saturating_add(self.queued_shares as u128)
    }

    /// Locks `shares` in the exit queue and returns the position ticket
    pub fn enter_exit_queue(&mut self, shares: u64) -> Result<u128> {
        require!(shares > 0, VaultError::InvalidAmount);
        require!(self.is_collateralized(), VaultError::NotCollateralized);

        let position_ticket = self
            .exited_tickets
            .checked_add(self.queued_shares as u128)
            .ok_or(VaultError::MathOverflow)?;
        let queued_shares = self
            .queued_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        require!(
            queued_shares <= self.total_shares,
            VaultError::InsufficientShares
        );
        self.queued_shares = queued_shares;

        Ok(position_ticket)
    }

    pub fn can_update_exit_queue(&self, now: i64) -> bool {
        self.last_exit_queue_update == 0
            || self
                .last_exit_queue_update
                .saturating_add(self.exit_queue_update_delay)
                <= now
    }

    /// Computes how much of the queue the liquid `balance` can release now.
    /// Returns `None` when nothing can move.
    pub fn pending_exit_batch(&self, balance: u64, now: i64) -> Result<Option<ExitBatch>> {
        if self.queued_shares == 0 || !self.can_update_exit_queue(now) {
            return Ok(None);
        }

        let available = balance.saturating_sub(self.unclaimed_assets);
        let queued_assets = self.convert_to_assets(self.queued_shares, Rounding::Down)?;
        let assets = available.min(queued_assets);
        if assets == 0 {
            return Ok(None);
        }

        let shares = self
            .convert_to_shares(assets, Rounding::Up)?
            .min(self.queued_shares);
        if shares == 0 {
            return Ok(None);
        }

        Ok(Some(ExitBatch { shares, assets }))
    }

    /// Burns the batch's shares and reserves its assets. Returns the
    /// checkpoint to append after `latest`.
    pub fn apply_exit_batch(
        &mut self,
        latest: &Checkpoint,
        batch: ExitBatch,
        now: i64,
    ) -> Result<Checkpoint> {
        require!(
            latest.total_tickets == self.exited_tickets,
            VaultError::InvalidExitQueue
        );
        let checkpoint = latest.next(batch.shares, batch.assets)?;

        self.queued_shares = self
            .queued_shares
            .checked_sub(batch.shares)
            .ok_or(VaultError::MathUnderflow)?;
        self.total_shares = self
            .total_shares
            .checked_sub(batch.shares)
            .ok_or(VaultError::MathUnderflow)?;
        self.total_assets = self
            .total_assets
            .checked_sub(batch.assets)
            .ok_or(VaultError::MathUnderflow)?;
        self.unclaimed_assets = self
            .unclaimed_assets
            .checked_add(batch.assets)
            .ok_or(VaultError::MathOverflow)?;
        self.last_exit_queue_update = now;
        self.exited_tickets = checkpoint.total_tickets;

        Ok(checkpoint)
    }

    /// Releases claimed assets from the reservation
    pub fn release_unclaimed(&mut self, assets: u64) -> Result<()> {
        self.unclaimed_assets = self
            .unclaimed_assets
            .checked_sub(assets)
            .ok_or(VaultError::MathUnderflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::exit_queue::tests::{append, empty_queue};
    use crate::state::{Checkpoints, ExitedAssets};
    use keeper::merkle::rewards_leaf;
    use keeper::state::{KeeperState, RewardSync};
    use proptest::prelude::*;

    fn code(err: anchor_lang::error::Error) -> u32 {
        match err {
            anchor_lang::error::Error::AnchorError(e) => e.error_code_number,
            anchor_lang::error::Error::ProgramError(_) => u32::MAX,
        }
    }

    fn vault() -> Vault {
        Vault {
            version: VAULT_VERSION,
            capacity: UNLIMITED_CAPACITY,
            exit_queue_update_delay: DEFAULT_EXIT_QUEUE_UPDATE_DELAY,
            ..Default::default()
        }
    }

    fn collateralized(total: u64) -> Vault {
        let mut vault = vault();
        vault.deposit(total).unwrap();
        vault.register_validators(1, 1).unwrap();
        vault
    }

    /// Applies `batch` and appends its checkpoint to the ledger data
    fn advance(vault: &mut Vault, exit_queue: &mut Vec<u8>, batch: ExitBatch, now: i64) {
        let latest = Checkpoints::from_account_data(exit_queue).unwrap().latest();
        let checkpoint = vault.apply_exit_batch(&latest, batch, now).unwrap();
        append(exit_queue, &checkpoint);
    }

    #[test]
    fn mul_div_rounds_as_requested() {
        assert_eq!(mul_div(10, 10, 3, Rounding::Down).unwrap(), 33);
        assert_eq!(mul_div(10, 10, 3, Rounding::Up).unwrap(), 34);
        assert_eq!(mul_div(10, 9, 3, Rounding::Up).unwrap(), 30);
        assert_eq!(
            code(mul_div(1, 1, 0, Rounding::Down).unwrap_err()),
            u32::from(VaultError::DivisionByZero)
        );
    }

    #[test]
    fn empty_vault_converts_one_to_one() {
        let vault = vault();
        assert_eq!(vault.convert_to_shares(1_000, Rounding::Down).unwrap(), 1_000);
        assert_eq!(vault.convert_to_assets(1_000, Rounding::Down).unwrap(), 1_000);
    }

    #[test]
    fn shares_against_zero_assets_fail() {
        let vault = Vault {
            total_shares: 100,
            total_assets: 0,
            ..vault()
        };
        assert_eq!(
            code(vault.convert_to_shares(1, Rounding::Down).unwrap_err()),
            u32::from(VaultError::DivisionByZero)
        );
    }

    // Scenario A: bootstrap deposit, then a profit with a 10% fee
    #[test]
    fn deposit_then_profit_mints_fee_shares_at_post_profit_price() {
        let mut vault = Vault {
            fee_percent: 1_000,
            ..vault()
        };

        assert_eq!(vault.deposit(1_000).unwrap(), 1_000);
        assert_eq!(vault.total_shares, 1_000);

        let fee = vault.apply_total_assets_delta(100).unwrap();
        assert_eq!(vault.total_assets, 1_100);
        assert_eq!(fee.assets, 10);
        // 10 * 1000 / (1100 - 10)
        assert_eq!(fee.shares, 9);
        assert_eq!(vault.total_shares, 1_009);

        let fee_value = vault.convert_to_assets(fee.shares, Rounding::Down).unwrap();
        assert!(fee_value <= 10);
        assert!(fee_value >= 9);
    }

    #[test]
    fn loss_lowers_price_without_burning() {
        let mut vault = Vault {
            fee_percent: 1_000,
            ..vault()
        };
        vault.deposit(1_000).unwrap();

        let fee = vault.apply_total_assets_delta(-200).unwrap();
        assert_eq!(fee, FeeMint::default());
        assert_eq!(vault.total_assets, 800);
        assert_eq!(vault.total_shares, 1_000);
    }

    #[test]
    fn fee_above_half_the_profit_is_rejected() {
        Vault::validate_fee_percent(MAX_FEE_PERCENT).unwrap();
        assert_eq!(
            code(Vault::validate_fee_percent(MAX_FEE_PERCENT + 1).unwrap_err()),
            u32::from(VaultError::InvalidFeePercent)
        );
        assert_eq!(
            code(Vault::validate_fee_percent(10_000).unwrap_err()),
            u32::from(VaultError::InvalidFeePercent)
        );
    }

    #[test]
    fn profit_after_a_total_loss_still_harvests_at_max_fee() {
        let mut vault = Vault {
            fee_percent: MAX_FEE_PERCENT,
            ..vault()
        };
        vault.deposit(1_000).unwrap();

        vault.apply_total_assets_delta(-1_000).unwrap();
        assert_eq!(vault.total_assets, 0);
        assert_eq!(vault.total_shares, 1_000);

        // fee is 50 of 100, priced against the 50 left for holders
        let fee = vault.apply_total_assets_delta(100).unwrap();
        assert_eq!(fee.assets, 50);
        assert_eq!(fee.shares, 1_000);
        assert_eq!(vault.total_assets, 100);
        assert_eq!(vault.total_shares, 2_000);

        // and keeps harvesting in later rounds
        let fee = vault.apply_total_assets_delta(100).unwrap();
        assert_eq!(fee.assets, 50);
        assert_eq!(vault.total_assets, 200);
    }

    #[test]
    fn keeper_registration_uses_the_stored_kind() {
        let standard = vault();
        let params = standard.keeper_registration(vec![]).unwrap();
        assert_eq!(params.kind, VaultKind::Standard);
        assert!(params.sub_vaults.is_empty());

        // a standard vault cannot pose as an aggregator
        assert_eq!(
            code(
                standard
                    .keeper_registration(vec![Pubkey::new_unique()])
                    .unwrap_err()
            ),
            u32::from(VaultError::InvalidSubVaults)
        );

        let meta = Vault {
            kind: VaultKind::Meta,
            ..vault()
        };
        let sub_vaults = vec![Pubkey::new_unique(), Pubkey::new_unique()];
        let params = meta.keeper_registration(sub_vaults.clone()).unwrap();
        assert_eq!(params.kind, VaultKind::Meta);
        assert_eq!(params.sub_vaults, sub_vaults);
        assert_eq!(
            code(meta.keeper_registration(vec![]).unwrap_err()),
            u32::from(VaultError::InvalidSubVaults)
        );
    }

    #[test]
    fn deposits_respect_capacity() {
        let mut vault = Vault {
            capacity: 1_500,
            ..vault()
        };
        vault.deposit(1_000).unwrap();
        assert_eq!(
            code(vault.deposit(501).unwrap_err()),
            u32::from(VaultError::CapacityExceeded)
        );
        vault.deposit(500).unwrap();
        assert_eq!(
            code(vault.deposit(0).unwrap_err()),
            u32::from(VaultError::InvalidAmount)
        );
    }

    #[test]
    fn zero_capacity_means_unlimited() {
        assert_eq!(Vault::normalize_capacity(0), UNLIMITED_CAPACITY);
        assert_eq!(Vault::normalize_capacity(42), 42);
    }

    #[test]
    fn redeem_is_only_instant_without_validators() {
        let mut vault = vault();
        vault.deposit(1_000).unwrap();
        assert_eq!(vault.redeem(400, 1_000).unwrap(), 400);
        assert_eq!(vault.total_assets, 600);

        vault.register_validators(1, 1).unwrap();
        assert_eq!(
            code(vault.redeem(100, 600).unwrap_err()),
            u32::from(VaultError::Collateralized)
        );
    }

    #[test]
    fn redeem_cannot_touch_reserved_assets() {
        let mut vault = Vault {
            unclaimed_assets: 300,
            ..vault()
        };
        vault.deposit(1_000).unwrap();
        // liquid balance holds 1000 for holders plus 300 reserved for claims
        assert_eq!(vault.withdrawable_assets(1_300).unwrap(), 1_000);
        assert_eq!(
            code(vault.redeem(1_000, 1_200).unwrap_err()),
            u32::from(VaultError::InsufficientAssets)
        );
    }

    #[test]
    fn exit_queue_requires_collateral() {
        let mut vault = vault();
        vault.deposit(1_000).unwrap();
        assert_eq!(
            code(vault.enter_exit_queue(100).unwrap_err()),
            u32::from(VaultError::NotCollateralized)
        );
    }

    #[test]
    fn meta_vaults_are_always_collateralized() {
        let vault = Vault {
            kind: VaultKind::Meta,
            ..vault()
        };
        assert!(vault.is_collateralized());
    }

    #[test]
    fn tickets_follow_queued_shares() {
        let mut vault = collateralized(1_000);
        assert_eq!(vault.enter_exit_queue(100).unwrap(), 0);
        assert_eq!(vault.enter_exit_queue(50).unwrap(), 100);
        assert_eq!(vault.next_exit_ticket(), 150);
        assert_eq!(vault.queued_shares, 150);
    }

    // Scenario B: a partial checkpoint leaves a successor request
    #[test]
    fn partial_liquidity_resolves_part_of_a_position() {
        let mut vault = collateralized(1_000);
        let mut exit_queue = empty_queue();

        let ticket = vault.enter_exit_queue(500).unwrap();
        assert_eq!(ticket, 0);

        // 300 units of liquidity arrive
        let batch = vault.pending_exit_batch(300, 1_000).unwrap().unwrap();
        assert_eq!(batch, ExitBatch { shares: 300, assets: 300 });
        advance(&mut vault, &mut exit_queue, batch, 1_000);

        assert_eq!(vault.queued_shares, 200);
        assert_eq!(vault.unclaimed_assets, 300);
        assert_eq!(vault.total_shares, 700);
        assert_eq!(vault.total_assets, 700);
        assert_eq!(vault.exited_tickets, 300);

        let checkpoints = Checkpoints::from_account_data(&exit_queue).unwrap();
        let idx = checkpoints.checkpoint_index(ticket).unwrap();
        let exited = checkpoints.calculate_exited_assets(ticket, 500, idx).unwrap();
        assert_eq!(
            exited,
            ExitedAssets {
                burned_shares: 300,
                exited_assets: 300
            }
        );
        assert!(exited.burned_shares < 500);

        // the remainder continues at ticket 300
        assert_eq!(checkpoints.checkpoint_index(300), None);
        // new entries queue behind it
        assert_eq!(vault.next_exit_ticket(), 500);
    }

    #[test]
    fn batch_against_a_stale_checkpoint_is_rejected() {
        let mut vault = collateralized(1_000);
        let mut exit_queue = empty_queue();
        vault.enter_exit_queue(500).unwrap();

        let batch = vault.pending_exit_batch(100, 1).unwrap().unwrap();
        advance(&mut vault, &mut exit_queue, batch, 1);

        // the ledger moved on, the empty-queue totals are out of date
        let batch = vault
            .pending_exit_batch(300, 1 + DEFAULT_EXIT_QUEUE_UPDATE_DELAY)
            .unwrap()
            .unwrap();
        assert_eq!(
            code(
                vault
                    .apply_exit_batch(&Checkpoint::default(), batch, 1 + DEFAULT_EXIT_QUEUE_UPDATE_DELAY)
                    .unwrap_err()
            ),
            u32::from(VaultError::InvalidExitQueue)
        );
    }

    #[test]
    fn exit_queue_updates_are_rate_limited() {
        let mut vault = collateralized(1_000);
        let mut exit_queue = empty_queue();
        vault.enter_exit_queue(500).unwrap();

        let batch = vault.pending_exit_batch(100, 50_000).unwrap().unwrap();
        advance(&mut vault, &mut exit_queue, batch, 50_000);

        let later = 50_000 + DEFAULT_EXIT_QUEUE_UPDATE_DELAY - 1;
        assert_eq!(vault.pending_exit_batch(1_000, later).unwrap(), None);
        assert!(vault
            .pending_exit_batch(1_000, later + 1)
            .unwrap()
            .is_some());
    }

    #[test]
    fn reserved_assets_are_not_released_twice() {
        let mut vault = collateralized(1_000);
        let mut exit_queue = empty_queue();
        vault.enter_exit_queue(500).unwrap();

        let batch = vault.pending_exit_batch(200, 1).unwrap().unwrap();
        advance(&mut vault, &mut exit_queue, batch, 1);

        // nothing new arrived: the 200 in the account are already unclaimed
        let later = 1 + DEFAULT_EXIT_QUEUE_UPDATE_DELAY;
        assert_eq!(vault.pending_exit_batch(200, later).unwrap(), None);
    }

    #[test]
    fn second_update_in_the_same_round_is_a_no_op() {
        let mut vault = collateralized(1_000);
        vault.fee_percent = 500;
        vault.rewards_nonce = 2;
        let vault_key = Pubkey::new_unique();

        let keeper_state = KeeperState {
            rewards_root: rewards_leaf(&vault_key, 40),
            rewards_nonce: 3,
            ..Default::default()
        };
        let mut sync = RewardSync::default();

        let (nonce, _) = keeper_state.resolve_round(&vault_key, 40, &[]).unwrap();
        let first = sync.apply(nonce, 40).unwrap();
        vault.apply_total_assets_delta(first.assets_delta).unwrap();
        vault.rewards_nonce = first.nonce;
        let snapshot = (vault.total_assets, vault.total_shares, vault.rewards_nonce);

        let second = sync.apply(nonce, 40).unwrap();
        assert!(!second.harvested);
        vault.apply_total_assets_delta(second.assets_delta).unwrap();
        assert_eq!(
            (vault.total_assets, vault.total_shares, vault.rewards_nonce),
            snapshot
        );
    }

    // Scenario D: two rounds behind blocks deposits until a harvest
    #[test]
    fn stale_vault_rejects_deposits_until_harvested() {
        let mut vault = collateralized(1_000);
        vault.rewards_nonce = 2;
        let vault_key = Pubkey::new_unique();

        // keeper is at nonce 4; the vault's reward sits in the previous root
        let keeper_state = KeeperState {
            rewards_root: [7; 32],
            prev_rewards_root: rewards_leaf(&vault_key, 25),
            rewards_nonce: 4,
            ..Default::default()
        };
        assert_eq!(
            code(vault.check_harvested(keeper_state.rewards_nonce).unwrap_err()),
            u32::from(VaultError::NotHarvested)
        );

        let (nonce, _) = keeper_state.resolve_round(&vault_key, 25, &[]).unwrap();
        let result = RewardSync::default().apply(nonce, 25).unwrap();
        vault.apply_total_assets_delta(result.assets_delta).unwrap();
        vault.rewards_nonce = result.nonce;

        assert_eq!(vault.rewards_nonce, 3);
        vault.check_harvested(keeper_state.rewards_nonce).unwrap();
        vault.deposit(100).unwrap();
    }

    #[test]
    fn first_registration_snapshots_the_keeper_round() {
        let mut vault = vault();
        vault.deposit(64_000_000_000).unwrap();
        assert_eq!(vault.register_validators(2, 7).unwrap(), 2 * VALIDATOR_DEPOSIT);
        assert_eq!(vault.rewards_nonce, 7);

        vault.register_validators(1, 9).unwrap();
        assert_eq!(vault.rewards_nonce, 7);
        assert_eq!(vault.validators_count, 3);
    }

    proptest! {
        #[test]
        fn conversions_never_favor_the_caller(
            total_assets in 1u64..1_000_000_000_000,
            total_shares in 1u64..1_000_000_000_000,
            amount in 0u64..1_000_000,
        ) {
            let vault = Vault { total_assets, total_shares, ..vault() };

            let shares = vault.convert_to_shares(amount, Rounding::Down).unwrap();
            let back = vault.convert_to_assets(shares, Rounding::Down).unwrap();
            prop_assert!(back <= amount);

            let shares_up = vault.convert_to_shares(amount, Rounding::Up).unwrap();
            let back_up = vault.convert_to_assets(shares_up, Rounding::Up).unwrap();
            prop_assert!(back_up >= amount);
        }

        #[test]
        fn exit_queue_conserves_shares(
            deposits in prop::collection::vec(1_000u64..1_000_000, 1..8),
            exits in prop::collection::vec(1u64..500_000, 1..8),
            liquidity in prop::collection::vec(0u64..2_000_000, 1..8),
            profit in -500i64..500_000,
        ) {
            let mut vault = vault();
            let mut holders: Vec<u64> = Vec::new();
            for assets in &deposits {
                holders.push(vault.deposit(*assets).unwrap());
            }
            vault.register_validators(1, 1).unwrap();
            if profit != 0 && vault.total_assets as i64 + profit > 0 {
                vault.apply_total_assets_delta(profit).unwrap();
            }

            let mut exit_queue = empty_queue();
            for (holder, shares) in holders.iter_mut().zip(&exits) {
                let shares = (*shares).min(*holder);
                if shares == 0 {
                    continue;
                }
                vault.enter_exit_queue(shares).unwrap();
                *holder -= shares;
            }

            let mut released: u128 = 0;
            let mut now = 1;
            for balance in liquidity {
                let balance = balance.saturating_add(vault.unclaimed_assets);
                if let Some(batch) = vault.pending_exit_batch(balance, now).unwrap() {
                    released += batch.assets as u128;
                    advance(&mut vault, &mut exit_queue, batch, now);
                }
                now += DEFAULT_EXIT_QUEUE_UPDATE_DELAY;

                // non-queued holder shares plus queued shares cover total shares
                let held: u64 = holders.iter().sum();
                prop_assert!(vault.queued_shares <= vault.total_shares);
                prop_assert!(held + vault.queued_shares <= vault.total_shares);
            }

            let checkpoints = Checkpoints::from_account_data(&exit_queue).unwrap();
            prop_assert_eq!(checkpoints.latest_total_assets(), released);
            prop_assert_eq!(checkpoints.latest_total_tickets(), vault.exited_tickets);
            prop_assert_eq!(vault.unclaimed_assets as u128, released);
        }
    }
}
