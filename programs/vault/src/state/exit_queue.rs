// =============================================================================
// Exit Queue Ledger
// =============================================================================
// Append-only list of checkpoints kept as a raw region behind a zero-copy
// header:
//
//   [discriminator | ExitQueue | checkpoint 0 | checkpoint 1 | ...]
//
// Each checkpoint is 32 bytes: the cumulative number of tickets (queued
// shares) burned and the cumulative assets released, both u128 little-endian.
// The account grows by one checkpoint each time the queue advances and is
// never deserialized as a whole; lookups decode single records in place.
//
// A position entering the queue gets a ticket equal to the cumulative ticket
// count at entry, and its shares occupy the ticket range
// [ticket, ticket + shares). Checkpoint `i` covers the range
// [total_tickets(i - 1), total_tickets(i)).
// =============================================================================

use anchor_lang::prelude::*;

use crate::error::VaultError;

/// Cumulative exit queue totals at the time the checkpoint was appended
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checkpoint {
    /// Tickets burned since the queue started
    pub total_tickets: u128,

    /// Assets released since the queue started
    pub total_assets: u128,
}

impl Checkpoint {
    pub const SIZE: usize = 16 + 16;

    fn read(bytes: &[u8]) -> Self {
        let mut total_tickets = [0u8; 16];
        let mut total_assets = [0u8; 16];
        total_tickets.copy_from_slice(&bytes[..16]);
        total_assets.copy_from_slice(&bytes[16..Self::SIZE]);

        Self {
            total_tickets: u128::from_le_bytes(total_tickets),
            total_assets: u128::from_le_bytes(total_assets),
        }
    }

    fn write(&self, bytes: &mut [u8]) {
        bytes[..16].copy_from_slice(&self.total_tickets.to_le_bytes());
        bytes[16..Self::SIZE].copy_from_slice(&self.total_assets.to_le_bytes());
    }

    /// The checkpoint that follows this one after burning `shares` tickets
    /// for `assets`
    pub fn next(&self, shares: u64, assets: u64) -> Result<Checkpoint> {
        require!(shares > 0, VaultError::InvalidAmount);

        Ok(Checkpoint {
            total_tickets: self
                .total_tickets
                .checked_add(shares as u128)
                .ok_or(VaultError::MathOverflow)?,
            total_assets: self
                .total_assets
                .checked_add(assets as u128)
                .ok_or(VaultError::MathOverflow)?,
        })
    }
}

/// Outcome of resolving a position against the ledger
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExitedAssets {
    pub burned_shares: u64,
    pub exited_assets: u64,
}

/// Header of a vault's checkpoint ledger.
/// PDA: ["exit_queue", vault]
///
/// Checkpoints follow the header in the same account; read them through
/// [`Checkpoints`].
#[account(zero_copy(unsafe))]
#[derive(Default, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct ExitQueue {
    /// The vault this ledger belongs to
    pub vault: Pubkey,

    /// Bump seed for this PDA
    pub bump: u8,

    pub _padding: [u8; 7],
}

impl ExitQueue {
    /// Discriminator plus header; the checkpoint region starts here
    pub const HEADER_LEN: usize = 8 + std::mem::size_of::<ExitQueue>();

    /// Account size for `len` checkpoints
    pub const fn space(len: usize) -> usize {
        Self::HEADER_LEN + len * Checkpoint::SIZE
    }

    /// Writes `checkpoint` into the last slot of the account data. The account
    /// must already be resized to hold it.
    pub fn write_last_checkpoint(data: &mut [u8], checkpoint: &Checkpoint) -> Result<()> {
        let len = Checkpoints::from_account_data(data)?.len();
        require!(len > 0, VaultError::InvalidExitQueue);

        let offset = Self::space(len - 1);
        checkpoint.write(&mut data[offset..offset + Checkpoint::SIZE]);
        Ok(())
    }
}

/// Borrowed view over the checkpoint region of an exit queue account
#[derive(Clone, Copy, Debug)]
pub struct Checkpoints<'a> {
    region: &'a [u8],
}

impl<'a> Checkpoints<'a> {
    /// Wraps the full account data, discriminator included
    pub fn from_account_data(data: &'a [u8]) -> Result<Self> {
        require!(
            data.len() >= ExitQueue::HEADER_LEN
                && (data.len() - ExitQueue::HEADER_LEN) % Checkpoint::SIZE == 0,
            VaultError::InvalidExitQueue
        );
        Ok(Self {
            region: &data[ExitQueue::HEADER_LEN..],
        })
    }

    pub fn len(&self) -> usize {
        self.region.len() / Checkpoint::SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Decodes checkpoint `idx` straight from the account data
    pub fn get(&self, idx: usize) -> Option<Checkpoint> {
        let start = idx.checked_mul(Checkpoint::SIZE)?;
        let bytes = self.region.get(start..start + Checkpoint::SIZE)?;
        Some(Checkpoint::read(bytes))
    }

    /// Latest checkpoint, or zero totals for an empty queue
    pub fn latest(&self) -> Checkpoint {
        self.len()
            .checked_sub(1)
            .and_then(|idx| self.get(idx))
            .unwrap_or_default()
    }

    pub fn latest_total_tickets(&self) -> u128 {
        self.latest().total_tickets
    }

    pub fn latest_total_assets(&self) -> u128 {
        self.latest().total_assets
    }

    /// Index of the first checkpoint covering `position_ticket`, if any.
    /// Binary search over the cumulative ticket counts.
    pub fn checkpoint_index(&self, position_ticket: u128) -> Option<usize> {
        let (mut low, mut high) = (0usize, self.len());
        while low < high {
            let mid = low + (high - low) / 2;
            let checkpoint = self.get(mid)?;
            if checkpoint.total_tickets <= position_ticket {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        (low < self.len()).then_some(low)
    }

    /// Resolves how many of a position's shares have exited and for how many
    /// assets, starting from a caller-supplied checkpoint index.
    ///
    /// An index past the end means nothing is resolved yet. An index that does
    /// not contain `position_ticket` is rejected. Each checkpoint pays its own
    /// assets-per-ticket rate, rounded down.
    pub fn calculate_exited_assets(
        &self,
        position_ticket: u128,
        position_shares: u64,
        checkpoint_idx: usize,
    ) -> Result<ExitedAssets> {
        let Some(first) = self.get(checkpoint_idx) else {
            return Ok(ExitedAssets::default());
        };
        if position_shares == 0 {
            return Ok(ExitedAssets::default());
        }

        let prev = match checkpoint_idx {
            0 => Checkpoint::default(),
            i => self.get(i - 1).ok_or(VaultError::InvalidCheckpointIndex)?,
        };
        require!(
            prev.total_tickets <= position_ticket && position_ticket < first.total_tickets,
            VaultError::InvalidCheckpointIndex
        );

        let position_end = position_ticket
            .checked_add(position_shares as u128)
            .ok_or(VaultError::MathOverflow)?;
        let (mut prev_tickets, mut prev_assets) = (prev.total_tickets, prev.total_assets);
        let mut cursor = position_ticket;
        let mut burned_shares: u128 = 0;
        let mut exited_assets: u128 = 0;

        for idx in checkpoint_idx..self.len() {
            if cursor >= position_end {
                break;
            }
            let checkpoint = self.get(idx).ok_or(VaultError::InvalidExitQueue)?;

            let checkpoint_tickets = checkpoint
                .total_tickets
                .checked_sub(prev_tickets)
                .ok_or(VaultError::MathUnderflow)?;
            let checkpoint_assets = checkpoint
                .total_assets
                .checked_sub(prev_assets)
                .ok_or(VaultError::MathUnderflow)?;

            let shares = position_end
                .min(checkpoint.total_tickets)
                .checked_sub(cursor)
                .ok_or(VaultError::MathUnderflow)?;
            let assets = shares
                .checked_mul(checkpoint_assets)
                .ok_or(VaultError::MathOverflow)?
                .checked_div(checkpoint_tickets)
                .ok_or(VaultError::DivisionByZero)?;

            burned_shares = burned_shares
                .checked_add(shares)
                .ok_or(VaultError::MathOverflow)?;
            exited_assets = exited_assets
                .checked_add(assets)
                .ok_or(VaultError::MathOverflow)?;

            cursor = cursor.checked_add(shares).ok_or(VaultError::MathOverflow)?;
            prev_tickets = checkpoint.total_tickets;
            prev_assets = checkpoint.total_assets;
        }

        Ok(ExitedAssets {
            burned_shares: u64::try_from(burned_shares).map_err(|_| VaultError::MathOverflow)?,
            exited_assets: u64::try_from(exited_assets).map_err(|_| VaultError::MathOverflow)?,
        })
    }
}
