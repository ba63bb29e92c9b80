// =============================================================================
// Vault Protocol Constants
// =============================================================================
// Fixed protocol parameters for liquid staking vaults. Runtime settings (fee,
// capacity, fee recipient, exit queue delay) live on the Vault account and are
// changed through admin instructions.
// =============================================================================

// =============================================================================
// FEES (in basis points - 1 BPS = 0.01%)
// =============================================================================

/// Total basis points (100%) - denominator in fee calculations
/// Example: fee_assets = profit * fee_percent / BPS_DENOMINATOR
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Highest performance fee an admin can configure (50%). Fee shares are priced
/// against the assets left after the fee, which must stay positive even when a
/// profit lands on a vault that lost everything.
pub const MAX_FEE_PERCENT: u16 = 5_000;

// =============================================================================
// DEPOSITS
// =============================================================================

/// Assets the creator deposits at initialization. The shares are credited to
/// the vault itself and can never be redeemed, so the share price can't be
/// inflated by a tiny first deposit followed by a donation.
pub const SECURITY_DEPOSIT: u64 = 1_000_000_000;

/// Principal locked per validator when it is registered
pub const VALIDATOR_DEPOSIT: u64 = 32_000_000_000;

/// Capacity value meaning "no limit"
pub const UNLIMITED_CAPACITY: u64 = u64::MAX;

// =============================================================================
// EXIT QUEUE
// =============================================================================

/// Seconds after entering the exit queue before a request can be claimed (24h)
pub const EXIT_CLAIM_DELAY: i64 = 24 * 60 * 60;

/// Default minimum seconds between two exit queue checkpoints (12h)
pub const DEFAULT_EXIT_QUEUE_UPDATE_DELAY: i64 = 12 * 60 * 60;

/// Upper bound an admin-chosen exit queue delay can take (7 days)
pub const MAX_EXIT_QUEUE_UPDATE_DELAY: i64 = 7 * 24 * 60 * 60;

/// Remaining shares at or below this amount close an exit request instead of
/// leaving a successor behind
pub const EXIT_REQUEST_DUST: u64 = 1;

// =============================================================================
// SCHEMA
// =============================================================================

/// Layout version written into every new Vault account
pub const VAULT_VERSION: u8 = 1;

// =============================================================================
// PDA SEEDS
// =============================================================================

/// Seed for the Vault account PDA
/// Full seed: ["vault", creator_pubkey, vault_id_le]
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for the token account holding the vault's liquid assets
/// Full seed: ["vault_assets", vault_pubkey]
pub const VAULT_ASSETS_SEED: &[u8] = b"vault_assets";

/// Seed for the exit queue checkpoint ledger
/// Full seed: ["exit_queue", vault_pubkey]
pub const EXIT_QUEUE_SEED: &[u8] = b"exit_queue";

/// Seed for the vault share mint
/// Full seed: ["share_mint", vault_pubkey]
pub const SHARE_MINT_SEED: &[u8] = b"share_mint";

/// Seed for per-user deposit and withdrawal statistics
/// Full seed: ["depositor", vault_pubkey, owner_pubkey]
pub const DEPOSITOR_SEED: &[u8] = b"depositor";

/// Seed for exit requests
/// Full seed: ["exit_request", vault_pubkey, receiver_pubkey, entry_ticket_le]
pub const EXIT_REQUEST_SEED: &[u8] = b"exit_request";
