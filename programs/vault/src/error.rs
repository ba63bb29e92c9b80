// =============================================================================
// Vault Error Codes
// =============================================================================
// Every error aborts the whole instruction, so no partially applied state is
// ever left behind. Callers retry with corrected or fresher inputs.
// =============================================================================

use anchor_lang::prelude::*;

/// All errors the vault program can return.
///
/// Anchor assigns numeric codes starting from 6000 in declaration order.
#[error_code]
pub enum VaultError {
    // =========================================================================
    // Vault State Errors
    // =========================================================================

    /// Redemption is instant only while no validator principal is locked
    #[msg("Vault is collateralized, use the exit queue")]
    Collateralized,

    /// The exit queue only exists for vaults with locked principal
    #[msg("Vault is not collateralized, redeem directly")]
    NotCollateralized,

    /// The vault is two or more reward rounds behind the keeper
    #[msg("Vault must be harvested first")]
    NotHarvested,

    /// A standard vault was updated without harvest parameters while stale
    #[msg("Harvest parameters are required for this vault")]
    MissingHarvestParams,

    /// Meta vaults hold no validators of their own
    #[msg("Operation not supported for this vault kind")]
    InvalidVaultKind,

    // =========================================================================
    // Balance & Amount Errors
    // =========================================================================

    /// Zero assets or shares passed in
    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    /// Conversion rounded down to zero shares
    #[msg("Deposit is too small to mint any shares")]
    ZeroShares,

    /// Deposit would push total assets above the vault capacity
    #[msg("Deposit exceeds vault capacity")]
    CapacityExceeded,

    /// Holder does not own enough shares
    #[msg("Insufficient shares")]
    InsufficientShares,

    /// Not enough liquid, unreserved assets in the vault
    #[msg("Insufficient withdrawable assets")]
    InsufficientAssets,

    /// Result is worse than the caller's minimum
    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,

    /// Validator count must be positive
    #[msg("Invalid validators count")]
    InvalidValidatorsCount,

    // =========================================================================
    // Authorization & Configuration Errors
    // =========================================================================

    #[msg("Unauthorized: caller is not allowed to perform this action")]
    Unauthorized,

    #[msg("Invalid address")]
    InvalidAddress,

    #[msg("Fee percent exceeds 50%")]
    InvalidFeePercent,

    #[msg("Exit queue update delay is out of range")]
    InvalidExitQueueDelay,

    #[msg("Token account mint does not match the vault asset")]
    InvalidAssetMint,

    #[msg("Token account owner is invalid")]
    InvalidTokenAccountOwner,

    #[msg("Token account mint does not match the vault share mint")]
    InvalidShareMint,

    /// Sub-vault list does not fit the vault kind
    #[msg("Invalid sub-vaults for this vault kind")]
    InvalidSubVaults,

    // =========================================================================
    // Exit Queue Errors
    // =========================================================================

    /// Checkpoint index does not cover the position ticket
    #[msg("Invalid checkpoint index")]
    InvalidCheckpointIndex,

    /// The claim delay after entering the queue has not passed yet
    #[msg("Exit request cannot be claimed yet")]
    ClaimTooEarly,

    /// Checkpoint region is misaligned or out of step with the vault
    #[msg("Exit queue data is inconsistent")]
    InvalidExitQueue,

    // =========================================================================
    // Math Errors
    // =========================================================================

    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Math underflow")]
    MathUnderflow,

    /// A conversion would price assets against an empty side
    #[msg("Division by zero")]
    DivisionByZero,
}
