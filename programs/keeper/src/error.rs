use anchor_lang::prelude::*;

#[error_code]
pub enum KeeperError {
    // Oracle Configuration Errors (6000-6009)
    #[msg("Oracle is already registered")]
    OracleAlreadyAdded,

    #[msg("Oracle is not registered")]
    OracleNotFound,

    #[msg("Maximum number of oracles reached")]
    MaxOraclesExceeded,

    #[msg("Required oracles must be non-zero and not exceed total oracles")]
    InvalidRequiredOracles,

    #[msg("Invalid oracle address")]
    InvalidOracleAddress,

    // Signature Errors (6010-6019)
    #[msg("Not enough signature bytes for the required oracles")]
    InvalidSignaturesLength,

    #[msg("Signature could not be recovered")]
    InvalidSignature,

    #[msg("Recovered signer is not a registered oracle")]
    InvalidOracle,

    #[msg("Signers must be unique and sorted in ascending order")]
    UnsortedOrDuplicateSigner,

    // Rewards Errors (6020-6029)
    #[msg("Rewards root is unchanged")]
    RewardsRootUnchanged,

    #[msg("Rewards root update is too early")]
    TooEarlyUpdate,

    #[msg("IPFS hash is empty or too long")]
    InvalidIpfsHash,

    #[msg("Merkle proof does not match the rewards root")]
    InvalidProof,

    #[msg("Rewards root has not been set yet")]
    RewardsRootNotSet,

    #[msg("Sub-vaults report different rewards nonces")]
    SubVaultsNonceMismatch,

    #[msg("Sub-vault accounts do not match the registered list")]
    InvalidSubVaults,

    #[msg("Rewards delay exceeds the maximum")]
    InvalidRewardsDelay,

    // Registry Errors (6030-6039)
    #[msg("Vault kind does not support this operation")]
    InvalidVaultKind,

    #[msg("Vault implementation is not approved")]
    UnknownVaultImpl,

    #[msg("Entry already present")]
    AlreadyAdded,

    #[msg("Entry not present")]
    NotFound,

    #[msg("Registry list is full")]
    RegistryFull,

    // Authorization Errors (6040-6049)
    #[msg("Unauthorized: owner only")]
    Unauthorized,

    #[msg("Invalid address")]
    InvalidAddress,

    // Math Errors (6050-6059)
    #[msg("Math overflow")]
    MathOverflow,

    #[msg("Math underflow")]
    MathUnderflow,
}
