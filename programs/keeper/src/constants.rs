// =============================================================================
// Keeper Constants
// =============================================================================

// PDA Seeds
pub const KEEPER_SEED: &[u8] = b"keeper";
pub const REGISTRY_SEED: &[u8] = b"registry";
pub const REWARD_SYNC_SEED: &[u8] = b"reward_sync";
pub const VAULT_ENTRY_SEED: &[u8] = b"vault_entry";

// =============================================================================
// Oracles
// =============================================================================

/// Upper bound on registered oracles (keeps the account size fixed)
pub const MAX_ORACLES: usize = 30;

/// Length of a single `r || s || v` ECDSA signature
pub const SIGNATURE_LENGTH: usize = 65;

/// Length of an Ethereum-style signer address
pub const ORACLE_ADDRESS_LENGTH: usize = 20;

/// Half of the secp256k1 curve order. Signatures with `s` above this value are
/// malleable twins of a valid signature and are rejected.
pub const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

// =============================================================================
// EIP-712 typed data
// =============================================================================

pub const EIP712_DOMAIN_TYPE: &[u8] =
    b"EIP712Domain(string name,string version,uint256 chainId,bytes32 verifyingContract)";
pub const EIP712_DOMAIN_NAME: &[u8] = b"KeeperOracles";
pub const EIP712_DOMAIN_VERSION: &[u8] = b"1";

/// Message every oracle signs to approve a new rewards root
pub const KEEPER_REWARDS_TYPE: &[u8] =
    b"Keeper(bytes32 rewardsRoot,bytes32 rewardsIpfsHash,uint96 nonce)";

// =============================================================================
// Rewards
// =============================================================================

/// First nonce handed out. Zero stays reserved as the "never harvested" marker.
pub const INITIAL_REWARDS_NONCE: u64 = 1;

/// Maximum IPFS hash length accepted with a rewards root
pub const MAX_IPFS_HASH_LENGTH: usize = 64;

/// Upper bound on the root update delay an owner can configure (7 days)
pub const MAX_REWARDS_DELAY: i64 = 7 * 24 * 60 * 60;

// =============================================================================
// Registry
// =============================================================================

pub const MAX_VAULT_IMPLS: usize = 16;
pub const MAX_FACTORIES: usize = 16;
pub const MAX_SUB_VAULTS: usize = 10;
