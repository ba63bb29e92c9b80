// =============================================================================
// Oracle Signatures (EIP-712 over secp256k1)
// =============================================================================
// Oracles sign off-chain with Ethereum tooling, so the keeper rebuilds the
// EIP-712 digest on-chain and recovers each signer with the secp256k1 syscall.
// =============================================================================

use anchor_lang::prelude::*;
use solana_keccak_hasher as keccak;
use solana_secp256k1_recover::secp256k1_recover;

use crate::constants::*;
use crate::error::KeeperError;

/// Ethereum-style address of an oracle (last 20 bytes of keccak(pubkey))
pub type OracleAddress = [u8; ORACLE_ADDRESS_LENGTH];

fn keccak(data: &[u8]) -> [u8; 32] {
    keccak::hash(data).to_bytes()
}

fn encode_uint256(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Domain separator binding signatures to one chain and one keeper deployment
pub fn domain_separator(chain_id: u64, verifying_contract: &Pubkey) -> [u8; 32] {
    keccak::hashv(&[
        keccak(EIP712_DOMAIN_TYPE).as_ref(),
        keccak(EIP712_DOMAIN_NAME).as_ref(),
        keccak(EIP712_DOMAIN_VERSION).as_ref(),
        encode_uint256(chain_id).as_ref(),
        verifying_contract.as_ref(),
    ])
    .to_bytes()
}

/// `hashStruct(Keeper(rewardsRoot, rewardsIpfsHash, nonce))`
pub fn rewards_root_struct_hash(rewards_root: &[u8; 32], ipfs_hash: &str, nonce: u64) -> [u8; 32] {
    keccak::hashv(&[
        keccak(KEEPER_REWARDS_TYPE).as_ref(),
        rewards_root.as_ref(),
        keccak(ipfs_hash.as_bytes()).as_ref(),
        encode_uint256(nonce).as_ref(),
    ])
    .to_bytes()
}

/// Final `\x19\x01 || domainSeparator || structHash` digest that oracles sign
pub fn typed_data_digest(domain_separator: &[u8; 32], struct_hash: &[u8; 32]) -> [u8; 32] {
    keccak::hashv(&[b"\x19\x01".as_ref(), domain_separator.as_ref(), struct_hash.as_ref()])
        .to_bytes()
}

/// Digest for approving `rewards_root` at `nonce`
pub fn rewards_root_digest(
    chain_id: u64,
    verifying_contract: &Pubkey,
    rewards_root: &[u8; 32],
    ipfs_hash: &str,
    nonce: u64,
) -> [u8; 32] {
    typed_data_digest(
        &domain_separator(chain_id, verifying_contract),
        &rewards_root_struct_hash(rewards_root, ipfs_hash, nonce),
    )
}

/// Address derived from a 64-byte uncompressed public key (without the 0x04 tag)
pub fn oracle_address(pubkey: &[u8; 64]) -> OracleAddress {
    let hash = keccak(pubkey);
    let mut address = [0u8; ORACLE_ADDRESS_LENGTH];
    address.copy_from_slice(&hash[32 - ORACLE_ADDRESS_LENGTH..]);
    address
}

/// Recovers the signer of a 65-byte `r || s || v` signature over `digest`
pub fn recover_signer(digest: &[u8; 32], signature: &[u8]) -> Result<OracleAddress> {
    require!(
        signature.len() == SIGNATURE_LENGTH,
        KeeperError::InvalidSignaturesLength
    );

    // Reject the high-s twin of every signature
    require!(
        signature[32..64] <= SECP256K1_HALF_ORDER[..],
        KeeperError::InvalidSignature
    );

    let recovery_id = match signature[64] {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return err!(KeeperError::InvalidSignature),
    };

    let pubkey = secp256k1_recover(digest, recovery_id, &signature[..64])
        .map_err(|_| error!(KeeperError::InvalidSignature))?;

    Ok(oracle_address(&pubkey.to_bytes()))
}
