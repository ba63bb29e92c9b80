// =============================================================================
// Rewards Merkle Tree
// =============================================================================
// Oracles publish one root per rewards round. Each leaf commits to a single
// vault's cumulative reward:
//
//   leaf = keccak(keccak(vault || int256(reward)))
//
// The double hash keeps a 64-byte inner node from ever being accepted as a
// leaf. Inner nodes hash the sorted pair, so proofs carry no left/right flags.
// =============================================================================

use anchor_lang::prelude::*;
use solana_keccak_hasher as keccak;

pub type NodeHash = [u8; 32];

/// Big-endian two's complement encoding of `value` as a 256-bit integer
pub fn encode_int256(value: i64) -> [u8; 32] {
    let fill = if value < 0 { 0xff } else { 0x00 };
    let mut word = [fill; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Leaf committing to `(vault, reward)` in the rewards tree
pub fn rewards_leaf(vault: &Pubkey, reward: i64) -> NodeHash {
    let inner = keccak::hashv(&[vault.as_ref(), encode_int256(reward).as_ref()]).to_bytes();
    keccak::hashv(&[inner.as_ref()]).to_bytes()
}

pub fn hash_pair(a: &NodeHash, b: &NodeHash) -> NodeHash {
    if a <= b {
        keccak::hashv(&[a.as_ref(), b.as_ref()]).to_bytes()
    } else {
        keccak::hashv(&[b.as_ref(), a.as_ref()]).to_bytes()
    }
}

/// Walks the proof from `leaf` up to the root it implies
pub fn process_proof(proof: &[NodeHash], leaf: NodeHash) -> NodeHash {
    proof
        .iter()
        .fold(leaf, |computed, sibling| hash_pair(&computed, sibling))
}

pub fn verify(proof: &[NodeHash], root: &NodeHash, leaf: NodeHash) -> bool {
    process_proof(proof, leaf) == *root
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds all levels of a sorted-pair tree. Odd nodes are carried up unchanged.
    pub(crate) fn build_levels(leaves: &[NodeHash]) -> Vec<Vec<NodeHash>> {
        let mut levels = vec![leaves.to_vec()];
        while levels.last().map(|l| l.len()).unwrap_or(0) > 1 {
            let current = levels.last().unwrap();
            let next = current
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => hash_pair(a, b),
                    [a] => *a,
                    _ => unreachable!(),
                })
                .collect();
            levels.push(next);
        }
        levels
    }

    pub(crate) fn root_of(leaves: &[NodeHash]) -> NodeHash {
        build_levels(leaves).last().unwrap()[0]
    }

    pub(crate) fn proof_for(leaves: &[NodeHash], index: usize) -> Vec<NodeHash> {
        let levels = build_levels(leaves);
        let mut proof = Vec::new();
        let mut idx = index;
        for level in &levels[..levels.len() - 1] {
            let sibling = idx ^ 1;
            if sibling < level.len() {
                proof.push(level[sibling]);
            }
            idx /= 2;
        }
        proof
    }

    #[test]
    fn int256_encoding_sign_extends() {
        let positive = encode_int256(258);
        assert_eq!(&positive[..30], &[0u8; 30]);
        assert_eq!(&positive[30..], &[0x01, 0x02]);

        let negative = encode_int256(-1);
        assert_eq!(negative, [0xff; 32]);

        let min = encode_int256(i64::MIN);
        assert_eq!(&min[..24], &[0xff; 24]);
        assert_eq!(min[24], 0x80);
    }

    #[test]
    fn leaf_depends_on_vault_and_reward() {
        let vault = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        assert_ne!(rewards_leaf(&vault, 10), rewards_leaf(&vault, 11));
        assert_ne!(rewards_leaf(&vault, 10), rewards_leaf(&other, 10));
        assert_ne!(rewards_leaf(&vault, 10), rewards_leaf(&vault, -10));
    }

    #[test]
    fn every_leaf_of_a_tree_verifies() {
        let vaults: Vec<Pubkey> = (0..5).map(|_| Pubkey::new_unique()).collect();
        let leaves: Vec<NodeHash> = vaults
            .iter()
            .enumerate()
            .map(|(i, v)| rewards_leaf(v, (i as i64 - 2) * 1_000))
            .collect();
        let root = root_of(&leaves);

        for (i, leaf) in leaves.iter().enumerate() {
            let proof = proof_for(&leaves, i);
            assert!(verify(&proof, &root, *leaf), "leaf {i} failed");
        }
    }

    #[test]
    fn wrong_reward_or_tampered_proof_is_rejected() {
        let vaults: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        let leaves: Vec<NodeHash> = vaults.iter().map(|v| rewards_leaf(v, 500)).collect();
        let root = root_of(&leaves);
        let proof = proof_for(&leaves, 2);

        assert!(verify(&proof, &root, rewards_leaf(&vaults[2], 500)));
        assert!(!verify(&proof, &root, rewards_leaf(&vaults[2], 501)));

        let mut tampered = proof.clone();
        tampered[0][0] ^= 1;
        assert!(!verify(&tampered, &root, rewards_leaf(&vaults[2], 500)));
    }

    #[test]
    fn inner_node_is_not_a_valid_leaf() {
        let vaults: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        let leaves: Vec<NodeHash> = vaults.iter().map(|v| rewards_leaf(v, 1)).collect();
        let levels = build_levels(&leaves);
        let root = root_of(&leaves);
        let inner = levels[1][0];
        // proof for the inner node is just its sibling at level 1
        assert!(verify(&[levels[1][1]], &root, inner));
        // but no (vault, reward) pair hashes to it as a leaf
        assert_ne!(rewards_leaf(&vaults[0], 1), inner);
    }
}
