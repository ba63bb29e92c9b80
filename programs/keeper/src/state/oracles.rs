use anchor_lang::prelude::*;

use crate::constants::{MAX_ORACLES, SIGNATURE_LENGTH};
use crate::error::KeeperError;
use crate::signatures::{recover_signer, OracleAddress};

/// The set of off-chain signers allowed to approve rewards roots, plus the
/// number of distinct signatures needed for a quorum.
///
/// Invariant after every mutation: `1 <= required_oracles <= oracles.len()`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default, Debug, PartialEq, Eq, InitSpace)]
pub struct OracleSet {
    /// Minimum number of distinct oracle signatures
    pub required_oracles: u8,

    /// Registered oracle addresses
    #[max_len(MAX_ORACLES)]
    pub oracles: Vec<[u8; 20]>,
}

impl OracleSet {
    pub fn new(oracles: Vec<OracleAddress>, required_oracles: u8) -> Result<Self> {
        let mut set = Self::default();
        for oracle in oracles {
            set.add_oracle(oracle)?;
        }
        set.set_required_oracles(required_oracles)?;
        Ok(set)
    }

    pub fn total_oracles(&self) -> u8 {
        self.oracles.len() as u8
    }

    pub fn is_oracle(&self, oracle: &OracleAddress) -> bool {
        self.oracles.contains(oracle)
    }

    pub fn add_oracle(&mut self, oracle: OracleAddress) -> Result<()> {
        require!(oracle != [0u8; 20], KeeperError::InvalidOracleAddress);
        require!(!self.is_oracle(&oracle), KeeperError::OracleAlreadyAdded);
        require!(
            self.oracles.len() < MAX_ORACLES,
            KeeperError::MaxOraclesExceeded
        );
        self.oracles.push(oracle);
        Ok(())
    }

    /// Removes an oracle, lowering the threshold when it would exceed the
    /// remaining oracle count. The last oracle can never be removed.
    pub fn remove_oracle(&mut self, oracle: &OracleAddress) -> Result<()> {
        let position = self
            .oracles
            .iter()
            .position(|o| o == oracle)
            .ok_or(KeeperError::OracleNotFound)?;

        let remaining = self.oracles.len() - 1;
        require!(remaining > 0, KeeperError::InvalidRequiredOracles);

        self.oracles.swap_remove(position);
        if (self.required_oracles as usize) > remaining {
            self.required_oracles = remaining as u8;
        }
        Ok(())
    }

    pub fn set_required_oracles(&mut self, required_oracles: u8) -> Result<()> {
        require!(
            required_oracles > 0 && required_oracles <= self.total_oracles(),
            KeeperError::InvalidRequiredOracles
        );
        self.required_oracles = required_oracles;
        Ok(())
    }

    /// Checks that the first `required_oracles` signatures in `signatures`
    /// were produced by distinct registered oracles.
    ///
    /// Signers must appear in strictly ascending address order, which rules
    /// out duplicates without a set. Any failure rejects the whole batch.
    pub fn verify_signatures(&self, digest: &[u8; 32], signatures: &[u8]) -> Result<()> {
        require!(self.required_oracles > 0, KeeperError::InvalidRequiredOracles);

        let required = self.required_oracles as usize;
        require!(
            signatures.len() >= required * SIGNATURE_LENGTH,
            KeeperError::InvalidSignaturesLength
        );

        let mut last_oracle: Option<OracleAddress> = None;
        for signature in signatures.chunks_exact(SIGNATURE_LENGTH).take(required) {
            let oracle = recover_signer(digest, signature)?;

            if let Some(last) = last_oracle {
                require!(oracle > last, KeeperError::UnsortedOrDuplicateSigner);
            }
            require!(self.is_oracle(&oracle), KeeperError::InvalidOracle);

            last_oracle = Some(oracle);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::rewards_root_digest;
    use crate::signatures::tests::{oracle_key, sign};

    fn code(err: anchor_lang::error::Error) -> u32 {
        match err {
            anchor_lang::error::Error::AnchorError(e) => e.error_code_number,
            anchor_lang::error::Error::ProgramError(_) => u32::MAX,
        }
    }

    /// Oracle keys sorted by address, as a submitter would order them
    fn sorted_oracles(count: u8) -> Vec<(libsecp256k1::SecretKey, OracleAddress)> {
        let mut keys: Vec<_> = (1..=count).map(oracle_key).collect();
        keys.sort_by(|a, b| a.1.cmp(&b.1));
        keys
    }

    fn concat(signatures: &[[u8; 65]]) -> Vec<u8> {
        signatures.iter().flat_map(|s| s.iter().copied()).collect()
    }

    fn digest() -> [u8; 32] {
        rewards_root_digest(1, &crate::ID, &[0xaa; 32], "QmRoot", 1)
    }

    #[test]
    fn new_set_validates_threshold() {
        let addresses: Vec<OracleAddress> = (1..=3).map(|i| [i; 20]).collect();
        assert!(OracleSet::new(addresses.clone(), 2).is_ok());
        assert_eq!(
            code(OracleSet::new(addresses.clone(), 0).unwrap_err()),
            u32::from(KeeperError::InvalidRequiredOracles)
        );
        assert_eq!(
            code(OracleSet::new(addresses, 4).unwrap_err()),
            u32::from(KeeperError::InvalidRequiredOracles)
        );
    }

    #[test]
    fn add_rejects_duplicates_and_zero_address() {
        let mut set = OracleSet::new(vec![[1; 20]], 1).unwrap();
        assert_eq!(
            code(set.add_oracle([1; 20]).unwrap_err()),
            u32::from(KeeperError::OracleAlreadyAdded)
        );
        assert_eq!(
            code(set.add_oracle([0; 20]).unwrap_err()),
            u32::from(KeeperError::InvalidOracleAddress)
        );
        set.add_oracle([2; 20]).unwrap();
        assert_eq!(set.total_oracles(), 2);
    }

    #[test]
    fn add_stops_at_capacity() {
        let mut set = OracleSet::default();
        for i in 1..=MAX_ORACLES as u8 {
            set.add_oracle([i; 20]).unwrap();
        }
        assert_eq!(
            code(set.add_oracle([0xfe; 20]).unwrap_err()),
            u32::from(KeeperError::MaxOraclesExceeded)
        );
    }

    #[test]
    fn removal_lowers_threshold() {
        let mut set = OracleSet::new(vec![[1; 20], [2; 20], [3; 20]], 3).unwrap();
        set.remove_oracle(&[2; 20]).unwrap();
        assert_eq!(set.total_oracles(), 2);
        assert_eq!(set.required_oracles, 2);
        assert!(!set.is_oracle(&[2; 20]));

        assert_eq!(
            code(set.remove_oracle(&[2; 20]).unwrap_err()),
            u32::from(KeeperError::OracleNotFound)
        );
    }

    #[test]
    fn last_oracle_cannot_be_removed() {
        let mut set = OracleSet::new(vec![[1; 20]], 1).unwrap();
        assert_eq!(
            code(set.remove_oracle(&[1; 20]).unwrap_err()),
            u32::from(KeeperError::InvalidRequiredOracles)
        );
        assert_eq!(set.total_oracles(), 1);
    }

    #[test]
    fn quorum_of_sorted_distinct_oracles_is_accepted() {
        let keys = sorted_oracles(5);
        let set = OracleSet::new(keys.iter().map(|k| k.1).collect(), 5).unwrap();
        let digest = digest();
        let signatures: Vec<[u8; 65]> = keys.iter().map(|k| sign(&k.0, &digest)).collect();

        set.verify_signatures(&digest, &concat(&signatures)).unwrap();
    }

    #[test]
    fn extra_trailing_signatures_are_ignored() {
        let keys = sorted_oracles(4);
        let set = OracleSet::new(keys.iter().map(|k| k.1).collect(), 3).unwrap();
        let digest = digest();
        let mut signatures: Vec<[u8; 65]> = keys.iter().map(|k| sign(&k.0, &digest)).collect();
        // garbage after the quorum is never inspected
        signatures[3] = [0u8; 65];

        set.verify_signatures(&digest, &concat(&signatures)).unwrap();
    }

    #[test]
    fn one_signature_short_of_quorum_is_rejected() {
        let keys = sorted_oracles(5);
        let set = OracleSet::new(keys.iter().map(|k| k.1).collect(), 5).unwrap();
        let digest = digest();
        let signatures: Vec<[u8; 65]> = keys[..4].iter().map(|k| sign(&k.0, &digest)).collect();

        assert_eq!(
            code(set.verify_signatures(&digest, &concat(&signatures)).unwrap_err()),
            u32::from(KeeperError::InvalidSignaturesLength)
        );
    }

    #[test]
    fn repeated_signer_rejects_the_whole_batch() {
        let keys = sorted_oracles(5);
        let set = OracleSet::new(keys.iter().map(|k| k.1).collect(), 5).unwrap();
        let digest = digest();
        let mut signatures: Vec<[u8; 65]> = keys.iter().map(|k| sign(&k.0, &digest)).collect();
        // five signatures, but the third oracle signs twice
        signatures[3] = signatures[2];

        assert_eq!(
            code(set.verify_signatures(&digest, &concat(&signatures)).unwrap_err()),
            u32::from(KeeperError::UnsortedOrDuplicateSigner)
        );
    }

    #[test]
    fn descending_order_is_rejected() {
        let keys = sorted_oracles(3);
        let set = OracleSet::new(keys.iter().map(|k| k.1).collect(), 3).unwrap();
        let digest = digest();
        let mut signatures: Vec<[u8; 65]> = keys.iter().map(|k| sign(&k.0, &digest)).collect();
        signatures.swap(0, 1);

        assert_eq!(
            code(set.verify_signatures(&digest, &concat(&signatures)).unwrap_err()),
            u32::from(KeeperError::UnsortedOrDuplicateSigner)
        );
    }

    #[test]
    fn unregistered_signer_is_rejected() {
        let keys = sorted_oracles(3);
        let set = OracleSet::new(keys[..2].iter().map(|k| k.1).collect(), 2).unwrap();
        let digest = digest();
        // sign with a key that is not in the set, in sorted position
        let mut signers: Vec<_> = vec![keys[0].clone(), keys[2].clone()];
        signers.sort_by(|a, b| a.1.cmp(&b.1));
        let signatures: Vec<[u8; 65]> = signers.iter().map(|k| sign(&k.0, &digest)).collect();

        assert_eq!(
            code(set.verify_signatures(&digest, &concat(&signatures)).unwrap_err()),
            u32::from(KeeperError::InvalidOracle)
        );
    }

    #[test]
    fn signatures_over_another_nonce_do_not_count() {
        let keys = sorted_oracles(2);
        let set = OracleSet::new(keys.iter().map(|k| k.1).collect(), 2).unwrap();
        let stale = rewards_root_digest(1, &crate::ID, &[0xaa; 32], "QmRoot", 0);
        let signatures: Vec<[u8; 65]> = keys.iter().map(|k| sign(&k.0, &stale)).collect();

        assert!(set.verify_signatures(&digest(), &concat(&signatures)).is_err());
    }

    use proptest::prelude::*;

    proptest! {
        /// Any mix of add, remove and threshold changes keeps
        /// 1 <= required_oracles <= total_oracles
        #[test]
        fn threshold_stays_within_set(
            ops in prop::collection::vec((0u8..3, 1u8..12), 1..60)
        ) {
            let mut set = OracleSet::new(vec![[1; 20]], 1).unwrap();
            for (op, arg) in ops {
                let _ = match op {
                    0 => set.add_oracle([arg; 20]),
                    1 => set.remove_oracle(&[arg; 20]),
                    _ => set.set_required_oracles(arg),
                };
                prop_assert!(set.required_oracles >= 1);
                prop_assert!(set.required_oracles <= set.total_oracles());
            }
        }
    }
}
