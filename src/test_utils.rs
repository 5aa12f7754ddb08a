//! Shared fixtures for unit tests: a small safe-prime group, deterministic
//! randomness and a short-output hash service matching its order.

use num_bigint::BigUint;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::elgamal::{
    ElGamalKeyPair, ElGamalMultiRecipientCiphertext, ElGamalMultiRecipientMessage,
};
use crate::group::{GqElement, GqGroup, GroupVector, ZqElement, ZqGroup};
use crate::hashing::HashService;
use crate::pedersen::CommitmentKey;
use crate::random::RandomService;

/// A test group with `p = 2039`, `q = 1019`, `g = 2`; 2039 and 1019 are a
/// safe-prime pair and 2039 ≡ 7 (mod 8) makes 2 a quadratic residue.
pub fn test_group() -> GqGroup {
    GqGroup::new(
        BigUint::from(2039u16),
        BigUint::from(1019u16),
        BigUint::from(2u8),
    )
    .unwrap()
}

pub fn test_zq() -> ZqGroup {
    ZqGroup::same_order_as(&test_group())
}

/// A short-output hash service satisfying the hash-length guard for the
/// 10-bit order of [`test_group`].
pub fn test_hash() -> HashService {
    HashService::with_hash_length_bits(8)
}

pub fn seeded_random(seed: u64) -> RandomService {
    RandomService::from_rng(ChaCha20Rng::seed_from_u64(seed))
}

/// Everything an argument service needs, derived deterministically.
pub struct TestContext {
    pub group: GqGroup,
    pub zq: ZqGroup,
    pub key_pair: ElGamalKeyPair,
    pub commitment_key: CommitmentKey,
    pub random: RandomService,
    pub hash: HashService,
}

impl TestContext {
    /// `key_size` recipients, commitment key of width `ck_size`.
    pub fn new(seed: u64, key_size: usize, ck_size: usize) -> Self {
        let group = test_group();
        let zq = ZqGroup::same_order_as(&group);
        let random = seeded_random(seed);
        let hash = test_hash();
        let key_pair = ElGamalKeyPair::generate(&group, key_size, &random).unwrap();
        let commitment_key = CommitmentKey::verifiable(&group, ck_size, &hash).unwrap();
        TestContext {
            group,
            zq,
            key_pair,
            commitment_key,
            random,
            hash,
        }
    }

    pub fn zq_element(&self, value: u32) -> ZqElement {
        ZqElement::reduce(&BigUint::from(value), self.zq.clone())
    }

    pub fn zq_vector(&self, values: &[u32]) -> GroupVector<ZqElement> {
        GroupVector::try_from_elements(values.iter().map(|&v| self.zq_element(v)).collect())
            .unwrap()
    }

    /// A group member as a power of the generator.
    pub fn member(&self, exponent: u32) -> GqElement {
        self.group
            .generator()
            .exponentiate(&self.zq_element(exponent))
    }

    /// A message of generator powers.
    pub fn message(&self, exponents: &[u32]) -> ElGamalMultiRecipientMessage {
        ElGamalMultiRecipientMessage::new(
            GroupVector::try_from_elements(exponents.iter().map(|&e| self.member(e)).collect())
                .unwrap(),
        )
        .unwrap()
    }

    /// Encrypts `message` with a fresh exponent from the test randomness.
    pub fn encrypt(
        &self,
        message: &ElGamalMultiRecipientMessage,
    ) -> ElGamalMultiRecipientCiphertext {
        let r = self.random.random_exponent(&self.zq).unwrap();
        ElGamalMultiRecipientCiphertext::get_ciphertext(message, &r, self.key_pair.public_key())
            .unwrap()
    }

    /// A vector of `count` fresh ciphertexts of the given size.
    pub fn ciphertexts(
        &self,
        count: usize,
        size: usize,
    ) -> GroupVector<ElGamalMultiRecipientCiphertext> {
        let ciphertexts = (0..count)
            .map(|i| {
                let exponents: Vec<u32> =
                    (0..size).map(|j| (i * size + j) as u32 + 1).collect();
                self.encrypt(&self.message(&exponents))
            })
            .collect::<Vec<_>>();
        GroupVector::try_from_elements(ciphertexts).unwrap()
    }
}
