//! Recursive, domain-separated hashing over algebraic objects.
//!
//! Leaves carry a single-byte domain prefix (`0x00` bytes, `0x01` integer,
//! `0x02` string); a list hashes to the digest of its children's
//! concatenated digests, a singleton list to its only element's digest.
//! The base digest is SHA3-256; variable-length output uses SHAKE-256.

mod hashable;

pub use hashable::{Hashable, ToHashable};

use num_bigint::BigUint;
use num_traits::One;
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Digest, Sha3_256, Shake128, Shake256};

use crate::conversions::{bit_length, integer_to_byte_array, truncate_to_bit_length};
use crate::errors::CryptoError;
use crate::group::{GqElement, GqGroup, ZqElement, ZqGroup};

const LOG_TARGET: &str = "mixnet_primitives::hashing";

const PREFIX_BYTE_ARRAY: u8 = 0x00;
const PREFIX_INTEGER: u8 = 0x01;
const PREFIX_STRING: u8 = 0x02;

/// SHA3-256 output length in bits.
const BASE_DIGEST_BITS: usize = 256;

pub(crate) fn shake128(data: &[u8], output_len: usize) -> Vec<u8> {
    let mut hasher = Shake128::default();
    hasher.update(data);
    let mut output = vec![0u8; output_len];
    hasher.finalize_xof().read(&mut output);
    output
}

fn shake256(data: &[u8], output_len: usize) -> Vec<u8> {
    let mut hasher = Shake256::default();
    hasher.update(data);
    let mut output = vec![0u8; output_len];
    hasher.finalize_xof().read(&mut output);
    output
}

fn sha3_256(data: &[u8]) -> Vec<u8> {
    Sha3_256::digest(data).to_vec()
}

/// Scripted challenge values for transcript-level test vectors: an exact
/// `recursive_hash_to_zq` input returns its table value, anything else the
/// miss value. Lets reference vectors pin a literal challenge while still
/// detecting any divergence in the transcript ordering.
#[cfg(test)]
#[derive(Clone, Debug)]
pub(crate) struct ChallengeScript {
    pub(crate) table: Vec<(Vec<Hashable>, BigUint)>,
    pub(crate) miss: BigUint,
}

/// Recursive hash service.
///
/// The default service hashes with SHA3-256. Proof services check the
/// declared hash length against the group order at construction, so tests
/// over tiny groups instantiate a short-output variant instead.
#[derive(Clone, Debug)]
pub struct HashService {
    hash_length_bits: usize,
    #[cfg(test)]
    challenge_script: Option<ChallengeScript>,
}

impl Default for HashService {
    fn default() -> Self {
        Self::new()
    }
}

impl HashService {
    /// SHA3-256-based service.
    pub fn new() -> Self {
        HashService {
            hash_length_bits: BASE_DIGEST_BITS,
            #[cfg(test)]
            challenge_script: None,
        }
    }

    /// Short-output service for small test groups: every node digest is
    /// SHAKE-256 truncated to `bits` bits.
    pub(crate) fn with_hash_length_bits(bits: usize) -> Self {
        debug_assert!(bits >= 1 && bits < BASE_DIGEST_BITS);
        HashService {
            hash_length_bits: bits,
            #[cfg(test)]
            challenge_script: None,
        }
    }

    /// Short-output service whose `recursive_hash_to_zq` answers from the
    /// given script instead of hashing.
    #[cfg(test)]
    pub(crate) fn with_challenge_script(bits: usize, script: ChallengeScript) -> Self {
        debug_assert!(bits >= 1 && bits < BASE_DIGEST_BITS);
        HashService {
            hash_length_bits: bits,
            challenge_script: Some(script),
        }
    }

    /// Declared output length of the base digest, in bits.
    pub fn hash_length_bits(&self) -> usize {
        self.hash_length_bits
    }

    fn base_digest(&self, data: &[u8]) -> Vec<u8> {
        if self.hash_length_bits == BASE_DIGEST_BITS {
            sha3_256(data)
        } else {
            let bytes = (self.hash_length_bits + 7) / 8;
            truncate_to_bit_length(shake256(data, bytes), self.hash_length_bits)
        }
    }

    /// Domain-separated recursive hash of the given values, treated as a
    /// single list. Rejects empty argument lists and empty nested lists.
    pub fn recursive_hash(&self, values: &[Hashable]) -> Result<Vec<u8>, CryptoError> {
        let digest = self.hash_values(values, &|data| self.base_digest(data))?;
        tracing::trace!(target: LOG_TARGET, digest = %hex::encode(&digest), "recursive hash");
        Ok(digest)
    }

    /// Variable-length recursive hash: SHAKE-256 emitting `⌈bits/8⌉` bytes
    /// with the most-significant byte truncated to `bits mod 8` bits.
    ///
    /// Production callers use `bits ≥ 512`; shorter lengths are allowed so
    /// that small-group scenarios stay expressible.
    pub fn recursive_hash_of_length(
        &self,
        bits: usize,
        values: &[Hashable],
    ) -> Result<Vec<u8>, CryptoError> {
        if bits == 0 {
            return Err(CryptoError::invalid_argument(
                "the requested hash length must be strictly positive",
            ));
        }
        let bytes = (bits + 7) / 8;
        self.hash_values(values, &|data| {
            truncate_to_bit_length(shake256(data, bytes), bits)
        })
    }

    /// Hashes into `Z_q` without modular bias: draws `bitlen(q)`-bit digests
    /// and rehashes with the previous draw prepended until one lands below
    /// `q`. Production callers use groups with `bitlen(q) ≥ 512`.
    pub fn recursive_hash_to_zq(
        &self,
        group: &ZqGroup,
        values: &[Hashable],
    ) -> Result<ZqElement, CryptoError> {
        #[cfg(test)]
        if let Some(script) = &self.challenge_script {
            let value = script
                .table
                .iter()
                .find(|(transcript, _)| transcript.as_slice() == values)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| script.miss.clone());
            return Ok(ZqElement::reduce(&value, group.clone()));
        }
        let value = self.recursive_hash_to_integer_below(group.q(), values)?;
        Ok(ZqElement::new(value, group.clone())?)
    }

    fn recursive_hash_to_integer_below(
        &self,
        bound: &BigUint,
        values: &[Hashable],
    ) -> Result<BigUint, CryptoError> {
        if bound <= &BigUint::one() {
            return Err(CryptoError::invalid_argument(
                "the bound of a hash-to-integer draw must be greater than 1",
            ));
        }
        let bits = bit_length(bound);
        let mut current: Vec<Hashable> = values.to_vec();
        loop {
            let digest = self.recursive_hash_of_length(bits, &current)?;
            let candidate = BigUint::from_bytes_be(&digest);
            if &candidate < bound {
                return Ok(candidate);
            }
            tracing::trace!(target: LOG_TARGET, "hash-to-integer draw above bound, rehashing");
            let mut next = Vec::with_capacity(current.len() + 1);
            next.push(Hashable::Integer(candidate));
            next.extend_from_slice(&current);
            current = next;
        }
    }

    /// Maps an integer to a group member: `r = H_{q-1}(x) + 1`, output
    /// `r² mod p`, which is always a quadratic residue.
    pub fn hash_and_square(
        &self,
        value: &BigUint,
        group: &GqGroup,
    ) -> Result<GqElement, CryptoError> {
        let bound = group.q() - BigUint::one();
        let r = self
            .recursive_hash_to_integer_below(&bound, &[Hashable::Integer(value.clone())])?
            + BigUint::one();
        GqElement::from_square_root(&r, group)
    }

    fn hash_values(
        &self,
        values: &[Hashable],
        digest: &dyn Fn(&[u8]) -> Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError> {
        match values {
            [] => Err(CryptoError::invalid_argument(
                "cannot hash an empty list of values",
            )),
            [single] => self.hash_node(single, digest),
            several => {
                let mut concatenation = Vec::new();
                for value in several {
                    concatenation.extend_from_slice(&self.hash_node(value, digest)?);
                }
                Ok(digest(&concatenation))
            }
        }
    }

    fn hash_node(
        &self,
        value: &Hashable,
        digest: &dyn Fn(&[u8]) -> Vec<u8>,
    ) -> Result<Vec<u8>, CryptoError> {
        match value {
            Hashable::Bytes(bytes) => {
                let mut data = Vec::with_capacity(1 + bytes.len());
                data.push(PREFIX_BYTE_ARRAY);
                data.extend_from_slice(bytes);
                Ok(digest(&data))
            }
            Hashable::Integer(integer) => {
                let encoded = integer_to_byte_array(integer);
                let mut data = Vec::with_capacity(1 + encoded.len());
                data.push(PREFIX_INTEGER);
                data.extend_from_slice(&encoded);
                Ok(digest(&data))
            }
            Hashable::Text(text) => {
                let mut data = Vec::with_capacity(1 + text.len());
                data.push(PREFIX_STRING);
                data.extend_from_slice(text.as_bytes());
                Ok(digest(&data))
            }
            Hashable::List(children) => self.hash_values(children, digest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn service() -> HashService {
        HashService::new()
    }

    #[test]
    fn leaves_are_domain_separated() {
        let service = service();
        // "A" as text, bytes and integer all encode to different digests
        // because of the domain prefix.
        let text = service.recursive_hash(&[Hashable::from_text("A")]).unwrap();
        let bytes = service
            .recursive_hash(&[Hashable::from_bytes(vec![0x41])])
            .unwrap();
        let integer = service
            .recursive_hash(&[Hashable::Integer(BigUint::from(0x41u8))])
            .unwrap();
        assert_ne!(text, bytes);
        assert_ne!(text, integer);
        assert_ne!(bytes, integer);
    }

    #[test]
    fn base_digest_matches_manual_prefixing() {
        let service = service();
        let digest = service
            .recursive_hash(&[Hashable::from_bytes(vec![0xde, 0xad])])
            .unwrap();
        assert_eq!(digest, sha3_256(&[0x00, 0xde, 0xad]));
        assert_eq!(digest.len(), 32);
    }

    #[test]
    fn integer_leaf_uses_minimal_big_endian_encoding() {
        let service = service();
        let digest = service
            .recursive_hash(&[Hashable::Integer(BigUint::from(256u16))])
            .unwrap();
        assert_eq!(digest, sha3_256(&[0x01, 0x01, 0x00]));
        let zero = service
            .recursive_hash(&[Hashable::Integer(BigUint::zero())])
            .unwrap();
        assert_eq!(zero, sha3_256(&[0x01, 0x00]));
    }

    #[test]
    fn singleton_list_equals_its_element() {
        let service = service();
        let element = Hashable::from_text("ballot");
        let direct = service.recursive_hash(&[element.clone()]).unwrap();
        let wrapped = service
            .recursive_hash(&[Hashable::List(vec![element])])
            .unwrap();
        assert_eq!(direct, wrapped);
    }

    #[test]
    fn multi_argument_call_is_a_single_list() {
        let service = service();
        let a = Hashable::from_text("a");
        let b = Hashable::Integer(BigUint::from(7u8));
        let spread = service.recursive_hash(&[a.clone(), b.clone()]).unwrap();
        let listed = service
            .recursive_hash(&[Hashable::List(vec![a, b])])
            .unwrap();
        assert_eq!(spread, listed);
    }

    #[test]
    fn nested_lists_hash_their_children() {
        let service = service();
        let inner = Hashable::List(vec![
            Hashable::from_text("x"),
            Hashable::from_text("y"),
        ]);
        let outer = service
            .recursive_hash(&[inner.clone(), Hashable::from_text("z")])
            .unwrap();
        let inner_digest = service.recursive_hash(&[inner]).unwrap();
        let z_digest = service.recursive_hash(&[Hashable::from_text("z")]).unwrap();
        let expected = sha3_256(&[inner_digest, z_digest].concat());
        assert_eq!(outer, expected);
    }

    #[test]
    fn empty_lists_are_rejected() {
        let service = service();
        assert!(service.recursive_hash(&[]).is_err());
        assert!(service
            .recursive_hash(&[Hashable::List(vec![])])
            .is_err());
        assert!(service
            .recursive_hash(&[Hashable::from_text("ok"), Hashable::List(vec![])])
            .is_err());
    }

    #[test]
    fn variable_length_output_obeys_bit_truncation() {
        let service = service();
        let values = [Hashable::from_text("seed")];
        let digest = service.recursive_hash_of_length(13, &values).unwrap();
        assert_eq!(digest.len(), 2);
        assert!(digest[0] <= 0x1f);
        let full = service.recursive_hash_of_length(512, &values).unwrap();
        assert_eq!(full.len(), 64);
    }

    #[test]
    fn hash_to_zq_lands_below_q_and_is_deterministic() {
        let service = service();
        let zq = ZqGroup::new(BigUint::from(11u8)).unwrap();
        for i in 0u32..20 {
            let values = [Hashable::Integer(BigUint::from(i))];
            let a = service.recursive_hash_to_zq(&zq, &values).unwrap();
            let b = service.recursive_hash_to_zq(&zq, &values).unwrap();
            assert_eq!(a, b);
            assert!(a.value() < zq.q());
        }
    }

    #[test]
    fn hash_and_square_yields_group_members() {
        let service = service();
        let group = GqGroup::new(
            BigUint::from(47u8),
            BigUint::from(23u8),
            BigUint::from(2u8),
        )
        .unwrap();
        for i in 0u32..10 {
            let member = service
                .hash_and_square(&BigUint::from(i), &group)
                .unwrap();
            assert!(group.is_group_member(member.value()));
        }
    }

    #[test]
    fn challenge_script_answers_by_exact_transcript() {
        let transcript = vec![
            Hashable::from_text("a"),
            Hashable::Integer(BigUint::from(7u8)),
        ];
        let service = HashService::with_challenge_script(
            3,
            ChallengeScript {
                table: vec![(transcript.clone(), BigUint::from(8u8))],
                miss: BigUint::from(3u8),
            },
        );
        let zq = ZqGroup::new(BigUint::from(11u8)).unwrap();
        let hit = service.recursive_hash_to_zq(&zq, &transcript).unwrap();
        assert_eq!(hit.value(), &BigUint::from(8u8));
        let other = [Hashable::from_text("b")];
        let miss = service.recursive_hash_to_zq(&zq, &other).unwrap();
        assert_eq!(miss.value(), &BigUint::from(3u8));
    }

    #[test]
    fn short_output_service_respects_declared_length() {
        let service = HashService::with_hash_length_bits(3);
        assert_eq!(service.hash_length_bits(), 3);
        let digest = service
            .recursive_hash(&[Hashable::from_text("tiny")])
            .unwrap();
        assert_eq!(digest.len(), 1);
        assert!(digest[0] < 8);
    }
}
