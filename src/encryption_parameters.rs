//! Verifiable generation of encryption parameters.
//!
//! `(p, q, g)` are derived deterministically from a seed with SHAKE-128 and
//! Miller-Rabin, so any party can re-run the derivation and check the
//! published group. The security level fixes the primality certainty and
//! the bit length of `p`.

use num_bigint::BigUint;
use num_traits::One;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::conversions::{bit_length, integer_to_byte_array, string_to_byte_array};
use crate::errors::CryptoError;
use crate::group::{GqElement, GqGroup, GroupVector};
use crate::hashing::shake128;
use crate::math::is_probable_prime;

const LOG_TARGET: &str = "mixnet_primitives::encryption_parameters";

/// Security levels and their (certainty, bit length of p) pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityLevel {
    TestingOnly,
    Default,
    Extended,
}

impl SecurityLevel {
    /// Miller-Rabin certainty used during parameter derivation.
    pub fn strength(&self) -> u32 {
        match self {
            SecurityLevel::TestingOnly => 16,
            SecurityLevel::Default => 112,
            SecurityLevel::Extended => 128,
        }
    }

    /// Bit length of the safe prime `p`.
    pub fn bit_length(&self) -> usize {
        match self {
            SecurityLevel::TestingOnly => 48,
            SecurityLevel::Default => 2048,
            SecurityLevel::Extended => 3072,
        }
    }
}

/// Derives the group `(p, q, g)` from `seed`, deterministically in
/// `(seed, level)`.
///
/// Counter-indexed SHAKE-128 output is shaped into an odd candidate `q` of
/// `bit_length - 1` bits; the first counter for which both `q` and
/// `2q + 1` pass Miller-Rabin wins. The generator is the smallest of
/// `{2, 3, 4}` lying in the subgroup.
pub fn get_encryption_parameters(
    seed: &str,
    level: SecurityLevel,
) -> Result<GqGroup, CryptoError> {
    if seed.is_empty() {
        return Err(CryptoError::invalid_argument(
            "the parameter seed must not be empty",
        ));
    }
    let certainty = level.strength();
    let q_byte_length = level.bit_length() / 8;
    let seed_bytes = string_to_byte_array(seed);
    let mut rng = OsRng;

    let mut counter = BigUint::from(0u8);
    let q = loop {
        let mut message = seed_bytes.clone();
        message.extend_from_slice(&integer_to_byte_array(&counter));
        let q_hat = shake128(&message, q_byte_length);

        let mut q_bytes = Vec::with_capacity(q_byte_length + 1);
        q_bytes.push(0x01);
        q_bytes.extend_from_slice(&q_hat);
        let mut candidate = BigUint::from_bytes_be(&q_bytes) >> 2usize;
        // Make the candidate odd.
        candidate = &candidate + BigUint::one() - (&candidate % 2u8);

        let p_candidate = (&candidate << 1usize) + BigUint::one();
        if is_probable_prime(&candidate, certainty, &mut rng)
            && is_probable_prime(&p_candidate, certainty, &mut rng)
        {
            tracing::debug!(
                target: LOG_TARGET,
                counter = %counter,
                "found safe-prime pair during parameter derivation"
            );
            break candidate;
        }
        counter += BigUint::one();
    };

    let p = (&q << 1usize) + BigUint::one();
    let g = [2u8, 3, 4]
        .into_iter()
        .map(BigUint::from)
        .find(|g| g.modpow(&q, &p).is_one())
        .expect("one of 2, 3, 4 is always a quadratic residue modulo a safe prime");

    GqGroup::new(p, q, g)
}

/// The first `count` primes in `[5, 10^4)` that are members of `group`,
/// in increasing order. Hosts use them to encode voting options.
pub fn get_small_prime_group_members(
    group: &GqGroup,
    count: usize,
) -> Result<GroupVector<GqElement>, CryptoError> {
    if count == 0 {
        return Err(CryptoError::invalid_argument(
            "the number of requested prime group members must be strictly positive",
        ));
    }
    let mut members = Vec::with_capacity(count);
    let mut candidate = 5u32;
    while members.len() < count && candidate < 10_000 {
        if is_small_prime(candidate) {
            let value = BigUint::from(candidate);
            if &value < group.p() && group.is_group_member(&value) {
                members.push(GqElement::from_value(value, group.clone())?);
            }
        }
        candidate += 2;
    }
    if members.len() < count {
        return Err(CryptoError::invalid_argument(format!(
            "found only {} prime group members below 10^4, requested {count}",
            members.len()
        )));
    }
    GroupVector::try_from_elements(members)
}

fn is_small_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}
