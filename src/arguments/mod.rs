//! Non-interactive argument services for the verifiable shuffle.
//!
//! Sigma-style Bayer-Groth arguments made non-interactive with Fiat-Shamir
//! challenges. Each service is parameterized by the ElGamal public key, the
//! commitment key, a random source and a hash service; provers are pure
//! with respect to the injected randomness, verifiers are total and return
//! a [`crate::verification::VerificationResult`].
//!
//! The transcript ordering of every challenge hash is fixed in the
//! respective module and shared between prover and verifier; perturbing any
//! hashed component changes the challenge and fails verification.

mod hadamard;
mod multi_exponentiation;
mod product;
mod shuffle;
mod single_value_product;
mod zero;

pub use hadamard::{
    HadamardArgument, HadamardArgumentService, HadamardStatement, HadamardWitness,
};
pub use multi_exponentiation::{
    MultiExponentiationArgument, MultiExponentiationArgumentService,
    MultiExponentiationStatement, MultiExponentiationWitness,
};
pub use product::{ProductArgument, ProductArgumentService, ProductStatement, ProductWitness};
pub use shuffle::{
    ShuffleArgument, ShuffleArgumentService, ShuffleStatement, ShuffleWitness,
};
pub use single_value_product::{
    SingleValueProductArgument, SingleValueProductArgumentService,
    SingleValueProductStatement, SingleValueProductWitness,
};
pub use zero::{ZeroArgument, ZeroArgumentService, ZeroStatement, ZeroWitness};

use crate::conversions::bit_length;
use crate::errors::CryptoError;
use crate::group::HasGroup;
use crate::group::{GqGroup, GroupVector, ZqElement};
use crate::hashing::HashService;

/// Every proof service requires the base digest to be strictly shorter than
/// the group order, so challenge material cannot out-range the exponents.
pub(crate) fn check_hash_length(
    hash: &HashService,
    group: &GqGroup,
) -> Result<(), CryptoError> {
    if hash.hash_length_bits() >= bit_length(group.q()) {
        return Err(CryptoError::precondition(format!(
            "the hash length ({} bits) must be strictly smaller than the group order length ({} bits)",
            hash.hash_length_bits(),
            bit_length(group.q()),
        )));
    }
    Ok(())
}

/// The bilinear form of the zero argument:
/// `(a, b) ↦ Σ_j a_j · b_j · y^{j+1}`.
pub(crate) fn star_map(
    a: &GroupVector<ZqElement>,
    b: &GroupVector<ZqElement>,
    y: &ZqElement,
) -> ZqElement {
    debug_assert_eq!(a.len(), b.len());
    let mut sum = y.group().identity();
    let mut y_power = y.clone();
    for (a_j, b_j) in a.iter().zip(b.iter()) {
        sum = sum.add(&a_j.multiply(b_j).multiply(&y_power));
        y_power = y_power.multiply(y);
    }
    sum
}

/// `(x^0, x^1, …, x^{count-1})`; the per-verification exponent cache.
pub(crate) fn powers(x: &ZqElement, count: usize) -> Vec<ZqElement> {
    let mut result = Vec::with_capacity(count);
    let mut current = x.group().one();
    for _ in 0..count {
        result.push(current.clone());
        current = current.multiply(x);
    }
    result
}

/// Componentwise sum of equally long exponent vectors.
pub(crate) fn vector_add(
    a: &GroupVector<ZqElement>,
    b: &GroupVector<ZqElement>,
) -> GroupVector<ZqElement> {
    debug_assert_eq!(a.len(), b.len());
    GroupVector::try_from_elements(
        a.iter().zip(b.iter()).map(|(x, y)| x.add(y)).collect(),
    )
    .expect("sums of homogeneous vectors stay homogeneous")
}

/// Componentwise scaling of an exponent vector.
pub(crate) fn vector_scale(
    scalar: &ZqElement,
    vector: &GroupVector<ZqElement>,
) -> GroupVector<ZqElement> {
    GroupVector::try_from_elements(vector.iter().map(|x| scalar.multiply(x)).collect())
        .expect("scalings of homogeneous vectors stay homogeneous")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::ZqGroup;
    use num_bigint::BigUint;

    fn zq(v: u8) -> ZqElement {
        ZqElement::new(
            BigUint::from(v),
            ZqGroup::new(BigUint::from(11u8)).unwrap(),
        )
        .unwrap()
    }

    fn vector(values: &[u8]) -> GroupVector<ZqElement> {
        GroupVector::try_from_elements(values.iter().map(|&v| zq(v)).collect()).unwrap()
    }

    #[test]
    fn star_map_weights_by_increasing_powers() {
        // a·b under y: 1·2·y + 3·4·y² with y = 2: 4 + 48 = 52 ≡ 8 (mod 11)
        let result = star_map(&vector(&[1, 3]), &vector(&[2, 4]), &zq(2));
        assert_eq!(result, zq(8));
    }

    #[test]
    fn powers_start_at_one() {
        let p = powers(&zq(3), 4);
        assert_eq!(p, vec![zq(1), zq(3), zq(9), zq(5)]);
    }

    #[test]
    fn vector_helpers() {
        assert_eq!(vector_add(&vector(&[1, 9]), &vector(&[3, 4])), vector(&[4, 2]));
        assert_eq!(vector_scale(&zq(3), &vector(&[2, 5])), vector(&[6, 4]));
    }
}
