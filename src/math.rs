//! Probabilistic primality testing over `BigUint`.
//!
//! Miller-Rabin with uniformly drawn witnesses, preceded by trial division
//! against a table of small primes. `certainty` bounds the error probability
//! by `2^-certainty`; each witness round contributes a factor of four.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

const SMALL_PRIMES: [u32; 46] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199,
];

/// Miller-Rabin primality test with an error bound of `2^-certainty`.
pub fn is_probable_prime<R: RngCore + CryptoRng>(
    n: &BigUint,
    certainty: u32,
    rng: &mut R,
) -> bool {
    let two = BigUint::from(2u8);
    if n < &two {
        return false;
    }
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    // n - 1 = d * 2^s with d odd
    let n_minus_one = n - BigUint::one();
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    let rounds = (certainty + 1) / 2;
    let lower = two.clone();
    let upper = n - &two;
    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&lower, &upper);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 0..s.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn recognizes_small_primes() {
        let mut rng = rng();
        for p in [2u32, 3, 11, 23, 47, 199, 211, 1009, 7919] {
            assert!(
                is_probable_prime(&BigUint::from(p), 80, &mut rng),
                "{p} is prime"
            );
        }
    }

    #[test]
    fn rejects_small_composites() {
        let mut rng = rng();
        for c in [0u32, 1, 4, 9, 15, 49, 91, 2047, 8911] {
            assert!(
                !is_probable_prime(&BigUint::from(c), 80, &mut rng),
                "{c} is composite"
            );
        }
    }

    #[test]
    fn rejects_carmichael_numbers() {
        let mut rng = rng();
        for c in [561u32, 1105, 1729, 2465, 2821, 6601] {
            assert!(!is_probable_prime(&BigUint::from(c), 80, &mut rng));
        }
    }

    #[test]
    fn recognizes_a_larger_prime() {
        // 2^61 - 1 is a Mersenne prime.
        let mut rng = rng();
        let p = (BigUint::one() << 61) - BigUint::one();
        assert!(is_probable_prime(&p, 112, &mut rng));
        assert!(!is_probable_prime(&(p + BigUint::from(2u8)), 112, &mut rng));
    }
}
