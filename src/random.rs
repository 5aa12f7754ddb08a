//! Random source for all sampling done by the primitives.
//!
//! Every draw goes through a [`RandomService`], so callers can inject a
//! deterministic RNG in tests and a system RNG in production. Uniform big
//! integers use rejection sampling over full bit-width draws; no modular
//! bias is tolerated anywhere.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use num_bigint::{BigUint, RandBigInt};
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};

use crate::conversions::bit_length;
use crate::errors::CryptoError;
use crate::group::{GroupVector, ZqElement, ZqGroup};

const LOG_TARGET: &str = "mixnet_primitives::random";

/// RFC 4648 Table 5.
const BASE16_ALPHABET: &[u8] = b"0123456789ABCDEF";
/// RFC 4648 Table 3.
const BASE32_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
/// RFC 4648 Table 1.
const BASE64_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

trait CryptoRngCore: RngCore + CryptoRng + Send {}
impl<T: RngCore + CryptoRng + Send> CryptoRngCore for T {}

/// Cryptographic random source.
///
/// Wraps the injected RNG behind a shared mutex so one service can be
/// cloned into composed proof services and across threads; clones draw
/// from the same underlying stream.
#[derive(Clone)]
pub struct RandomService {
    rng: Arc<Mutex<Box<dyn CryptoRngCore>>>,
}

impl std::fmt::Debug for RandomService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomService").finish_non_exhaustive()
    }
}

impl Default for RandomService {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomService {
    /// Service backed by the operating system RNG.
    pub fn new() -> Self {
        Self::from_rng(OsRng)
    }

    /// Service backed by a caller-supplied RNG, typically a seeded
    /// `ChaCha20Rng` in tests.
    pub fn from_rng<R: RngCore + CryptoRng + Send + 'static>(rng: R) -> Self {
        RandomService {
            rng: Arc::new(Mutex::new(Box::new(rng))),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut dyn CryptoRngCore) -> T) -> T {
        let mut guard = self.rng.lock().expect("random source mutex poisoned");
        f(guard.as_mut())
    }

    /// Uniform integer in `[0, upper_bound)` by rejection sampling over
    /// `bit_length(upper_bound)`-bit draws.
    pub fn random_integer(&self, upper_bound: &BigUint) -> Result<BigUint, CryptoError> {
        if upper_bound.is_zero() {
            return Err(CryptoError::invalid_argument(
                "the upper bound of a uniform draw must be strictly positive",
            ));
        }
        let bits = bit_length(upper_bound) as u64;
        Ok(self.with_rng(|rng| loop {
            let candidate = rng.gen_biguint(bits);
            if &candidate < upper_bound {
                return candidate;
            }
        }))
    }

    /// `n` i.i.d. uniform exponents in `Z_q`.
    pub fn random_exponents(
        &self,
        group: &ZqGroup,
        n: usize,
    ) -> Result<GroupVector<ZqElement>, CryptoError> {
        if n == 0 {
            return Err(CryptoError::invalid_argument(
                "cannot draw an empty vector of exponents",
            ));
        }
        let mut exponents = Vec::with_capacity(n);
        for _ in 0..n {
            let value = self.random_integer(group.q())?;
            exponents.push(ZqElement::new(value, group.clone())?);
        }
        GroupVector::try_from_elements(exponents)
    }

    /// A single uniform exponent in `Z_q`.
    pub fn random_exponent(&self, group: &ZqGroup) -> Result<ZqElement, CryptoError> {
        let value = self.random_integer(group.q())?;
        ZqElement::new(value, group.clone())
    }

    /// `n` cryptographically random bytes.
    pub fn random_bytes(&self, n: usize) -> Vec<u8> {
        self.with_rng(|rng| {
            let mut bytes = vec![0u8; n];
            rng.fill_bytes(&mut bytes);
            bytes
        })
    }

    /// Base16 string of exactly `length` characters (RFC 4648 Table 5).
    pub fn random_base16_string(&self, length: usize) -> Result<String, CryptoError> {
        self.random_string(length, BASE16_ALPHABET)
    }

    /// Base32 string of exactly `length` characters (RFC 4648 Table 3).
    pub fn random_base32_string(&self, length: usize) -> Result<String, CryptoError> {
        self.random_string(length, BASE32_ALPHABET)
    }

    /// Base64 string of exactly `length` characters (RFC 4648 Table 1).
    pub fn random_base64_string(&self, length: usize) -> Result<String, CryptoError> {
        self.random_string(length, BASE64_ALPHABET)
    }

    fn random_string(&self, length: usize, alphabet: &[u8]) -> Result<String, CryptoError> {
        if length == 0 {
            return Err(CryptoError::invalid_argument(
                "the requested string length must be strictly positive",
            ));
        }
        let chars = self.with_rng(|rng| {
            (0..length)
                .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                .collect::<Vec<u8>>()
        });
        // The alphabets are pure ASCII.
        Ok(String::from_utf8(chars).expect("RFC 4648 alphabets are ASCII"))
    }

    /// `n` distinct decimal strings of length `length`, left-padded with
    /// zeros. Fails when more codes are requested than `10^length` exist.
    pub fn unique_decimal_strings(
        &self,
        length: usize,
        n: usize,
    ) -> Result<Vec<String>, CryptoError> {
        if length == 0 {
            return Err(CryptoError::invalid_argument(
                "the code length must be strictly positive",
            ));
        }
        if n == 0 {
            return Err(CryptoError::invalid_argument(
                "the number of requested codes must be strictly positive",
            ));
        }
        let space = BigUint::from(10u8).pow(length as u32);
        if BigUint::from(n) > space {
            return Err(CryptoError::invalid_argument(format!(
                "cannot draw {n} distinct codes of length {length}"
            )));
        }

        let mut seen = HashSet::with_capacity(n);
        let mut codes = Vec::with_capacity(n);
        while codes.len() < n {
            let value = self.random_integer(&space)?;
            let code = format!("{:0>width$}", value.to_str_radix(10), width = length);
            if seen.insert(code.clone()) {
                codes.push(code);
            } else {
                tracing::trace!(target: LOG_TARGET, "collision while drawing unique codes, retrying");
            }
        }
        Ok(codes)
    }
}
