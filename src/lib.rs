//! Cryptographic primitives for a verifiable remote-voting mixnet.
//!
//! The crate provides the algebra of prime-order subgroups of `Z*_p` over
//! safe primes, multi-recipient ElGamal with key compression, Pedersen
//! commitments, a recursive domain-separated hash, verifiable generation of
//! encryption parameters and commitment keys, a re-encrypting shuffle, and
//! the Bayer-Groth style argument services (zero, Hadamard, single-value
//! product, product, multi-exponentiation, shuffle) plus a Chaum-Pedersen
//! decryption proof.
//!
//! All values are immutable after construction and validate their
//! invariants when built. Proof services are pure with respect to the
//! injected [`random::RandomService`] and [`hashing::HashService`];
//! verifiers never fail on semantic mismatch but return a
//! [`verification::VerificationResult`].

pub mod arguments;
pub mod conversions;
pub mod elgamal;
pub mod encryption_parameters;
pub mod errors;
pub mod group;
pub mod hashing;
pub mod math;
pub mod mixnet;
pub mod pedersen;
pub mod proofs;
pub mod random;
pub mod validation;
pub mod verification;

#[cfg(test)]
pub mod test_utils;

pub use errors::CryptoError;
pub use verification::VerificationResult;
