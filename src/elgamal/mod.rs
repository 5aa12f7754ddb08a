//! Multi-recipient ElGamal over a [`crate::group::GqGroup`].
//!
//! A single γ is shared across all recipients; messages shorter than the
//! public key are handled by folding the tail of the key into one factor
//! (key compression). Ciphertexts are homomorphic under componentwise
//! multiplication and exponentiation.

mod ciphertext;
mod keys;
mod message;

pub use ciphertext::{get_ciphertext_vector_exponentiation, ElGamalMultiRecipientCiphertext};
pub use keys::{
    combine_public_keys, ElGamalKeyPair, ElGamalMultiRecipientPrivateKey,
    ElGamalMultiRecipientPublicKey,
};
pub use message::ElGamalMultiRecipientMessage;
