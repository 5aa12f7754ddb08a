//! Pedersen commitments over a [`GqGroup`] and the deterministic derivation
//! of commitment keys from group parameters.

mod commitment;
mod commitment_key;

pub use commitment::{get_commitment, get_commitment_matrix, get_commitment_vector};
pub use commitment_key::CommitmentKey;
