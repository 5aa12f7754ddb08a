//! Permutations and the re-encrypting shuffle a mix node applies to a
//! ciphertext vector.

mod permutation;
mod shuffle;

pub use permutation::Permutation;
pub use shuffle::{gen_shuffle, Shuffle};
