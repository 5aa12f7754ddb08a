//! Zero-knowledge proofs outside the shuffle argument machinery.

mod decryption;

pub use decryption::{DecryptionProof, DecryptionProofService};
