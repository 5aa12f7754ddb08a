use crate::elgamal::{
    ElGamalMultiRecipientCiphertext, ElGamalMultiRecipientMessage, ElGamalMultiRecipientPublicKey,
};
use crate::errors::CryptoError;
use crate::group::{GroupVector, HasGroup, ZqElement, ZqGroup};
use crate::random::RandomService;

use super::permutation::Permutation;

const LOG_TARGET: &str = "mixnet_primitives::mixnet";

/// The outcome of a re-encrypting shuffle: the shuffled ciphertexts with
/// the secret permutation and re-encryption exponents, the witness of a
/// subsequent shuffle argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shuffle {
    ciphertexts: GroupVector<ElGamalMultiRecipientCiphertext>,
    permutation: Permutation,
    re_encryption_exponents: GroupVector<ZqElement>,
}

impl Shuffle {
    /// The sentinel returned when shuffling an empty input.
    pub fn empty() -> Self {
        Shuffle {
            ciphertexts: GroupVector::empty(),
            permutation: Permutation::empty(),
            re_encryption_exponents: GroupVector::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertexts.is_empty()
    }

    pub fn ciphertexts(&self) -> &GroupVector<ElGamalMultiRecipientCiphertext> {
        &self.ciphertexts
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    pub fn re_encryption_exponents(&self) -> &GroupVector<ZqElement> {
        &self.re_encryption_exponents
    }
}

/// Shuffles and re-encrypts: `C'_i = Enc(1-vector, r_i, pk) · C_{π(i)}`
/// with a fresh uniform permutation π and exponents `r`.
pub fn gen_shuffle(
    ciphertexts: &GroupVector<ElGamalMultiRecipientCiphertext>,
    public_key: &ElGamalMultiRecipientPublicKey,
    random: &RandomService,
) -> Result<Shuffle, CryptoError> {
    if ciphertexts.is_empty() {
        return Ok(Shuffle::empty());
    }
    let size = ciphertexts.element_size().expect("non-empty");
    if size == 0 || size > public_key.size() {
        return Err(CryptoError::invalid_argument(format!(
            "the ciphertext size must lie in [1, {}], got {size}",
            public_key.size()
        )));
    }
    if ciphertexts.group() != Some(public_key.group()) {
        return Err(CryptoError::invariant(
            "the ciphertexts and the public key must belong to the same group",
        ));
    }

    let n = ciphertexts.len();
    let group = public_key.group();
    let zq = ZqGroup::same_order_as(group);
    let permutation = Permutation::generate(n, random)?;
    let exponents = random.random_exponents(&zq, n)?;
    let ones = ElGamalMultiRecipientMessage::ones(group, size)?;

    let shuffled = (0..n)
        .map(|i| {
            let re_encryption = ElGamalMultiRecipientCiphertext::get_ciphertext(
                &ones,
                &exponents[i],
                public_key,
            )?;
            Ok(re_encryption.multiply(&ciphertexts[permutation.get(i)]))
        })
        .collect::<Result<Vec<_>, CryptoError>>()?;
    tracing::debug!(target: LOG_TARGET, n, size, "shuffled and re-encrypted ciphertext vector");

    Ok(Shuffle {
        ciphertexts: GroupVector::try_from_elements(shuffled)?,
        permutation,
        re_encryption_exponents: exponents,
    })
}
