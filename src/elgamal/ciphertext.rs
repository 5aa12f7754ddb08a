use crate::errors::CryptoError;
use crate::group::{
    GqElement, GqGroup, GroupVector, GroupVectorElement, HasGroup, ZqElement,
};
use crate::hashing::{Hashable, ToHashable};

use super::keys::{ElGamalMultiRecipientPrivateKey, ElGamalMultiRecipientPublicKey};
use super::message::ElGamalMultiRecipientMessage;

const LOG_TARGET: &str = "mixnet_primitives::elgamal";

/// A multi-recipient ciphertext `(γ, φ_0, …, φ_{l-1})`.
///
/// The size of a ciphertext is the number of φ elements. Homomorphic
/// operations require operands of identical group and size; mixing them is
/// a programming error and asserts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalMultiRecipientCiphertext {
    gamma: GqElement,
    phis: GroupVector<GqElement>,
}

impl ElGamalMultiRecipientCiphertext {
    /// Builds a ciphertext from already-validated parts.
    pub fn new(
        gamma: GqElement,
        phis: GroupVector<GqElement>,
    ) -> Result<Self, CryptoError> {
        if phis.is_empty() {
            return Err(CryptoError::invalid_argument(
                "a ciphertext must contain at least one phi element",
            ));
        }
        if phis.group() != Some(gamma.group()) {
            return Err(CryptoError::invariant(
                "gamma and the phi elements must belong to the same group",
            ));
        }
        Ok(ElGamalMultiRecipientCiphertext { gamma, phis })
    }

    /// Encrypts `message` with randomness `exponent` under `public_key`.
    ///
    /// With `l < k` the tail of the key folds into the last φ (key
    /// compression), so a short message still takes a single γ.
    pub fn get_ciphertext(
        message: &ElGamalMultiRecipientMessage,
        exponent: &ZqElement,
        public_key: &ElGamalMultiRecipientPublicKey,
    ) -> Result<Self, CryptoError> {
        let l = message.size();
        let k = public_key.size();
        if l > k {
            return Err(CryptoError::DimensionMismatch {
                expected: k,
                actual: l,
            });
        }
        if message.group() != public_key.group() {
            return Err(CryptoError::invariant(
                "the message and the public key must belong to the same group",
            ));
        }
        if exponent.group().q() != message.group().q() {
            return Err(CryptoError::invariant(
                "the encryption exponent must match the group order",
            ));
        }

        let group = message.group();
        let gamma = group.generator().exponentiate(exponent);
        let compressed = public_key.compress(l)?;
        let phis = (0..l)
            .map(|i| compressed.get(i).exponentiate(exponent).multiply(message.get(i)))
            .collect::<Vec<_>>();
        tracing::trace!(target: LOG_TARGET, size = l, "encrypted multi-recipient message");
        Ok(ElGamalMultiRecipientCiphertext {
            gamma,
            phis: GroupVector::try_from_elements(phis)?,
        })
    }

    /// Decrypts into the original message: `m_i = φ_i · γ^{-sk_i}`, the
    /// tail of the secret key folding by summation when `l < k`.
    pub fn decrypt(
        &self,
        secret_key: &ElGamalMultiRecipientPrivateKey,
    ) -> Result<ElGamalMultiRecipientMessage, CryptoError> {
        let l = self.size();
        let k = secret_key.size();
        if l > k {
            return Err(CryptoError::DimensionMismatch {
                expected: k,
                actual: l,
            });
        }
        if secret_key.group().q() != self.group().q() {
            return Err(CryptoError::invariant(
                "the secret key must match the ciphertext group order",
            ));
        }
        let compressed = secret_key.compress(l)?;
        let elements = (0..l)
            .map(|i| {
                self.phis[i].multiply(&self.gamma.exponentiate(compressed.get(i)).invert())
            })
            .collect::<Vec<_>>();
        ElGamalMultiRecipientMessage::new(GroupVector::try_from_elements(elements)?)
    }

    /// Partial decryption: the same exponent work as [`Self::decrypt`], but
    /// re-packaged as a ciphertext `(γ, m)` for the next decrypting party.
    pub fn get_partial_decryption(
        &self,
        secret_key: &ElGamalMultiRecipientPrivateKey,
    ) -> Result<Self, CryptoError> {
        let message = self.decrypt(secret_key)?;
        ElGamalMultiRecipientCiphertext::new(
            self.gamma.clone(),
            message.elements().clone(),
        )
    }

    /// The neutral ciphertext for multiplication: `l + 1` identities.
    pub fn neutral(size: usize, group: &GqGroup) -> Result<Self, CryptoError> {
        if size == 0 {
            return Err(CryptoError::invalid_argument(
                "the neutral ciphertext must have at least one phi element",
            ));
        }
        let identity = group.identity();
        Ok(ElGamalMultiRecipientCiphertext {
            gamma: identity.clone(),
            phis: GroupVector::try_from_elements(vec![identity; size])?,
        })
    }

    /// Componentwise product of two ciphertexts of identical group and size.
    pub fn multiply(&self, other: &Self) -> Self {
        assert_eq!(
            self.size(),
            other.size(),
            "cannot multiply ciphertexts of different sizes"
        );
        let gamma = self.gamma.multiply(&other.gamma);
        let phis = self
            .phis
            .iter()
            .zip(other.phis.iter())
            .map(|(a, b)| a.multiply(b))
            .collect::<Vec<_>>();
        ElGamalMultiRecipientCiphertext {
            gamma,
            phis: GroupVector::try_from_elements(phis)
                .expect("products of homogeneous ciphertexts stay homogeneous"),
        }
    }

    /// Raises γ and every φ to `exponent`.
    pub fn exponentiate(&self, exponent: &ZqElement) -> Self {
        ElGamalMultiRecipientCiphertext {
            gamma: self.gamma.exponentiate(exponent),
            phis: GroupVector::try_from_elements(
                self.phis.iter().map(|phi| phi.exponentiate(exponent)).collect(),
            )
            .expect("powers of homogeneous ciphertexts stay homogeneous"),
        }
    }

    pub fn gamma(&self) -> &GqElement {
        &self.gamma
    }

    pub fn phi(&self, index: usize) -> &GqElement {
        &self.phis[index]
    }

    pub fn phis(&self) -> &GroupVector<GqElement> {
        &self.phis
    }

    pub fn size(&self) -> usize {
        self.phis.len()
    }
}

impl HasGroup for ElGamalMultiRecipientCiphertext {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.gamma.group()
    }
}

impl GroupVectorElement for ElGamalMultiRecipientCiphertext {
    fn element_size(&self) -> usize {
        self.size()
    }
}

impl ToHashable for ElGamalMultiRecipientCiphertext {
    fn to_hashable(&self) -> Hashable {
        let mut parts = Vec::with_capacity(1 + self.phis.len());
        parts.push(self.gamma.to_hashable());
        parts.extend(self.phis.iter().map(|phi| phi.to_hashable()));
        Hashable::List(parts)
    }
}

/// `∏_i C_i^{a_i}` over equal-length vectors of ciphertexts and exponents,
/// the multi-exponentiation the shuffle argument is built on.
pub fn get_ciphertext_vector_exponentiation(
    ciphertexts: &GroupVector<ElGamalMultiRecipientCiphertext>,
    exponents: &GroupVector<ZqElement>,
) -> Result<ElGamalMultiRecipientCiphertext, CryptoError> {
    if ciphertexts.is_empty() {
        return Err(CryptoError::invalid_argument(
            "cannot exponentiate an empty ciphertext vector",
        ));
    }
    if ciphertexts.len() != exponents.len() {
        return Err(CryptoError::DimensionMismatch {
            expected: ciphertexts.len(),
            actual: exponents.len(),
        });
    }
    let group = ciphertexts.group().expect("non-empty");
    if exponents.group().expect("non-empty").q() != group.q() {
        return Err(CryptoError::invariant(
            "the exponents must match the ciphertext group order",
        ));
    }
    let size = ciphertexts.element_size().expect("non-empty");
    let neutral = ElGamalMultiRecipientCiphertext::neutral(size, group)?;
    Ok(ciphertexts
        .iter()
        .zip(exponents.iter())
        .fold(neutral, |acc, (c, a)| acc.multiply(&c.exponentiate(a))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::{ElGamalKeyPair, ElGamalMultiRecipientPrivateKey};
    use crate::group::ZqGroup;
    use num_bigint::BigUint;

    fn group_23() -> GqGroup {
        GqGroup::new(
            BigUint::from(23u8),
            BigUint::from(11u8),
            BigUint::from(2u8),
        )
        .unwrap()
    }

    fn gq(v: u8) -> GqElement {
        GqElement::from_value(BigUint::from(v), group_23()).unwrap()
    }

    fn zq(v: u8) -> ZqElement {
        ZqElement::new(BigUint::from(v), ZqGroup::same_order_as(&group_23())).unwrap()
    }

    fn message(values: &[u8]) -> ElGamalMultiRecipientMessage {
        ElGamalMultiRecipientMessage::new(
            GroupVector::try_from_elements(values.iter().map(|&v| gq(v)).collect()).unwrap(),
        )
        .unwrap()
    }

    fn key_pair() -> ElGamalKeyPair {
        let sk = ElGamalMultiRecipientPrivateKey::new(
            GroupVector::try_from_elements(vec![zq(3), zq(7), zq(2)]).unwrap(),
        )
        .unwrap();
        ElGamalKeyPair::from_private_key(sk, &group_23().generator()).unwrap()
    }

    #[test]
    fn encrypts_the_reference_vector() {
        // pk = (8, 13, 4), m = (4, 8, 3), r = 5:
        // γ = 2^5 ≡ 9, φ = (8^5·4, 13^5·8, 4^5·3) ≡ (18, 9, 13) (mod 23)
        let ciphertext = ElGamalMultiRecipientCiphertext::get_ciphertext(
            &message(&[4, 8, 3]),
            &zq(5),
            key_pair().public_key(),
        )
        .unwrap();
        assert_eq!(ciphertext.gamma(), &gq(9));
        assert_eq!(ciphertext.phi(0), &gq(18));
        assert_eq!(ciphertext.phi(1), &gq(9));
        assert_eq!(ciphertext.phi(2), &gq(13));
    }

    #[test]
    fn decrypts_what_it_encrypted() {
        let pair = key_pair();
        let m = message(&[4, 8, 3]);
        let ciphertext =
            ElGamalMultiRecipientCiphertext::get_ciphertext(&m, &zq(5), pair.public_key())
                .unwrap();
        assert_eq!(ciphertext.decrypt(pair.private_key()).unwrap(), m);
    }

    #[test]
    fn compressed_encryption_round_trips() {
        // l = 2 < k = 3: φ_1 = (pk_1·pk_2)^r · m_1 = 6^5·8 ≡ 16 (mod 23).
        let pair = key_pair();
        let m = message(&[4, 8]);
        let ciphertext =
            ElGamalMultiRecipientCiphertext::get_ciphertext(&m, &zq(5), pair.public_key())
                .unwrap();
        assert_eq!(ciphertext.gamma(), &gq(9));
        assert_eq!(ciphertext.phi(0), &gq(18));
        assert_eq!(ciphertext.phi(1), &gq(16));
        assert_eq!(ciphertext.decrypt(pair.private_key()).unwrap(), m);
    }

    #[test]
    fn message_longer_than_key_is_rejected() {
        let pair = key_pair();
        assert!(ElGamalMultiRecipientCiphertext::get_ciphertext(
            &message(&[4, 8, 3, 2]),
            &zq(5),
            pair.public_key(),
        )
        .is_err());
    }

    #[test]
    fn partial_decryption_keeps_gamma() {
        let pair = key_pair();
        let m = message(&[4, 8, 3]);
        let ciphertext =
            ElGamalMultiRecipientCiphertext::get_ciphertext(&m, &zq(5), pair.public_key())
                .unwrap();
        let partial = ciphertext.get_partial_decryption(pair.private_key()).unwrap();
        assert_eq!(partial.gamma(), ciphertext.gamma());
        assert_eq!(partial.phis(), m.elements());
    }

    #[test]
    fn product_is_homomorphic() {
        let pair = key_pair();
        let m1 = message(&[4, 8, 3]);
        let m2 = message(&[2, 13, 6]);
        let c1 =
            ElGamalMultiRecipientCiphertext::get_ciphertext(&m1, &zq(5), pair.public_key())
                .unwrap();
        let c2 =
            ElGamalMultiRecipientCiphertext::get_ciphertext(&m2, &zq(7), pair.public_key())
                .unwrap();
        let decrypted = c1.multiply(&c2).decrypt(pair.private_key()).unwrap();
        for i in 0..3 {
            assert_eq!(decrypted.get(i), &m1.get(i).multiply(m2.get(i)));
        }
    }

    #[test]
    fn exponentiation_matches_repeated_multiplication() {
        let pair = key_pair();
        let c = ElGamalMultiRecipientCiphertext::get_ciphertext(
            &message(&[4, 8, 3]),
            &zq(5),
            pair.public_key(),
        )
        .unwrap();
        let cubed = c.exponentiate(&zq(3));
        assert_eq!(cubed, c.multiply(&c).multiply(&c));
    }

    #[test]
    fn neutral_is_the_multiplicative_identity() {
        let pair = key_pair();
        let c = ElGamalMultiRecipientCiphertext::get_ciphertext(
            &message(&[4, 8, 3]),
            &zq(5),
            pair.public_key(),
        )
        .unwrap();
        let neutral = ElGamalMultiRecipientCiphertext::neutral(3, &group_23()).unwrap();
        assert_eq!(c.multiply(&neutral), c);
    }

    #[test]
    fn vector_exponentiation_accumulates() {
        let pair = key_pair();
        let c1 = ElGamalMultiRecipientCiphertext::get_ciphertext(
            &message(&[4, 8]),
            &zq(5),
            pair.public_key(),
        )
        .unwrap();
        let c2 = ElGamalMultiRecipientCiphertext::get_ciphertext(
            &message(&[2, 3]),
            &zq(7),
            pair.public_key(),
        )
        .unwrap();
        let ciphertexts = GroupVector::try_from_elements(vec![c1.clone(), c2.clone()]).unwrap();
        let exponents = GroupVector::try_from_elements(vec![zq(2), zq(3)]).unwrap();
        let combined = get_ciphertext_vector_exponentiation(&ciphertexts, &exponents).unwrap();
        let expected = c1.exponentiate(&zq(2)).multiply(&c2.exponentiate(&zq(3)));
        assert_eq!(combined, expected);

        let short = GroupVector::try_from_elements(vec![zq(2)]).unwrap();
        assert!(get_ciphertext_vector_exponentiation(&ciphertexts, &short).is_err());
    }
}
