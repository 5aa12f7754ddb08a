use crate::errors::CryptoError;
use crate::group::{
    GqElement, GqGroup, GroupVector, HasGroup, ZqElement, ZqGroup,
};
use crate::hashing::{Hashable, ToHashable};
use crate::random::RandomService;
use crate::validation::check_in_bounds;

const LOG_TARGET: &str = "mixnet_primitives::elgamal";

/// A non-empty vector of public-key elements in Gq.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalMultiRecipientPublicKey {
    elements: GroupVector<GqElement>,
}

impl ElGamalMultiRecipientPublicKey {
    pub fn new(elements: GroupVector<GqElement>) -> Result<Self, CryptoError> {
        if elements.is_empty() {
            return Err(CryptoError::invalid_argument(
                "an ElGamal public key must contain at least one element",
            ));
        }
        Ok(ElGamalMultiRecipientPublicKey { elements })
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn get(&self, index: usize) -> &GqElement {
        &self.elements[index]
    }

    pub fn elements(&self) -> &GroupVector<GqElement> {
        &self.elements
    }

    /// Folds the final `k - l + 1` elements into a single factor:
    /// `(pk_0, …, pk_{l-2}, ∏_{j=l-1}^{k-1} pk_j)`.
    pub fn compress(&self, length: usize) -> Result<Self, CryptoError> {
        check_in_bounds(length, self.size(), "the compressed public key length")?;
        let mut elements: Vec<GqElement> = self.elements.as_slice()[..length - 1].to_vec();
        let folded = self.elements.as_slice()[length - 1..]
            .iter()
            .skip(1)
            .fold(self.elements[length - 1].clone(), |acc, pk| acc.multiply(pk));
        elements.push(folded);
        Ok(ElGamalMultiRecipientPublicKey {
            elements: GroupVector::try_from_elements(elements)?,
        })
    }
}

impl HasGroup for ElGamalMultiRecipientPublicKey {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.elements.group().expect("a public key is never empty")
    }
}

impl ToHashable for ElGamalMultiRecipientPublicKey {
    fn to_hashable(&self) -> Hashable {
        self.elements.to_hashable()
    }
}

/// A non-empty vector of secret exponents in Zq.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalMultiRecipientPrivateKey {
    exponents: GroupVector<ZqElement>,
}

impl ElGamalMultiRecipientPrivateKey {
    pub fn new(exponents: GroupVector<ZqElement>) -> Result<Self, CryptoError> {
        if exponents.is_empty() {
            return Err(CryptoError::invalid_argument(
                "an ElGamal private key must contain at least one exponent",
            ));
        }
        Ok(ElGamalMultiRecipientPrivateKey { exponents })
    }

    pub fn size(&self) -> usize {
        self.exponents.len()
    }

    pub fn get(&self, index: usize) -> &ZqElement {
        &self.exponents[index]
    }

    pub fn exponents(&self) -> &GroupVector<ZqElement> {
        &self.exponents
    }

    /// The secret counterpart of public-key compression: the tail folds by
    /// summation, `(sk_0, …, sk_{l-2}, Σ_{j=l-1}^{k-1} sk_j)`.
    pub fn compress(&self, length: usize) -> Result<Self, CryptoError> {
        check_in_bounds(length, self.size(), "the compressed private key length")?;
        let mut exponents: Vec<ZqElement> = self.exponents.as_slice()[..length - 1].to_vec();
        let folded = self.exponents.as_slice()[length - 1..]
            .iter()
            .skip(1)
            .fold(self.exponents[length - 1].clone(), |acc, sk| acc.add(sk));
        exponents.push(folded);
        Ok(ElGamalMultiRecipientPrivateKey {
            exponents: GroupVector::try_from_elements(exponents)?,
        })
    }

    /// Derives the matching public key as `pk_i = generator^{sk_i}`.
    pub fn derive_public_key(
        &self,
        generator: &GqElement,
    ) -> Result<ElGamalMultiRecipientPublicKey, CryptoError> {
        if self.exponents.group().expect("non-empty").q() != generator.group().q() {
            return Err(CryptoError::invalid_argument(
                "the private key and the generator must have the same order",
            ));
        }
        let elements = self
            .exponents
            .iter()
            .map(|sk| generator.exponentiate(sk))
            .collect::<Vec<_>>();
        ElGamalMultiRecipientPublicKey::new(GroupVector::try_from_elements(elements)?)
    }
}

impl HasGroup for ElGamalMultiRecipientPrivateKey {
    type Group = ZqGroup;

    fn group(&self) -> &ZqGroup {
        self.exponents.group().expect("a private key is never empty")
    }
}

/// A matched (public, private) key pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalKeyPair {
    public_key: ElGamalMultiRecipientPublicKey,
    private_key: ElGamalMultiRecipientPrivateKey,
}

impl ElGamalKeyPair {
    /// Samples `size` uniform secret exponents and derives the public key.
    pub fn generate(
        group: &GqGroup,
        size: usize,
        random: &RandomService,
    ) -> Result<Self, CryptoError> {
        if size == 0 {
            return Err(CryptoError::invalid_argument(
                "a key pair must have at least one element",
            ));
        }
        let zq = ZqGroup::same_order_as(group);
        let exponents = random.random_exponents(&zq, size)?;
        let private_key = ElGamalMultiRecipientPrivateKey::new(exponents)?;
        tracing::debug!(target: LOG_TARGET, size, "generated ElGamal key pair");
        Self::from_private_key(private_key, &group.generator())
    }

    /// Derives the key pair of an existing private key over `generator`.
    pub fn from_private_key(
        private_key: ElGamalMultiRecipientPrivateKey,
        generator: &GqElement,
    ) -> Result<Self, CryptoError> {
        let public_key = private_key.derive_public_key(generator)?;
        Ok(ElGamalKeyPair {
            public_key,
            private_key,
        })
    }

    pub fn public_key(&self) -> &ElGamalMultiRecipientPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &ElGamalMultiRecipientPrivateKey {
        &self.private_key
    }
}

/// Elementwise product of public keys sharing one group and one size.
pub fn combine_public_keys(
    keys: &[ElGamalMultiRecipientPublicKey],
) -> Result<ElGamalMultiRecipientPublicKey, CryptoError> {
    let first = keys.first().ok_or_else(|| {
        CryptoError::invalid_argument("cannot combine an empty list of public keys")
    })?;
    for key in &keys[1..] {
        if key.group() != first.group() {
            return Err(CryptoError::invariant(
                "all public keys to combine must belong to the same group",
            ));
        }
        if key.size() != first.size() {
            return Err(CryptoError::DimensionMismatch {
                expected: first.size(),
                actual: key.size(),
            });
        }
    }
    let combined = (0..first.size())
        .map(|i| {
            keys[1..]
                .iter()
                .fold(first.get(i).clone(), |acc, key| acc.multiply(key.get(i)))
        })
        .collect::<Vec<_>>();
    ElGamalMultiRecipientPublicKey::new(GroupVector::try_from_elements(combined)?)
}
