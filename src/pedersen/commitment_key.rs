use num_bigint::BigUint;

use crate::conversions::byte_array_to_integer;
use crate::errors::CryptoError;
use crate::group::{GqElement, GqGroup, GroupVector, HasGroup};
use crate::hashing::{Hashable, HashService, ToHashable};

const LOG_TARGET: &str = "mixnet_primitives::pedersen";

/// Domain tag bound into the derivation of verifiable commitment keys.
const COMMITMENT_KEY_DOMAIN: &str = "commitmentKey";

/// A Pedersen commitment key `(h, g_0, …, g_{ν-1})`.
///
/// All elements are group members that are neither the identity nor the
/// group generator; `ν ≥ 1` bounds the width of committable vectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentKey {
    h: GqElement,
    g_elements: GroupVector<GqElement>,
}

impl CommitmentKey {
    pub fn new(h: GqElement, g_elements: GroupVector<GqElement>) -> Result<Self, CryptoError> {
        if g_elements.is_empty() {
            return Err(CryptoError::invalid_argument(
                "a commitment key needs at least one g element",
            ));
        }
        if g_elements.group() != Some(h.group()) {
            return Err(CryptoError::invariant(
                "all commitment key elements must belong to the same group",
            ));
        }
        let generator = h.group().generator();
        for element in std::iter::once(&h).chain(g_elements.iter()) {
            if element.is_identity() || element == &generator {
                return Err(CryptoError::invalid_argument(
                    "commitment key elements must be neither the identity nor the generator",
                ));
            }
        }
        Ok(CommitmentKey { h, g_elements })
    }

    /// Deterministically derives a commitment key of width `n` from the
    /// group parameters, so any party can re-run the derivation.
    ///
    /// Counter-indexed digests of `(p, q, tag, counter)` feed
    /// `hash_and_square`; candidates colliding with the identity, the
    /// generator or an earlier element are skipped.
    pub fn verifiable(
        group: &GqGroup,
        n: usize,
        hash: &HashService,
    ) -> Result<Self, CryptoError> {
        let upper = group.q() - BigUint::from(3u8);
        if n == 0 || BigUint::from(n) > upper {
            return Err(CryptoError::invalid_argument(format!(
                "the commitment key width must lie in [1, q - 3], got {n}"
            )));
        }

        let generator = group.generator();
        let mut elements: Vec<GqElement> = Vec::with_capacity(1 + n);
        let mut counter = 0usize;
        while elements.len() < 1 + n {
            let digest = hash.recursive_hash(&[
                Hashable::Integer(group.p().clone()),
                Hashable::Integer(group.q().clone()),
                Hashable::from_text(COMMITMENT_KEY_DOMAIN),
                Hashable::from(counter),
            ])?;
            counter += 1;
            let candidate = hash.hash_and_square(&byte_array_to_integer(&digest)?, group)?;
            if candidate.is_identity()
                || candidate == generator
                || elements.contains(&candidate)
            {
                tracing::trace!(target: LOG_TARGET, counter, "skipped colliding commitment key candidate");
                continue;
            }
            elements.push(candidate);
        }

        let mut iter = elements.into_iter();
        let h = iter.next().expect("at least two elements were drawn");
        CommitmentKey::new(h, GroupVector::try_from_elements(iter.collect())?)
    }

    pub fn h(&self) -> &GqElement {
        &self.h
    }

    pub fn g(&self, index: usize) -> &GqElement {
        &self.g_elements[index]
    }

    pub fn g_elements(&self) -> &GroupVector<GqElement> {
        &self.g_elements
    }

    /// The number of g elements, i.e. the widest committable vector.
    pub fn size(&self) -> usize {
        self.g_elements.len()
    }
}

impl HasGroup for CommitmentKey {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.h.group()
    }
}

impl ToHashable for CommitmentKey {
    fn to_hashable(&self) -> Hashable {
        let mut parts = Vec::with_capacity(1 + self.g_elements.len());
        parts.push(self.h.to_hashable());
        parts.extend(self.g_elements.iter().map(|g| g.to_hashable()));
        Hashable::List(parts)
    }
}
