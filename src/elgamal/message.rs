use crate::errors::CryptoError;
use crate::group::{GqElement, GqGroup, GroupVector, HasGroup};
use crate::hashing::{Hashable, ToHashable};

/// A non-empty vector of group elements addressed to up to as many
/// recipients as the public key has entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalMultiRecipientMessage {
    elements: GroupVector<GqElement>,
}

impl ElGamalMultiRecipientMessage {
    pub fn new(elements: GroupVector<GqElement>) -> Result<Self, CryptoError> {
        if elements.is_empty() {
            return Err(CryptoError::invalid_argument(
                "an ElGamal message must contain at least one element",
            ));
        }
        Ok(ElGamalMultiRecipientMessage { elements })
    }

    /// The all-ones message of the given size, the neutral plaintext.
    pub fn ones(group: &GqGroup, size: usize) -> Result<Self, CryptoError> {
        Self::constant(group.identity(), size)
    }

    /// A message repeating `element` `size` times.
    pub fn constant(element: GqElement, size: usize) -> Result<Self, CryptoError> {
        if size == 0 {
            return Err(CryptoError::invalid_argument(
                "an ElGamal message must contain at least one element",
            ));
        }
        let elements = GroupVector::try_from_elements(vec![element; size])?;
        Ok(ElGamalMultiRecipientMessage { elements })
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
}

impl HasGroup for ElGamalMultiRecipientMessage {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.elements.group().expect("a message is never empty")
    }
}

impl ToHashable for ElGamalMultiRecipientMessage {
    fn to_hashable(&self) -> Hashable {
        self.elements.to_hashable()
    }
}
