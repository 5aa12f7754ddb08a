use std::ops::Index;

use crate::errors::CryptoError;
use crate::hashing::{Hashable, ToHashable};

use super::group_matrix::GroupMatrix;
use super::traits::GroupVectorElement;

/// An ordered, immutable sequence of elements sharing one group and one
/// element size.
///
/// Empty vectors carry no group reference. All mutators return new values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupVector<E: GroupVectorElement> {
    elements: Vec<E>,
}

impl<E: GroupVectorElement> GroupVector<E> {
    /// Validating constructor: all elements must share the same group and
    /// the same element size.
    pub fn try_from_elements(elements: Vec<E>) -> Result<Self, CryptoError> {
        if let Some(first) = elements.first() {
            let group = first.group().clone();
            let size = first.element_size();
            for element in &elements[1..] {
                if element.group() != &group {
                    return Err(CryptoError::invariant(
                        "all elements of a group vector must belong to the same group",
                    ));
                }
                if element.element_size() != size {
                    return Err(CryptoError::invariant(
                        "all elements of a group vector must have the same size",
                    ));
                }
            }
        }
        Ok(GroupVector { elements })
    }

    pub fn empty() -> Self {
        GroupVector {
            elements: Vec::new(),
        }
    }

    pub fn single(element: E) -> Self {
        GroupVector {
            elements: vec![element],
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.elements.get(index)
    }

    pub fn first(&self) -> Option<&E> {
        self.elements.first()
    }

    pub fn last(&self) -> Option<&E> {
        self.elements.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.elements
    }

    /// The common group, absent for empty vectors.
    pub fn group(&self) -> Option<&E::Group> {
        self.elements.first().map(|e| e.group())
    }

    /// The common element size, absent for empty vectors.
    pub fn element_size(&self) -> Option<usize> {
        self.elements.first().map(|e| e.element_size())
    }

    /// A new vector with `element` appended.
    pub fn append(&self, element: E) -> Result<Self, CryptoError> {
        let mut elements = self.elements.clone();
        elements.push(element);
        Self::try_from_elements(elements)
    }

    /// A new vector with `element` prepended.
    pub fn prepend(&self, element: E) -> Result<Self, CryptoError> {
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.push(element);
        elements.extend_from_slice(&self.elements);
        Self::try_from_elements(elements)
    }

    /// Reshapes into an `m × n` matrix in row-major order:
    /// `M[i][j] = v[n·i + j]`. Requires `len = m·n`.
    pub fn to_matrix(&self, m: usize, n: usize) -> Result<GroupMatrix<E>, CryptoError> {
        if m.checked_mul(n) != Some(self.len()) {
            return Err(CryptoError::invalid_argument(format!(
                "cannot reshape a vector of size {} into a {m} x {n} matrix",
                self.len()
            )));
        }
        let rows = self
            .elements
            .chunks(n.max(1))
            .map(|chunk| chunk.to_vec())
            .collect::<Vec<_>>();
        GroupMatrix::from_rows(rows)
    }
}

impl<E: GroupVectorElement> TryFrom<Vec<E>> for GroupVector<E> {
    type Error = CryptoError;

    fn try_from(elements: Vec<E>) -> Result<Self, CryptoError> {
        GroupVector::try_from_elements(elements)
    }
}

impl<E: GroupVectorElement> Index<usize> for GroupVector<E> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        &self.elements[index]
    }
}

impl<E: GroupVectorElement> IntoIterator for GroupVector<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, E: GroupVectorElement> IntoIterator for &'a GroupVector<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<E: GroupVectorElement + ToHashable> ToHashable for GroupVector<E> {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(self.elements.iter().map(|e| e.to_hashable()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{GqElement, GqGroup, ZqElement, ZqGroup};
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

    #[test]
    fn homogeneous_vectors_are_accepted() {
        let vector = GroupVector::try_from_elements(vec![gq(2), gq(4), gq(8)]).unwrap();
        assert_eq!(vector.len(), 3);
        assert_eq!(vector.group(), Some(&group_23()));
        assert_eq!(vector.element_size(), Some(1));
        assert_eq!(vector[1], gq(4));
    }

    #[test]
    fn mixed_groups_are_rejected() {
        let other = GqGroup::new(
            BigUint::from(47u8),
            BigUint::from(23u8),
            BigUint::from(2u8),
        )
        .unwrap();
        let foreign = GqElement::from_value(BigUint::from(4u8), other).unwrap();
        assert!(GroupVector::try_from_elements(vec![gq(2), foreign]).is_err());
    }

    #[test]
    fn empty_vector_has_no_group() {
        let vector = GroupVector::<GqElement>::empty();
        assert!(vector.is_empty());
        assert!(vector.group().is_none());
        assert!(vector.element_size().is_none());
    }

    #[test]
    fn append_and_prepend_return_new_values() {
        let vector = GroupVector::try_from_elements(vec![zq(1), zq(2)]).unwrap();
        let appended = vector.append(zq(3)).unwrap();
        let prepended = vector.prepend(zq(0)).unwrap();
        assert_eq!(vector.len(), 2);
        assert_eq!(appended.as_slice(), &[zq(1), zq(2), zq(3)]);
        assert_eq!(prepended.as_slice(), &[zq(0), zq(1), zq(2)]);
    }

    #[test]
    fn to_matrix_is_row_major() {
        let vector =
            GroupVector::try_from_elements(vec![zq(0), zq(1), zq(2), zq(3), zq(4), zq(5)])
                .unwrap();
        let matrix = vector.to_matrix(2, 3).unwrap();
        assert_eq!(matrix.get(0, 2), &zq(2));
        assert_eq!(matrix.get(1, 0), &zq(3));
        assert!(vector.to_matrix(2, 2).is_err());
    }
}
