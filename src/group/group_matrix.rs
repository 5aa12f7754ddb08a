use crate::errors::CryptoError;
use crate::hashing::{Hashable, ToHashable};

use super::group_vector::GroupVector;
use super::traits::GroupVectorElement;

/// An `m × n` matrix of elements sharing one group and one element size.
///
/// A matrix is empty iff either dimension is zero; empty matrices are
/// normalized to `0 × 0` and carry no group reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupMatrix<E: GroupVectorElement> {
    // Row-major storage; invariant: all rows have equal length.
    rows: Vec<Vec<E>>,
}

impl<E: GroupVectorElement> GroupMatrix<E> {
    /// Builds a matrix from rows; all rows must have the same length and the
    /// usual homogeneity invariants hold across every element.
    pub fn from_rows(rows: Vec<Vec<E>>) -> Result<Self, CryptoError> {
        if rows.is_empty() || rows[0].is_empty() {
            if rows.iter().any(|row| !row.is_empty()) {
                return Err(CryptoError::invariant(
                    "all rows of a matrix must have the same size",
                ));
            }
            return Ok(GroupMatrix { rows: Vec::new() });
        }
        let n = rows[0].len();
        if rows.iter().any(|row| row.len() != n) {
            return Err(CryptoError::invariant(
                "all rows of a matrix must have the same size",
            ));
        }
        let first = &rows[0][0];
        let group = first.group().clone();
        let size = first.element_size();
        for element in rows.iter().flatten() {
            if element.group() != &group {
                return Err(CryptoError::invariant(
                    "all elements of a matrix must belong to the same group",
                ));
            }
            if element.element_size() != size {
                return Err(CryptoError::invariant(
                    "all elements of a matrix must have the same size",
                ));
            }
        }
        Ok(GroupMatrix { rows })
    }

    /// Builds a matrix from columns.
    pub fn from_columns(columns: Vec<Vec<E>>) -> Result<Self, CryptoError> {
        Self::from_rows(columns).map(|m| m.transpose())
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, column: usize) -> &E {
        &self.rows[row][column]
    }

    /// The common group, absent for empty matrices.
    pub fn group(&self) -> Option<&E::Group> {
        self.rows.first().and_then(|r| r.first()).map(|e| e.group())
    }

    pub fn element_size(&self) -> Option<usize> {
        self.rows
            .first()
            .and_then(|r| r.first())
            .map(|e| e.element_size())
    }

    pub fn row(&self, index: usize) -> GroupVector<E> {
        GroupVector::try_from_elements(self.rows[index].clone())
            .expect("matrix rows are homogeneous by construction")
    }

    pub fn column(&self, index: usize) -> GroupVector<E> {
        let column = self.rows.iter().map(|row| row[index].clone()).collect();
        GroupVector::try_from_elements(column)
            .expect("matrix columns are homogeneous by construction")
    }

    pub fn rows(&self) -> impl Iterator<Item = GroupVector<E>> + '_ {
        (0..self.n_rows()).map(|i| self.row(i))
    }

    pub fn columns(&self) -> impl Iterator<Item = GroupVector<E>> + '_ {
        (0..self.n_columns()).map(|j| self.column(j))
    }

    pub fn transpose(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        let transposed = (0..self.n_columns())
            .map(|j| self.rows.iter().map(|row| row[j].clone()).collect())
            .collect();
        GroupMatrix { rows: transposed }
    }

    /// A new matrix with `column` appended on the right.
    pub fn append_column(&self, column: &GroupVector<E>) -> Result<Self, CryptoError> {
        if !self.is_empty() && column.len() != self.n_rows() {
            return Err(CryptoError::DimensionMismatch {
                expected: self.n_rows(),
                actual: column.len(),
            });
        }
        let mut columns: Vec<Vec<E>> = self.transpose().rows;
        columns.push(column.as_slice().to_vec());
        Self::from_columns(columns)
    }

    /// A new matrix with `column` prepended on the left.
    pub fn prepend_column(&self, column: &GroupVector<E>) -> Result<Self, CryptoError> {
        if !self.is_empty() && column.len() != self.n_rows() {
            return Err(CryptoError::DimensionMismatch {
                expected: self.n_rows(),
                actual: column.len(),
            });
        }
        let mut columns: Vec<Vec<E>> = vec![column.as_slice().to_vec()];
        columns.extend(self.transpose().rows);
        Self::from_columns(columns)
    }

    /// Flattens row-major back into a vector.
    pub fn to_vector(&self) -> GroupVector<E> {
        GroupVector::try_from_elements(self.rows.iter().flatten().cloned().collect())
            .expect("matrix elements are homogeneous by construction")
    }
}

impl<E: GroupVectorElement + ToHashable> ToHashable for GroupMatrix<E> {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(
            self.rows
                .iter()
                .map(|row| Hashable::List(row.iter().map(|e| e.to_hashable()).collect()))
                .collect(),
        )
    }
}
