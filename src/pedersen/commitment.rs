use crate::errors::CryptoError;
use crate::group::{GqElement, GroupMatrix, GroupVector, HasGroup, ZqElement};

use super::commitment_key::CommitmentKey;

/// Pedersen commitment `c = h^r · ∏ g_i^{a_i}`.
///
/// The committed vector may be shorter than the key; the missing tail is
/// treated as zeros, which contribute nothing and are therefore never
/// materialized.
pub fn get_commitment(
    elements: &GroupVector<ZqElement>,
    randomness: &ZqElement,
    commitment_key: &CommitmentKey,
) -> Result<GqElement, CryptoError> {
    if elements.is_empty() {
        return Err(CryptoError::invalid_argument(
            "cannot commit to an empty vector",
        ));
    }
    if elements.len() > commitment_key.size() {
        return Err(CryptoError::DimensionMismatch {
            expected: commitment_key.size(),
            actual: elements.len(),
        });
    }
    if elements.group().expect("non-empty").q() != commitment_key.group().q() {
        return Err(CryptoError::invariant(
            "the committed elements must match the commitment key group order",
        ));
    }
    if randomness.group().q() != commitment_key.group().q() {
        return Err(CryptoError::invariant(
            "the commitment randomness must match the commitment key group order",
        ));
    }

    let commitment = elements
        .iter()
        .enumerate()
        .fold(commitment_key.h().exponentiate(randomness), |acc, (i, a)| {
            acc.multiply(&commitment_key.g(i).exponentiate(a))
        });
    Ok(commitment)
}

/// One single-element commitment per entry: `c_i = h^{r_i} · g_0^{a_i}`.
pub fn get_commitment_vector(
    elements: &GroupVector<ZqElement>,
    randomness: &GroupVector<ZqElement>,
    commitment_key: &CommitmentKey,
) -> Result<GroupVector<GqElement>, CryptoError> {
    if elements.len() != randomness.len() {
        return Err(CryptoError::DimensionMismatch {
            expected: elements.len(),
            actual: randomness.len(),
        });
    }
    let commitments = elements
        .iter()
        .zip(randomness.iter())
        .map(|(a, r)| get_commitment(&GroupVector::single(a.clone()), r, commitment_key))
        .collect::<Result<Vec<_>, _>>()?;
    GroupVector::try_from_elements(commitments)
}

/// One commitment per matrix column: `c_j = h^{r_j} · ∏_i g_i^{A_{i,j}}`.
///
/// The number of rows must not exceed the commitment key width.
pub fn get_commitment_matrix(
    matrix: &GroupMatrix<ZqElement>,
    randomness: &GroupVector<ZqElement>,
    commitment_key: &CommitmentKey,
) -> Result<GroupVector<GqElement>, CryptoError> {
    if matrix.is_empty() {
        return Err(CryptoError::invalid_argument(
            "cannot commit to an empty matrix",
        ));
    }
    if matrix.n_rows() > commitment_key.size() {
        return Err(CryptoError::DimensionMismatch {
            expected: commitment_key.size(),
            actual: matrix.n_rows(),
        });
    }
    if randomness.len() != matrix.n_columns() {
        return Err(CryptoError::DimensionMismatch {
            expected: matrix.n_columns(),
            actual: randomness.len(),
        });
    }
    let commitments = (0..matrix.n_columns())
        .map(|j| get_commitment(&matrix.column(j), &randomness[j], commitment_key))
        .collect::<Result<Vec<_>, _>>()?;
    GroupVector::try_from_elements(commitments)
}
