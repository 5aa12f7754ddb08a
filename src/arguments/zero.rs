//! Zero argument: proves that the columns of two committed matrices
//! cancel under the bilinear star map, `Σ_i A.col(i) ⋆_y B.col(i) = 0`.

use crate::elgamal::ElGamalMultiRecipientPublicKey;
use crate::errors::CryptoError;
use crate::group::{
    GqElement, GqGroup, GroupMatrix, GroupVector, HasGroup, ZqElement, ZqGroup,
};
use crate::hashing::{Hashable, HashService, ToHashable};
use crate::pedersen::{get_commitment, get_commitment_matrix, get_commitment_vector, CommitmentKey};
use crate::random::RandomService;
use crate::verification::{verify_that, VerificationResult};

use super::{check_hash_length, powers, star_map};

const LOG_TARGET: &str = "mixnet_primitives::arguments::zero";

/// Statement `(c_A, c_B, y)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZeroStatement {
    pub c_a: GroupVector<GqElement>,
    pub c_b: GroupVector<GqElement>,
    pub y: ZqElement,
}

/// Witness `(A, B, r, s)` with `c_A = com(A, r)`, `c_B = com(B, s)` and
/// `Σ_i A.col(i) ⋆_y B.col(i) = 0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZeroWitness {
    pub a: GroupMatrix<ZqElement>,
    pub b: GroupMatrix<ZqElement>,
    pub r: GroupVector<ZqElement>,
    pub s: GroupVector<ZqElement>,
}

/// The argument `(c_{A,0}, c_{B,m}, c_d, a', b', r', s', t')`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZeroArgument {
    pub c_a0: GqElement,
    pub c_bm: GqElement,
    pub c_d: GroupVector<GqElement>,
    pub a_prime: GroupVector<ZqElement>,
    pub b_prime: GroupVector<ZqElement>,
    pub r_prime: ZqElement,
    pub s_prime: ZqElement,
    pub t_prime: ZqElement,
}

impl ZeroArgument {
    /// The column count `m` of the underlying matrices.
    pub fn m(&self) -> usize {
        (self.c_d.len() - 1) / 2
    }
}

impl HasGroup for ZeroArgument {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.c_a0.group()
    }
}

pub struct ZeroArgumentService {
    public_key: ElGamalMultiRecipientPublicKey,
    commitment_key: CommitmentKey,
    random: RandomService,
    hash: HashService,
}

impl ZeroArgumentService {
    pub fn new(
        public_key: ElGamalMultiRecipientPublicKey,
        commitment_key: CommitmentKey,
        random: RandomService,
        hash: HashService,
    ) -> Result<Self, CryptoError> {
        if public_key.group() != commitment_key.group() {
            return Err(CryptoError::invariant(
                "the public key and the commitment key must belong to the same group",
            ));
        }
        check_hash_length(&hash, commitment_key.group())?;
        Ok(ZeroArgumentService {
            public_key,
            commitment_key,
            random,
            hash,
        })
    }

    pub fn get_zero_argument(
        &self,
        statement: &ZeroStatement,
        witness: &ZeroWitness,
    ) -> Result<ZeroArgument, CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        let m = statement.c_a.len();
        if m == 0 || statement.c_b.len() != m {
            return Err(CryptoError::invalid_argument(
                "the statement commitment vectors must be non-empty and of equal size",
            ));
        }
        if statement.c_a.group() != Some(group) || statement.c_b.group() != Some(group) {
            return Err(CryptoError::invariant(
                "the statement must belong to the commitment key group",
            ));
        }
        let a = &witness.a;
        let b = &witness.b;
        let n = a.n_rows();
        if a.n_columns() != m || b.n_columns() != m || b.n_rows() != n {
            return Err(CryptoError::invalid_argument(
                "the witness matrices must be n x m with m matching the statement",
            ));
        }
        if n == 0 || n > self.commitment_key.size() {
            return Err(CryptoError::DimensionMismatch {
                expected: self.commitment_key.size(),
                actual: n,
            });
        }
        if witness.r.len() != m || witness.s.len() != m {
            return Err(CryptoError::invalid_argument(
                "the witness randomness vectors must have one entry per column",
            ));
        }

        // Statement-witness consistency.
        if statement.c_a != get_commitment_matrix(a, &witness.r, &self.commitment_key)? {
            return Err(CryptoError::precondition(
                "the commitments c_A do not open to the witness",
            ));
        }
        if statement.c_b != get_commitment_matrix(b, &witness.s, &self.commitment_key)? {
            return Err(CryptoError::precondition(
                "the commitments c_B do not open to the witness",
            ));
        }
        let y = &statement.y;
        let sum = (0..m)
            .map(|i| star_map(&a.column(i), &b.column(i), y))
            .fold(zq.identity(), |acc, term| acc.add(&term));
        if sum != zq.identity() {
            return Err(CryptoError::precondition(
                "the witness columns do not cancel under the star map",
            ));
        }

        let a_0 = self.random.random_exponents(&zq, n)?;
        let b_m = self.random.random_exponents(&zq, n)?;
        let r_0 = self.random.random_exponent(&zq)?;
        let s_m = self.random.random_exponent(&zq)?;
        let c_a0 = get_commitment(&a_0, &r_0, &self.commitment_key)?;
        let c_bm = get_commitment(&b_m, &s_m, &self.commitment_key)?;

        // Extended column families a'_0..a'_m and b'_0..b'_m.
        let a_columns: Vec<GroupVector<ZqElement>> = std::iter::once(a_0.clone())
            .chain((0..m).map(|i| a.column(i)))
            .collect();
        let b_columns: Vec<GroupVector<ZqElement>> = (0..m)
            .map(|j| b.column(j))
            .chain(std::iter::once(b_m.clone()))
            .collect();

        // d_k = Σ_{i-j = k-m} a'_i ⋆_y b'_j; the middle-plus-one entry is
        // the statement sum and is forced to zero before committing.
        let mut d = Vec::with_capacity(2 * m + 1);
        for k in 0..=2 * m {
            let mut d_k = zq.identity();
            for i in 0..=m {
                let j = match (i + m).checked_sub(k) {
                    Some(j) if j <= m => j,
                    _ => continue,
                };
                d_k = d_k.add(&star_map(&a_columns[i], &b_columns[j], y));
            }
            d.push(d_k);
        }
        d[m + 1] = zq.identity();

        let mut t = Vec::with_capacity(2 * m + 1);
        for _ in 0..=2 * m {
            t.push(self.random.random_exponent(&zq)?);
        }
        t[m + 1] = zq.identity();

        let d = GroupVector::try_from_elements(d)?;
        let t = GroupVector::try_from_elements(t)?;
        let c_d = get_commitment_vector(&d, &t, &self.commitment_key)?;

        let x = self.compute_challenge(statement, &c_a0, &c_bm, &c_d)?;
        tracing::debug!(target: LOG_TARGET, challenge = %x, m, n, "derived challenge");
        let x_powers = powers(&x, 2 * m + 1);

        let a_prime = Self::combine_columns(&a_columns, &x_powers[..=m], &zq);
        let b_prime = Self::combine_columns(
            &b_columns,
            &(0..=m).map(|j| x_powers[m - j].clone()).collect::<Vec<_>>(),
            &zq,
        );

        let r_extended: Vec<ZqElement> = std::iter::once(r_0)
            .chain(witness.r.iter().cloned())
            .collect();
        let r_prime = Self::combine_scalars(&r_extended, &x_powers[..=m], &zq);
        let s_extended: Vec<ZqElement> = witness
            .s
            .iter()
            .cloned()
            .chain(std::iter::once(s_m))
            .collect();
        let s_prime = Self::combine_scalars(
            &s_extended,
            &(0..=m).map(|j| x_powers[m - j].clone()).collect::<Vec<_>>(),
            &zq,
        );
        let t_prime = Self::combine_scalars(t.as_slice(), &x_powers, &zq);

        Ok(ZeroArgument {
            c_a0,
            c_bm,
            c_d,
            a_prime,
            b_prime,
            r_prime,
            s_prime,
            t_prime,
        })
    }

    pub fn verify_zero_argument(
        &self,
        statement: &ZeroStatement,
        argument: &ZeroArgument,
    ) -> Result<VerificationResult, CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        let m = statement.c_a.len();
        if m == 0 || statement.c_b.len() != m {
            return Err(CryptoError::invalid_argument(
                "the statement commitment vectors must be non-empty and of equal size",
            ));
        }
        if argument.group() != group
            || statement.c_a.group() != Some(group)
            || statement.c_b.group() != Some(group)
        {
            return Err(CryptoError::invariant(
                "the statement and argument must belong to the commitment key group",
            ));
        }
        if argument.c_d.len() != 2 * m + 1 {
            return Err(CryptoError::DimensionMismatch {
                expected: 2 * m + 1,
                actual: argument.c_d.len(),
            });
        }
        let n = argument.a_prime.len();
        if n == 0 || argument.b_prime.len() != n || n > self.commitment_key.size() {
            return Err(CryptoError::invalid_argument(
                "the argument responses have inconsistent sizes",
            ));
        }

        let x = self.compute_challenge(statement, &argument.c_a0, &argument.c_bm, &argument.c_d)?;
        let x_powers = powers(&x, 2 * m + 1);

        let forced_zero_check = verify_that(
            argument.c_d[m + 1] == get_commitment(
                &GroupVector::single(zq.identity()),
                &zq.identity(),
                &self.commitment_key,
            )?,
            "the forced-zero diagonal commitment is not a commitment to zero",
        );

        let a_check = {
            let left = std::iter::once(&argument.c_a0)
                .chain(statement.c_a.iter())
                .zip(x_powers.iter())
                .fold(group.identity(), |acc, (c, x_i)| {
                    acc.multiply(&c.exponentiate(x_i))
                });
            let right = get_commitment(&argument.a_prime, &argument.r_prime, &self.commitment_key)?;
            verify_that(left == right, "the combined commitment to a' does not open")
        };

        let b_check = {
            let left = statement
                .c_b
                .iter()
                .chain(std::iter::once(&argument.c_bm))
                .enumerate()
                .fold(group.identity(), |acc, (j, c)| {
                    acc.multiply(&c.exponentiate(&x_powers[m - j]))
                });
            let right = get_commitment(&argument.b_prime, &argument.s_prime, &self.commitment_key)?;
            verify_that(left == right, "the combined commitment to b' does not open")
        };

        let d_check = {
            let left = argument
                .c_d
                .iter()
                .zip(x_powers.iter())
                .fold(group.identity(), |acc, (c, x_k)| {
                    acc.multiply(&c.exponentiate(x_k))
                });
            let star = star_map(&argument.a_prime, &argument.b_prime, &statement.y);
            let right = get_commitment(
                &GroupVector::single(star),
                &argument.t_prime,
                &self.commitment_key,
            )?;
            verify_that(left == right, "the combined diagonal commitment does not open")
        };

        Ok(forced_zero_check
            .and(|| a_check)
            .and(|| b_check)
            .and(|| d_check)
            .add_error_message("Failed to verify the zero argument"))
    }

    /// Fixed transcript order:
    /// `(p, q, pk, ck, c_A, c_B, y, c_{A,0}, c_{B,m}, c_d)`.
    fn compute_challenge(
        &self,
        statement: &ZeroStatement,
        c_a0: &GqElement,
        c_bm: &GqElement,
        c_d: &GroupVector<GqElement>,
    ) -> Result<ZqElement, CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        self.hash.recursive_hash_to_zq(
            &zq,
            &[
                Hashable::Integer(group.p().clone()),
                Hashable::Integer(group.q().clone()),
                self.public_key.to_hashable(),
                self.commitment_key.to_hashable(),
                statement.c_a.to_hashable(),
                statement.c_b.to_hashable(),
                statement.y.to_hashable(),
                c_a0.to_hashable(),
                c_bm.to_hashable(),
                c_d.to_hashable(),
            ],
        )
    }

    /// `Σ_k weights[k] · columns[k]`, componentwise over column vectors.
    fn combine_columns(
        columns: &[GroupVector<ZqElement>],
        weights: &[ZqElement],
        zq: &ZqGroup,
    ) -> GroupVector<ZqElement> {
        debug_assert_eq!(columns.len(), weights.len());
        let n = columns[0].len();
        let combined = (0..n)
            .map(|row| {
                columns
                    .iter()
                    .zip(weights.iter())
                    .fold(zq.identity(), |acc, (column, weight)| {
                        acc.add(&weight.multiply(&column[row]))
                    })
            })
            .collect();
        GroupVector::try_from_elements(combined)
            .expect("combinations of homogeneous vectors stay homogeneous")
    }

    fn combine_scalars(
        scalars: &[ZqElement],
        weights: &[ZqElement],
        zq: &ZqGroup,
    ) -> ZqElement {
        debug_assert_eq!(scalars.len(), weights.len());
        scalars
            .iter()
            .zip(weights.iter())
            .fold(zq.identity(), |acc, (scalar, weight)| {
                acc.add(&weight.multiply(scalar))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;

    fn service(context: &TestContext) -> ZeroArgumentService {
        ZeroArgumentService::new(
            context.key_pair.public_key().clone(),
            context.commitment_key.clone(),
            context.random.clone(),
            context.hash.clone(),
        )
        .unwrap()
    }

    /// Builds a valid statement-witness pair: B's last column is adjusted so
    /// the star-map sum cancels.
    fn statement_and_witness(
        context: &TestContext,
        n: usize,
        m: usize,
    ) -> (ZeroStatement, ZeroWitness) {
        let zq = &context.zq;
        let y = context.zq_element(3);

        let a = GroupMatrix::from_columns(
            (0..m)
                .map(|i| {
                    (0..n)
                        .map(|row| context.zq_element((2 + 3 * i + row) as u32))
                        .collect::<Vec<_>>()
                })
                .collect(),
        )
        .unwrap();

        // All B columns but the last are arbitrary; the last cancels the sum.
        let mut b_columns: Vec<Vec<ZqElement>> = (0..m - 1)
            .map(|i| {
                (0..n)
                    .map(|row| context.zq_element((5 + 2 * i + 7 * row) as u32))
                    .collect()
            })
            .collect();
        let partial_sum = (0..m - 1)
            .map(|i| {
                star_map(
                    &a.column(i),
                    &GroupVector::try_from_elements(b_columns[i].clone()).unwrap(),
                    &y,
                )
            })
            .fold(zq.identity(), |acc, term| acc.add(&term));
        // Solve a_last ⋆_y b_last = -partial_sum with b_last zero except in
        // the first coordinate: coefficient is a_last[0] · y.
        let a_last = a.column(m - 1);
        let coefficient = a_last[0].multiply(&y);
        let first = partial_sum.negate().multiply(&coefficient.invert().unwrap());
        let mut last_column = vec![zq.identity(); n];
        last_column[0] = first;
        b_columns.push(last_column);
        let b = GroupMatrix::from_columns(b_columns).unwrap();

        let r = context
            .random
            .random_exponents(zq, m)
            .unwrap();
        let s = context.random.random_exponents(zq, m).unwrap();
        let c_a = get_commitment_matrix(&a, &r, &context.commitment_key).unwrap();
        let c_b = get_commitment_matrix(&b, &s, &context.commitment_key).unwrap();

        (
            ZeroStatement { c_a, c_b, y },
            ZeroWitness { a, b, r, s },
        )
    }

    #[test]
    fn proves_and_verifies() {
        let context = TestContext::new(201, 3, 5);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, 3, 2);
        let argument = service.get_zero_argument(&statement, &witness).unwrap();
        assert_eq!(argument.m(), 2);
        assert!(service
            .verify_zero_argument(&statement, &argument)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn larger_dimensions_round_trip() {
        let context = TestContext::new(202, 3, 6);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, 4, 3);
        let argument = service.get_zero_argument(&statement, &witness).unwrap();
        assert!(service
            .verify_zero_argument(&statement, &argument)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn rejects_non_cancelling_witness() {
        let context = TestContext::new(203, 3, 5);
        let service = service(&context);
        let (statement, mut witness) = statement_and_witness(&context, 3, 2);
        // Perturb one witness entry; the commitments no longer open.
        let perturbed = witness.b.column(0).as_slice().to_vec();
        let mut columns: Vec<Vec<ZqElement>> =
            (0..2).map(|j| witness.b.column(j).as_slice().to_vec()).collect();
        columns[0][0] = perturbed[0].add(&context.zq_element(1));
        witness.b = GroupMatrix::from_columns(columns).unwrap();
        assert!(matches!(
            service.get_zero_argument(&statement, &witness),
            Err(CryptoError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn tampered_argument_fails_verification() {
        let context = TestContext::new(204, 3, 5);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, 3, 2);
        let argument = service.get_zero_argument(&statement, &witness).unwrap();

        let mut tampered = argument.clone();
        tampered.t_prime = tampered.t_prime.add(&context.zq_element(1));
        let result = service.verify_zero_argument(&statement, &tampered).unwrap();
        assert!(!result.is_verified());

        let mut swapped = argument.clone();
        swapped.c_a0 = swapped.c_bm.clone();
        // Either the challenge shifts or a commitment equation breaks.
        assert!(!service
            .verify_zero_argument(&statement, &swapped)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn wrong_diagonal_length_is_a_hard_error() {
        let context = TestContext::new(205, 3, 5);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, 3, 2);
        let argument = service.get_zero_argument(&statement, &witness).unwrap();
        let mut truncated = argument.clone();
        truncated.c_d = GroupVector::try_from_elements(
            truncated.c_d.as_slice()[..4].to_vec(),
        )
        .unwrap();
        assert!(service.verify_zero_argument(&statement, &truncated).is_err());
    }
}
