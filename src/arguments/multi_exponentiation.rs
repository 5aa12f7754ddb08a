//! Multi-exponentiation argument: proves that a ciphertext is the
//! re-encrypted product of the rows of a ciphertext matrix raised to the
//! columns of a committed exponent matrix.

use crate::elgamal::{
    get_ciphertext_vector_exponentiation, ElGamalMultiRecipientCiphertext,
    ElGamalMultiRecipientMessage, ElGamalMultiRecipientPublicKey,
};
use crate::errors::CryptoError;
use crate::group::{
    GqElement, GqGroup, GroupMatrix, GroupVector, HasGroup, ZqElement, ZqGroup,
};
use crate::hashing::{Hashable, HashService, ToHashable};
use crate::pedersen::{get_commitment, get_commitment_matrix, CommitmentKey};
use crate::random::RandomService;
use crate::verification::{verify_that, VerificationResult};

use super::{check_hash_length, powers};

const LOG_TARGET: &str = "mixnet_primitives::arguments::multi_exponentiation";

/// Statement `(C, C*, c_A)`: an `m × n` ciphertext matrix, the claimed
/// multi-exponentiation product and the commitments to the exponents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiExponentiationStatement {
    pub ciphertext_matrix: GroupMatrix<ElGamalMultiRecipientCiphertext>,
    pub ciphertext: ElGamalMultiRecipientCiphertext,
    pub c_a: GroupVector<GqElement>,
}

/// Witness `(A, r, ρ)` with
/// `C* = Enc(1, ρ) · ∏_i VectorExp(C.row(i), A.col(i))` and
/// `c_A = com(A, r)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiExponentiationWitness {
    pub a: GroupMatrix<ZqElement>,
    pub r: GroupVector<ZqElement>,
    pub rho: ZqElement,
}

/// The argument `(c_{A,0}, c_B, E, a, r, b, s, τ)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiExponentiationArgument {
    pub c_a0: GqElement,
    pub c_b: GroupVector<GqElement>,
    pub e: GroupVector<ElGamalMultiRecipientCiphertext>,
    pub a: GroupVector<ZqElement>,
    pub r: ZqElement,
    pub b: ZqElement,
    pub s: ZqElement,
    pub tau: ZqElement,
}

impl MultiExponentiationArgument {
    /// The row count `m` of the underlying ciphertext matrix.
    pub fn m(&self) -> usize {
        self.c_b.len() / 2
    }
}

impl HasGroup for MultiExponentiationArgument {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.c_a0.group()
    }
}

pub struct MultiExponentiationArgumentService {
    public_key: ElGamalMultiRecipientPublicKey,
    commitment_key: CommitmentKey,
    random: RandomService,
    hash: HashService,
}

impl MultiExponentiationArgumentService {
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
        Ok(MultiExponentiationArgumentService {
            public_key,
            commitment_key,
            random,
            hash,
        })
    }

    pub fn get_multi_exponentiation_argument(
        &self,
        statement: &MultiExponentiationStatement,
        witness: &MultiExponentiationWitness,
    ) -> Result<MultiExponentiationArgument, CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        let (m, n, l) = self.check_statement(statement)?;

        if witness.a.n_rows() != n || witness.a.n_columns() != m || witness.r.len() != m {
            return Err(CryptoError::invalid_argument(
                "the witness dimensions do not match the statement",
            ));
        }

        // Statement-witness consistency.
        if statement.c_a
            != get_commitment_matrix(&witness.a, &witness.r, &self.commitment_key)?
        {
            return Err(CryptoError::precondition(
                "the commitments c_A do not open to the witness",
            ));
        }
        let c_matrix = &statement.ciphertext_matrix;
        let ones = ElGamalMultiRecipientMessage::ones(group, l)?;
        let mut expected = ElGamalMultiRecipientCiphertext::get_ciphertext(
            &ones,
            &witness.rho,
            &self.public_key,
        )?;
        for i in 0..m {
            expected = expected.multiply(&get_ciphertext_vector_exponentiation(
                &c_matrix.row(i),
                &witness.a.column(i),
            )?);
        }
        if statement.ciphertext != expected {
            return Err(CryptoError::precondition(
                "the ciphertext is not the claimed multi-exponentiation",
            ));
        }

        // Fresh first column and masking vectors; the middle entries are
        // pinned so that E_m collapses onto C*.
        let a_0 = self.random.random_exponents(&zq, n)?;
        let r_0 = self.random.random_exponent(&zq)?;
        let mut b = self.random_vector(&zq, 2 * m)?;
        let mut s = self.random_vector(&zq, 2 * m)?;
        let mut tau = self.random_vector(&zq, 2 * m)?;
        b[m] = zq.identity();
        s[m] = zq.identity();
        tau[m] = witness.rho.clone();

        let c_a0 = get_commitment(&a_0, &r_0, &self.commitment_key)?;

        let a_prime_columns: Vec<GroupVector<ZqElement>> = std::iter::once(a_0)
            .chain((0..m).map(|i| witness.a.column(i)))
            .collect();
        let diagonals = Self::diagonal_products(c_matrix, &a_prime_columns, l)?;

        let mut c_b = Vec::with_capacity(2 * m);
        let mut e = Vec::with_capacity(2 * m);
        for k in 0..2 * m {
            c_b.push(get_commitment(
                &GroupVector::single(b[k].clone()),
                &s[k],
                &self.commitment_key,
            )?);
            let masked = ElGamalMultiRecipientMessage::constant(
                group.generator().exponentiate(&b[k]),
                l,
            )?;
            let masking = ElGamalMultiRecipientCiphertext::get_ciphertext(
                &masked,
                &tau[k],
                &self.public_key,
            )?;
            e.push(masking.multiply(&diagonals[k]));
        }
        let c_b = GroupVector::try_from_elements(c_b)?;
        let e = GroupVector::try_from_elements(e)?;

        let x = self.compute_challenge(statement, &c_a0, &c_b, &e)?;
        tracing::debug!(target: LOG_TARGET, challenge = %x, m, n, l, "derived challenge");
        let x_powers = powers(&x, 2 * m);

        // a = Σ_j x^j a'_j and the matching folded randomness.
        let a_response = GroupVector::try_from_elements(
            (0..n)
                .map(|row| {
                    a_prime_columns
                        .iter()
                        .zip(x_powers.iter())
                        .fold(zq.identity(), |acc, (column, x_j)| {
                            acc.add(&x_j.multiply(&column[row]))
                        })
                })
                .collect(),
        )?;
        let r_extended: Vec<ZqElement> = std::iter::once(r_0)
            .chain(witness.r.iter().cloned())
            .collect();
        let r_response = Self::fold(&r_extended, &x_powers[..=m], &zq);
        let b_response = Self::fold(&b, &x_powers, &zq);
        let s_response = Self::fold(&s, &x_powers, &zq);
        let tau_response = Self::fold(&tau, &x_powers, &zq);

        Ok(MultiExponentiationArgument {
            c_a0,
            c_b,
            e,
            a: a_response,
            r: r_response,
            b: b_response,
            s: s_response,
            tau: tau_response,
        })
    }

    pub fn verify_multi_exponentiation_argument(
        &self,
        statement: &MultiExponentiationStatement,
        argument: &MultiExponentiationArgument,
    ) -> Result<VerificationResult, CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        let (m, n, l) = self.check_statement(statement)?;
        if argument.group() != group {
            return Err(CryptoError::invariant(
                "the argument must belong to the commitment key group",
            ));
        }
        if argument.c_b.len() != 2 * m || argument.e.len() != 2 * m {
            return Err(CryptoError::DimensionMismatch {
                expected: 2 * m,
                actual: argument.c_b.len(),
            });
        }
        if argument.a.len() != n {
            return Err(CryptoError::DimensionMismatch {
                expected: n,
                actual: argument.a.len(),
            });
        }
        if argument.e.element_size() != Some(l) {
            return Err(CryptoError::invariant(
                "the diagonal ciphertexts must have the statement's size",
            ));
        }

        let x = self.compute_challenge(statement, &argument.c_a0, &argument.c_b, &argument.e)?;
        let x_powers = powers(&x, 2 * m);
        let c_matrix = &statement.ciphertext_matrix;

        let pinned_commitment_check = verify_that(
            argument.c_b[m]
                == get_commitment(
                    &GroupVector::single(zq.identity()),
                    &zq.identity(),
                    &self.commitment_key,
                )?,
            "the middle masking commitment must commit to zero",
        );
        let pinned_ciphertext_check = verify_that(
            argument.e[m] == statement.ciphertext,
            "the middle diagonal ciphertext must equal the statement ciphertext",
        );

        let a_check = {
            let left = std::iter::once(&argument.c_a0)
                .chain(statement.c_a.iter())
                .zip(x_powers.iter())
                .fold(group.identity(), |acc, (c, x_j)| {
                    acc.multiply(&c.exponentiate(x_j))
                });
            let right = get_commitment(&argument.a, &argument.r, &self.commitment_key)?;
            verify_that(left == right, "the combined commitment to a does not open")
        };

        let b_check = {
            let left = argument
                .c_b
                .iter()
                .zip(x_powers.iter())
                .fold(group.identity(), |acc, (c, x_k)| {
                    acc.multiply(&c.exponentiate(x_k))
                });
            let right = get_commitment(
                &GroupVector::single(argument.b.clone()),
                &argument.s,
                &self.commitment_key,
            )?;
            verify_that(left == right, "the combined masking commitment does not open")
        };

        let e_check = {
            let left = argument
                .e
                .iter()
                .zip(x_powers.iter())
                .fold(
                    ElGamalMultiRecipientCiphertext::neutral(l, group)?,
                    |acc, (e_k, x_k)| acc.multiply(&e_k.exponentiate(x_k)),
                );
            let masked = ElGamalMultiRecipientMessage::constant(
                group.generator().exponentiate(&argument.b),
                l,
            )?;
            let mut right = ElGamalMultiRecipientCiphertext::get_ciphertext(
                &masked,
                &argument.tau,
                &self.public_key,
            )?;
            for i in 0..m {
                let weighted = GroupVector::try_from_elements(
                    argument
                        .a
                        .iter()
                        .map(|a_j| x_powers[m - i - 1].multiply(a_j))
                        .collect(),
                )?;
                right = right.multiply(&get_ciphertext_vector_exponentiation(
                    &c_matrix.row(i),
                    &weighted,
                )?);
            }
            verify_that(
                left == right,
                "the combined diagonal ciphertexts do not match the re-encrypted product",
            )
        };

        Ok(pinned_commitment_check
            .and(|| pinned_ciphertext_check)
            .and(|| a_check)
            .and(|| b_check)
            .and(|| e_check)
            .add_error_message("Failed to verify the multi-exponentiation argument"))
    }

    /// Statement validation shared by prover and verifier; returns
    /// `(m, n, l)`.
    fn check_statement(
        &self,
        statement: &MultiExponentiationStatement,
    ) -> Result<(usize, usize, usize), CryptoError> {
        let group = self.commitment_key.group();
        let c_matrix = &statement.ciphertext_matrix;
        if c_matrix.is_empty() {
            return Err(CryptoError::invalid_argument(
                "the ciphertext matrix must not be empty",
            ));
        }
        let m = c_matrix.n_rows();
        let n = c_matrix.n_columns();
        let l = c_matrix.element_size().expect("non-empty");
        if n > self.commitment_key.size() {
            return Err(CryptoError::DimensionMismatch {
                expected: self.commitment_key.size(),
                actual: n,
            });
        }
        if l > self.public_key.size() {
            return Err(CryptoError::DimensionMismatch {
                expected: self.public_key.size(),
                actual: l,
            });
        }
        if c_matrix.group() != Some(group)
            || statement.ciphertext.group() != group
            || statement.c_a.group() != Some(group)
        {
            return Err(CryptoError::invariant(
                "the statement must belong to the commitment key group",
            ));
        }
        if statement.ciphertext.size() != l {
            return Err(CryptoError::DimensionMismatch {
                expected: l,
                actual: statement.ciphertext.size(),
            });
        }
        if statement.c_a.len() != m {
            return Err(CryptoError::DimensionMismatch {
                expected: m,
                actual: statement.c_a.len(),
            });
        }
        Ok((m, n, l))
    }

    /// `D_k = ∏_{j-i = k-m+1} VectorExp(C.row(i), a'_j)` for `k` in
    /// `[0, 2m)`; the diagonal at `k = m` carries the witness relation.
    fn diagonal_products(
        c_matrix: &GroupMatrix<ElGamalMultiRecipientCiphertext>,
        a_prime_columns: &[GroupVector<ZqElement>],
        l: usize,
    ) -> Result<Vec<ElGamalMultiRecipientCiphertext>, CryptoError> {
        let group = c_matrix.group().expect("non-empty");
        let m = c_matrix.n_rows();
        let mut diagonals = Vec::with_capacity(2 * m);
        for k in 0..2 * m {
            let mut product = ElGamalMultiRecipientCiphertext::neutral(l, group)?;
            for i in 0..m {
                let j = match (i + k + 1).checked_sub(m) {
                    Some(j) if j <= m => j,
                    _ => continue,
                };
                product = product.multiply(&get_ciphertext_vector_exponentiation(
                    &c_matrix.row(i),
                    &a_prime_columns[j],
                )?);
            }
            diagonals.push(product);
        }
        Ok(diagonals)
    }

    fn fold(scalars: &[ZqElement], weights: &[ZqElement], zq: &ZqGroup) -> ZqElement {
        debug_assert_eq!(scalars.len(), weights.len());
        scalars
            .iter()
            .zip(weights.iter())
            .fold(zq.identity(), |acc, (scalar, weight)| {
                acc.add(&weight.multiply(scalar))
            })
    }

    fn random_vector(&self, zq: &ZqGroup, size: usize) -> Result<Vec<ZqElement>, CryptoError> {
        (0..size)
            .map(|_| self.random.random_exponent(zq))
            .collect()
    }

    /// Fixed transcript order:
    /// `(p, q, pk, ck, C, C*, c_A, c_{A,0}, c_B, E)`.
    fn compute_challenge(
        &self,
        statement: &MultiExponentiationStatement,
        c_a0: &GqElement,
        c_b: &GroupVector<GqElement>,
        e: &GroupVector<ElGamalMultiRecipientCiphertext>,
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
                statement.ciphertext_matrix.to_hashable(),
                statement.ciphertext.to_hashable(),
                statement.c_a.to_hashable(),
                c_a0.to_hashable(),
                c_b.to_hashable(),
                e.to_hashable(),
            ],
        )
    }
}
