//! Product argument: proves that the entries of a committed matrix
//! multiply to a public value, via a Hadamard argument over the columns
//! and a single-value product argument over their entrywise product.

use crate::elgamal::ElGamalMultiRecipientPublicKey;
use crate::errors::CryptoError;
use crate::group::{
    GqElement, GqGroup, GroupMatrix, GroupVector, HasGroup, ZqElement, ZqGroup,
};
use crate::hashing::HashService;
use crate::pedersen::{get_commitment, get_commitment_matrix, CommitmentKey};
use crate::random::RandomService;
use crate::verification::VerificationResult;

use super::hadamard::{
    HadamardArgument, HadamardArgumentService, HadamardStatement, HadamardWitness,
};
use super::single_value_product::{
    SingleValueProductArgument, SingleValueProductArgumentService, SingleValueProductStatement,
    SingleValueProductWitness,
};
use super::check_hash_length;

const LOG_TARGET: &str = "mixnet_primitives::arguments::product";

/// Statement `(c_A, b)` with `b = ∏_{i,j} A_{i,j}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductStatement {
    pub c_a: GroupVector<GqElement>,
    pub b: ZqElement,
}

/// Witness `(A, r)` with `c_A = com(A, r)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductWitness {
    pub a: GroupMatrix<ZqElement>,
    pub r: GroupVector<ZqElement>,
}

/// The argument: for `m > 1` a commitment to the column product with a
/// Hadamard argument; always a single-value product argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductArgument {
    pub c_b: Option<GqElement>,
    pub hadamard_argument: Option<HadamardArgument>,
    pub single_value_product_argument: SingleValueProductArgument,
}

impl HasGroup for ProductArgument {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.single_value_product_argument.group()
    }
}

pub struct ProductArgumentService {
    commitment_key: CommitmentKey,
    random: RandomService,
    hadamard_argument_service: HadamardArgumentService,
    single_value_product_argument_service: SingleValueProductArgumentService,
}

impl ProductArgumentService {
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
        let hadamard_argument_service = HadamardArgumentService::new(
            public_key.clone(),
            commitment_key.clone(),
            random.clone(),
            hash.clone(),
        )?;
        let single_value_product_argument_service = SingleValueProductArgumentService::new(
            public_key,
            commitment_key.clone(),
            random.clone(),
            hash,
        )?;
        Ok(ProductArgumentService {
            commitment_key,
            random,
            hadamard_argument_service,
            single_value_product_argument_service,
        })
    }

    pub fn get_product_argument(
        &self,
        statement: &ProductStatement,
        witness: &ProductWitness,
    ) -> Result<ProductArgument, CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        let m = statement.c_a.len();
        if m == 0 {
            return Err(CryptoError::invalid_argument(
                "the statement must contain at least one commitment",
            ));
        }
        if statement.c_a.group() != Some(group) {
            return Err(CryptoError::invariant(
                "the statement must belong to the commitment key group",
            ));
        }
        let a = &witness.a;
        let n = a.n_rows();
        if a.n_columns() != m || witness.r.len() != m {
            return Err(CryptoError::invalid_argument(
                "the witness dimensions do not match the statement",
            ));
        }
        if n < 2 || n > self.commitment_key.size() {
            return Err(CryptoError::invalid_argument(format!(
                "the matrix must have between 2 and {} rows, got {n}",
                self.commitment_key.size()
            )));
        }
        if statement.c_a != get_commitment_matrix(a, &witness.r, &self.commitment_key)? {
            return Err(CryptoError::precondition(
                "the commitments c_A do not open to the witness",
            ));
        }
        let product = a
            .rows()
            .flat_map(|row| row.into_iter())
            .fold(zq.one(), |acc, entry| acc.multiply(&entry));
        if statement.b != product {
            return Err(CryptoError::precondition(
                "the claimed product does not match the witness",
            ));
        }

        if m > 1 {
            // Column Hadamard product, committed fresh.
            let b_vector = (1..m).fold(a.column(0), |acc, i| {
                GroupVector::try_from_elements(
                    acc.iter()
                        .zip(a.column(i).iter())
                        .map(|(x, y)| x.multiply(y))
                        .collect(),
                )
                .expect("entrywise products stay homogeneous")
            });
            let s = self.random.random_exponent(&zq)?;
            let c_b = get_commitment(&b_vector, &s, &self.commitment_key)?;

            let hadamard_argument = self.hadamard_argument_service.get_hadamard_argument(
                &HadamardStatement {
                    c_a: statement.c_a.clone(),
                    c_b: c_b.clone(),
                },
                &HadamardWitness {
                    a: a.clone(),
                    b: b_vector.clone(),
                    r: witness.r.clone(),
                    s: s.clone(),
                },
            )?;
            let single_value_product_argument = self
                .single_value_product_argument_service
                .get_single_value_product_argument(
                    &SingleValueProductStatement {
                        commitment: c_b.clone(),
                        product: statement.b.clone(),
                    },
                    &SingleValueProductWitness {
                        elements: b_vector,
                        randomness: s,
                    },
                )?;
            tracing::debug!(target: LOG_TARGET, m, n, "generated product argument");
            Ok(ProductArgument {
                c_b: Some(c_b),
                hadamard_argument: Some(hadamard_argument),
                single_value_product_argument,
            })
        } else {
            let single_value_product_argument = self
                .single_value_product_argument_service
                .get_single_value_product_argument(
                    &SingleValueProductStatement {
                        commitment: statement.c_a[0].clone(),
                        product: statement.b.clone(),
                    },
                    &SingleValueProductWitness {
                        elements: a.column(0),
                        randomness: witness.r[0].clone(),
                    },
                )?;
            tracing::debug!(target: LOG_TARGET, m, n, "generated single-column product argument");
            Ok(ProductArgument {
                c_b: None,
                hadamard_argument: None,
                single_value_product_argument,
            })
        }
    }

    pub fn verify_product_argument(
        &self,
        statement: &ProductStatement,
        argument: &ProductArgument,
    ) -> Result<VerificationResult, CryptoError> {
        let group = self.commitment_key.group();
        let m = statement.c_a.len();
        if m == 0 {
            return Err(CryptoError::invalid_argument(
                "the statement must contain at least one commitment",
            ));
        }
        if statement.c_a.group() != Some(group) || argument.group() != group {
            return Err(CryptoError::invariant(
                "the statement and argument must belong to the commitment key group",
            ));
        }

        if m > 1 {
            let c_b = argument.c_b.as_ref().ok_or_else(|| {
                CryptoError::invalid_argument(
                    "a multi-column product argument must carry a product commitment",
                )
            })?;
            let hadamard_argument = argument.hadamard_argument.as_ref().ok_or_else(|| {
                CryptoError::invalid_argument(
                    "a multi-column product argument must carry a Hadamard argument",
                )
            })?;
            let hadamard_check = self.hadamard_argument_service.verify_hadamard_argument(
                &HadamardStatement {
                    c_a: statement.c_a.clone(),
                    c_b: c_b.clone(),
                },
                hadamard_argument,
            )?;
            let svp_check = self
                .single_value_product_argument_service
                .verify_single_value_product_argument(
                    &SingleValueProductStatement {
                        commitment: c_b.clone(),
                        product: statement.b.clone(),
                    },
                    &argument.single_value_product_argument,
                )?;
            Ok(hadamard_check
                .and(|| svp_check)
                .add_error_message("Failed to verify the product argument"))
        } else {
            let svp_check = self
                .single_value_product_argument_service
                .verify_single_value_product_argument(
                    &SingleValueProductStatement {
                        commitment: statement.c_a[0].clone(),
                        product: statement.b.clone(),
                    },
                    &argument.single_value_product_argument,
                )?;
            Ok(svp_check.add_error_message("Failed to verify the product argument"))
        }
    }
}
