//! Single-value product argument: proves knowledge of an opening
//! `(a, r)` of a committed vector whose entries multiply to a public
//! value `b`.

use crate::elgamal::ElGamalMultiRecipientPublicKey;
use crate::errors::CryptoError;
use crate::group::{GqElement, GqGroup, GroupVector, HasGroup, ZqElement, ZqGroup};
use crate::hashing::{Hashable, HashService, ToHashable};
use crate::pedersen::{get_commitment, CommitmentKey};
use crate::random::RandomService;
use crate::verification::{verify_that, VerificationResult};

use super::check_hash_length;

const LOG_TARGET: &str = "mixnet_primitives::arguments::single_value_product";

/// Statement `(c_a, b)`: a commitment and the claimed product of the
/// committed entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleValueProductStatement {
    pub commitment: GqElement,
    pub product: ZqElement,
}

/// Witness `(a, r)` with `c_a = com(a, r)` and `b = ∏ a_i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleValueProductWitness {
    pub elements: GroupVector<ZqElement>,
    pub randomness: ZqElement,
}

/// The argument `(c_d, c_δ, c_Δ, ã, b̃, r̃, s̃)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleValueProductArgument {
    pub c_d: GqElement,
    pub c_lower_delta: GqElement,
    pub c_upper_delta: GqElement,
    pub a_tilde: GroupVector<ZqElement>,
    pub b_tilde: GroupVector<ZqElement>,
    pub r_tilde: ZqElement,
    pub s_tilde: ZqElement,
}

impl SingleValueProductArgument {
    pub fn size(&self) -> usize {
        self.a_tilde.len()
    }
}

impl HasGroup for SingleValueProductArgument {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.c_d.group()
    }
}

#[derive(Debug)]
pub struct SingleValueProductArgumentService {
    public_key: ElGamalMultiRecipientPublicKey,
    commitment_key: CommitmentKey,
    random: RandomService,
    hash: HashService,
}

impl SingleValueProductArgumentService {
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
        Ok(SingleValueProductArgumentService {
            public_key,
            commitment_key,
            random,
            hash,
        })
    }

    /// Proves the statement with the given witness.
    pub fn get_single_value_product_argument(
        &self,
        statement: &SingleValueProductStatement,
        witness: &SingleValueProductWitness,
    ) -> Result<SingleValueProductArgument, CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        if statement.commitment.group() != group {
            return Err(CryptoError::invariant(
                "the statement must belong to the commitment key group",
            ));
        }
        let a = &witness.elements;
        let n = a.len();
        if n < 2 {
            return Err(CryptoError::invalid_argument(
                "the committed vector must have at least two entries",
            ));
        }
        if n > self.commitment_key.size() {
            return Err(CryptoError::DimensionMismatch {
                expected: self.commitment_key.size(),
                actual: n,
            });
        }
        if a.group() != Some(&zq) {
            return Err(CryptoError::invariant(
                "the witness must match the commitment key group order",
            ));
        }

        // Statement-witness consistency.
        let expected_commitment =
            get_commitment(a, &witness.randomness, &self.commitment_key)?;
        if statement.commitment != expected_commitment {
            return Err(CryptoError::precondition(
                "the commitment does not open to the witness",
            ));
        }
        let product = a
            .iter()
            .skip(1)
            .fold(a[0].clone(), |acc, a_i| acc.multiply(a_i));
        if statement.product != product {
            return Err(CryptoError::precondition(
                "the product does not match the witness",
            ));
        }

        // Prefix products b_k = a_0 · … · a_k.
        let mut b = Vec::with_capacity(n);
        b.push(a[0].clone());
        for k in 1..n {
            b.push(b[k - 1].multiply(&a[k]));
        }

        let d = self.random.random_exponents(&zq, n)?;
        let r_d = self.random.random_exponent(&zq)?;
        // δ_0 = d_0 and δ_{n-1} = 0 pin the endpoint checks of the verifier.
        let mut delta = Vec::with_capacity(n);
        delta.push(d[0].clone());
        for _ in 1..n - 1 {
            delta.push(self.random.random_exponent(&zq)?);
        }
        delta.push(zq.identity());
        let s_0 = self.random.random_exponent(&zq)?;
        let s_x = self.random.random_exponent(&zq)?;

        let c_d = get_commitment(&d, &r_d, &self.commitment_key)?;
        let lower = GroupVector::try_from_elements(
            (0..n - 1)
                .map(|k| delta[k].negate().multiply(&d[k + 1]))
                .collect(),
        )?;
        let upper = GroupVector::try_from_elements(
            (0..n - 1)
                .map(|k| {
                    delta[k + 1]
                        .subtract(&a[k + 1].multiply(&delta[k]))
                        .subtract(&b[k].multiply(&d[k + 1]))
                })
                .collect(),
        )?;
        let c_lower_delta = get_commitment(&lower, &s_0, &self.commitment_key)?;
        let c_upper_delta = get_commitment(&upper, &s_x, &self.commitment_key)?;

        let x = self.compute_challenge(statement, &c_d, &c_lower_delta, &c_upper_delta)?;
        tracing::debug!(target: LOG_TARGET, challenge = %x, "derived challenge");

        let a_tilde = GroupVector::try_from_elements(
            (0..n).map(|k| d[k].add(&x.multiply(&a[k]))).collect(),
        )?;
        let b_tilde = GroupVector::try_from_elements(
            (0..n)
                .map(|k| delta[k].add(&x.multiply(&b[k])))
                .collect(),
        )?;
        let r_tilde = r_d.add(&x.multiply(&witness.randomness));
        let s_tilde = s_0.add(&x.multiply(&s_x));

        Ok(SingleValueProductArgument {
            c_d,
            c_lower_delta,
            c_upper_delta,
            a_tilde,
            b_tilde,
            r_tilde,
            s_tilde,
        })
    }

    /// Verifies the argument against the statement; semantic mismatches
    /// accumulate in the result, malformed inputs are hard errors.
    pub fn verify_single_value_product_argument(
        &self,
        statement: &SingleValueProductStatement,
        argument: &SingleValueProductArgument,
    ) -> Result<VerificationResult, CryptoError> {
        let group = self.commitment_key.group();
        if statement.commitment.group() != group || argument.group() != group {
            return Err(CryptoError::invariant(
                "the statement and argument must belong to the commitment key group",
            ));
        }
        if statement.product.group().q() != group.q() {
            return Err(CryptoError::invariant(
                "the claimed product must match the commitment key group order",
            ));
        }
        let n = argument.a_tilde.len();
        if n < 2 || argument.b_tilde.len() != n {
            return Err(CryptoError::invalid_argument(
                "the argument responses have inconsistent sizes",
            ));
        }
        if n > self.commitment_key.size() {
            return Err(CryptoError::DimensionMismatch {
                expected: self.commitment_key.size(),
                actual: n,
            });
        }

        let x = self.compute_challenge(
            statement,
            &argument.c_d,
            &argument.c_lower_delta,
            &argument.c_upper_delta,
        )?;

        let a_tilde = &argument.a_tilde;
        let b_tilde = &argument.b_tilde;

        let commitment_check = {
            let left = get_commitment(a_tilde, &argument.r_tilde, &self.commitment_key)?;
            let right = statement
                .commitment
                .exponentiate(&x)
                .multiply(&argument.c_d);
            verify_that(left == right, "the commitment to ã does not open correctly")
        };

        let delta_check = {
            let e = GroupVector::try_from_elements(
                (0..n - 1)
                    .map(|k| {
                        x.multiply(&b_tilde[k + 1])
                            .subtract(&b_tilde[k].multiply(&a_tilde[k + 1]))
                    })
                    .collect(),
            )?;
            let left = get_commitment(&e, &argument.s_tilde, &self.commitment_key)?;
            let right = argument
                .c_upper_delta
                .exponentiate(&x)
                .multiply(&argument.c_lower_delta);
            verify_that(left == right, "the delta commitments do not open correctly")
        };

        let first_check = verify_that(
            b_tilde[0] == a_tilde[0],
            "the first product response does not match",
        );
        let last_check = verify_that(
            *b_tilde.last().expect("non-empty") == x.multiply(&statement.product),
            "the last product response does not match the claimed product",
        );

        Ok(commitment_check
            .and(|| delta_check)
            .and(|| first_check)
            .and(|| last_check)
            .add_error_message("Failed to verify the single value product argument"))
    }

    /// Fixed transcript order: `(p, q, pk, ck, c_a, b, c_d, c_δ, c_Δ)`.
    fn compute_challenge(
        &self,
        statement: &SingleValueProductStatement,
        c_d: &GqElement,
        c_lower_delta: &GqElement,
        c_upper_delta: &GqElement,
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
                statement.commitment.to_hashable(),
                statement.product.to_hashable(),
                c_d.to_hashable(),
                c_lower_delta.to_hashable(),
                c_upper_delta.to_hashable(),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;

    fn service(context: &TestContext) -> SingleValueProductArgumentService {
        SingleValueProductArgumentService::new(
            context.key_pair.public_key().clone(),
            context.commitment_key.clone(),
            context.random.clone(),
            context.hash.clone(),
        )
        .unwrap()
    }

    fn statement_and_witness(
        context: &TestContext,
        values: &[u32],
    ) -> (SingleValueProductStatement, SingleValueProductWitness) {
        let elements = context.zq_vector(values);
        let randomness = context.random.random_exponent(&context.zq).unwrap();
        let commitment =
            get_commitment(&elements, &randomness, &context.commitment_key).unwrap();
        let product = elements
            .iter()
            .skip(1)
            .fold(elements[0].clone(), |acc, a| acc.multiply(a));
        (
            SingleValueProductStatement {
                commitment,
                product,
            },
            SingleValueProductWitness {
                elements,
                randomness,
            },
        )
    }

    #[test]
    fn proves_and_verifies() {
        let context = TestContext::new(101, 3, 5);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, &[3, 7, 50, 123]);
        let argument = service
            .get_single_value_product_argument(&statement, &witness)
            .unwrap();
        let result = service
            .verify_single_value_product_argument(&statement, &argument)
            .unwrap();
        assert!(result.is_verified());
    }

    #[test]
    fn minimal_size_round_trips() {
        let context = TestContext::new(102, 3, 5);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, &[9, 4]);
        let argument = service
            .get_single_value_product_argument(&statement, &witness)
            .unwrap();
        assert!(service
            .verify_single_value_product_argument(&statement, &argument)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn rejects_inconsistent_witness() {
        let context = TestContext::new(103, 3, 5);
        let service = service(&context);
        let (mut statement, witness) = statement_and_witness(&context, &[3, 7, 50]);
        statement.product = statement.product.add(&context.zq_element(1));
        let error = service
            .get_single_value_product_argument(&statement, &witness)
            .unwrap_err();
        assert!(matches!(error, CryptoError::PreconditionViolation(_)));
    }

    #[test]
    fn rejects_single_entry_witness() {
        let context = TestContext::new(104, 3, 5);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, &[3, 7]);
        let short = SingleValueProductWitness {
            elements: context.zq_vector(&[3]),
            randomness: witness.randomness.clone(),
        };
        assert!(service
            .get_single_value_product_argument(&statement, &short)
            .is_err());
    }

    #[test]
    fn tampered_argument_fails_verification() {
        let context = TestContext::new(105, 3, 5);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, &[3, 7, 50, 123]);
        let argument = service
            .get_single_value_product_argument(&statement, &witness)
            .unwrap();

        let mut tampered = argument.clone();
        tampered.r_tilde = tampered.r_tilde.add(&context.zq_element(1));
        let result = service
            .verify_single_value_product_argument(&statement, &tampered)
            .unwrap();
        assert!(!result.is_verified());
        assert!(result
            .error_messages()
            .unwrap()
            .iter()
            .any(|m| m.contains("single value product")));
    }

    #[test]
    fn tampered_statement_fails_verification() {
        let context = TestContext::new(106, 3, 5);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, &[3, 7, 50]);
        let argument = service
            .get_single_value_product_argument(&statement, &witness)
            .unwrap();
        let wrong = SingleValueProductStatement {
            commitment: statement.commitment.clone(),
            product: statement.product.add(&context.zq_element(1)),
        };
        assert!(!service
            .verify_single_value_product_argument(&wrong, &argument)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn hash_length_guard_rejects_wide_hashes() {
        let context = TestContext::new(107, 3, 5);
        let error = SingleValueProductArgumentService::new(
            context.key_pair.public_key().clone(),
            context.commitment_key.clone(),
            context.random.clone(),
            crate::hashing::HashService::new(),
        )
        .unwrap_err();
        assert!(matches!(error, CryptoError::PreconditionViolation(_)));
    }
}
