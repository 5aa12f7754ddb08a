//! Hadamard argument: proves that a committed vector is the entrywise
//! product of the columns of a committed matrix, by reduction to a zero
//! argument on challenge-weighted columns.

use crate::elgamal::ElGamalMultiRecipientPublicKey;
use crate::errors::CryptoError;
use crate::group::{
    GqElement, GqGroup, GroupMatrix, GroupVector, HasGroup, ZqElement, ZqGroup,
};
use crate::hashing::{Hashable, HashService, ToHashable};
use crate::pedersen::{get_commitment, get_commitment_matrix, CommitmentKey};
use crate::random::RandomService;
use crate::verification::{verify_that, VerificationResult};

use super::zero::{ZeroArgument, ZeroArgumentService, ZeroStatement, ZeroWitness};
use super::{check_hash_length, powers, vector_scale};

const LOG_TARGET: &str = "mixnet_primitives::arguments::hadamard";

/// Statement `(c_A, c_b)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HadamardStatement {
    pub c_a: GroupVector<GqElement>,
    pub c_b: GqElement,
}

/// Witness `(A, b, r, s)` with `c_A = com(A, r)`, `c_b = com(b, s)` and
/// `b = A.col(0) ∘ … ∘ A.col(m-1)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HadamardWitness {
    pub a: GroupMatrix<ZqElement>,
    pub b: GroupVector<ZqElement>,
    pub r: GroupVector<ZqElement>,
    pub s: ZqElement,
}

/// The argument: the intermediate prefix-product commitments and the zero
/// argument tying them together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HadamardArgument {
    pub c_b_vector: GroupVector<GqElement>,
    pub zero_argument: ZeroArgument,
}

impl HasGroup for HadamardArgument {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.zero_argument.group()
    }
}

pub struct HadamardArgumentService {
    public_key: ElGamalMultiRecipientPublicKey,
    commitment_key: CommitmentKey,
    random: RandomService,
    hash: HashService,
    zero_argument_service: ZeroArgumentService,
}

impl HadamardArgumentService {
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
        let zero_argument_service = ZeroArgumentService::new(
            public_key.clone(),
            commitment_key.clone(),
            random.clone(),
            hash.clone(),
        )?;
        Ok(HadamardArgumentService {
            public_key,
            commitment_key,
            random,
            hash,
            zero_argument_service,
        })
    }

    pub fn get_hadamard_argument(
        &self,
        statement: &HadamardStatement,
        witness: &HadamardWitness,
    ) -> Result<HadamardArgument, CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        let m = statement.c_a.len();
        if m < 2 {
            return Err(CryptoError::invalid_argument(
                "the Hadamard argument needs at least two matrix columns",
            ));
        }
        if statement.c_a.group() != Some(group) || statement.c_b.group() != group {
            return Err(CryptoError::invariant(
                "the statement must belong to the commitment key group",
            ));
        }
        let a = &witness.a;
        let n = a.n_rows();
        if a.n_columns() != m || witness.b.len() != n || witness.r.len() != m {
            return Err(CryptoError::invalid_argument(
                "the witness dimensions do not match the statement",
            ));
        }
        if n == 0 || n > self.commitment_key.size() {
            return Err(CryptoError::DimensionMismatch {
                expected: self.commitment_key.size(),
                actual: n,
            });
        }

        // Statement-witness consistency.
        if statement.c_a != get_commitment_matrix(a, &witness.r, &self.commitment_key)? {
            return Err(CryptoError::precondition(
                "the commitments c_A do not open to the witness",
            ));
        }
        if statement.c_b != get_commitment(&witness.b, &witness.s, &self.commitment_key)? {
            return Err(CryptoError::precondition(
                "the commitment c_b does not open to the witness",
            ));
        }
        let hadamard_product = Self::column_products(a);
        if witness.b != *hadamard_product.last().expect("m >= 2") {
            return Err(CryptoError::precondition(
                "b is not the Hadamard product of the matrix columns",
            ));
        }

        // Prefix-product commitments; the endpoints reuse the statement's.
        let b_columns = hadamard_product;
        let mut s_vector = Vec::with_capacity(m);
        s_vector.push(witness.r[0].clone());
        for _ in 1..m - 1 {
            s_vector.push(self.random.random_exponent(&zq)?);
        }
        s_vector.push(witness.s.clone());

        let mut c_b_vector = Vec::with_capacity(m);
        c_b_vector.push(statement.c_a[0].clone());
        for i in 1..m - 1 {
            c_b_vector.push(get_commitment(
                &b_columns[i],
                &s_vector[i],
                &self.commitment_key,
            )?);
        }
        c_b_vector.push(statement.c_b.clone());
        let c_b_vector = GroupVector::try_from_elements(c_b_vector)?;

        let (x, y) = self.compute_challenges(statement, &c_b_vector)?;
        tracing::debug!(target: LOG_TARGET, x = %x, y = %y, m, n, "derived challenges");

        // Zero-argument input: challenge-weighted prefix columns against the
        // shifted matrix columns, closed by a -1 column.
        let x_powers = powers(&x, m);
        let zero_statement_witness = self.build_zero_input(
            statement,
            witness,
            &b_columns,
            &s_vector,
            &c_b_vector,
            &x_powers,
            &y,
        )?;
        let (zero_statement, zero_witness) = zero_statement_witness;
        let zero_argument = self
            .zero_argument_service
            .get_zero_argument(&zero_statement, &zero_witness)?;

        Ok(HadamardArgument {
            c_b_vector,
            zero_argument,
        })
    }

    pub fn verify_hadamard_argument(
        &self,
        statement: &HadamardStatement,
        argument: &HadamardArgument,
    ) -> Result<VerificationResult, CryptoError> {
        let group = self.commitment_key.group();
        let m = statement.c_a.len();
        if m < 2 {
            return Err(CryptoError::invalid_argument(
                "the Hadamard argument needs at least two matrix columns",
            ));
        }
        if statement.c_a.group() != Some(group)
            || statement.c_b.group() != group
            || argument.group() != group
        {
            return Err(CryptoError::invariant(
                "the statement and argument must belong to the commitment key group",
            ));
        }
        if argument.c_b_vector.len() != m {
            return Err(CryptoError::DimensionMismatch {
                expected: m,
                actual: argument.c_b_vector.len(),
            });
        }

        let (x, y) = self.compute_challenges(statement, &argument.c_b_vector)?;
        let x_powers = powers(&x, m);
        let n = argument.zero_argument.a_prime.len();

        let endpoint_checks = verify_that(
            argument.c_b_vector[0] == statement.c_a[0],
            "the first prefix commitment must equal the first column commitment",
        )
        .and(|| {
            verify_that(
                argument.c_b_vector[m - 1] == statement.c_b,
                "the last prefix commitment must equal the product commitment",
            )
        });

        let zero_statement =
            self.derive_zero_statement(statement, &argument.c_b_vector, &x_powers, &y, n)?;
        let zero_check = self
            .zero_argument_service
            .verify_zero_argument(&zero_statement, &argument.zero_argument)?;

        Ok(endpoint_checks
            .and(|| zero_check)
            .add_error_message("Failed to verify the Hadamard argument"))
    }

    /// Prefix Hadamard products `B_0 = A.col(0)`, `B_i = B_{i-1} ∘ A.col(i)`.
    fn column_products(a: &GroupMatrix<ZqElement>) -> Vec<GroupVector<ZqElement>> {
        let mut products = Vec::with_capacity(a.n_columns());
        products.push(a.column(0));
        for i in 1..a.n_columns() {
            let previous = &products[i - 1];
            let column = a.column(i);
            let next = GroupVector::try_from_elements(
                previous
                    .iter()
                    .zip(column.iter())
                    .map(|(p, c)| p.multiply(c))
                    .collect(),
            )
            .expect("entrywise products of homogeneous vectors stay homogeneous");
            products.push(next);
        }
        products
    }

    #[allow(clippy::too_many_arguments)]
    fn build_zero_input(
        &self,
        statement: &HadamardStatement,
        witness: &HadamardWitness,
        b_columns: &[GroupVector<ZqElement>],
        s_vector: &[ZqElement],
        c_b_vector: &GroupVector<GqElement>,
        x_powers: &[ZqElement],
        y: &ZqElement,
    ) -> Result<(ZeroStatement, ZeroWitness), CryptoError> {
        let zq = ZqGroup::same_order_as(self.commitment_key.group());
        let m = statement.c_a.len();
        let n = witness.a.n_rows();

        // a-side: shifted matrix columns plus the -1 column.
        let minus_one = GroupVector::try_from_elements(vec![zq.one().negate(); n])?;
        let mut a_z_columns: Vec<Vec<ZqElement>> = (1..m)
            .map(|i| witness.a.column(i).as_slice().to_vec())
            .collect();
        a_z_columns.push(minus_one.as_slice().to_vec());
        let a_z = GroupMatrix::from_columns(a_z_columns)?;
        let mut r_z = witness.r.as_slice()[1..].to_vec();
        r_z.push(zq.identity());
        let r_z = GroupVector::try_from_elements(r_z)?;

        // b-side: challenge-weighted prefix columns plus their running sum.
        let mut b_z_columns: Vec<Vec<ZqElement>> = Vec::with_capacity(m);
        let mut t_z = Vec::with_capacity(m);
        let mut d_sum = vec![zq.identity(); n];
        let mut t_sum = zq.identity();
        for i in 0..m - 1 {
            let weighted = vector_scale(&x_powers[i + 1], &b_columns[i]);
            b_z_columns.push(weighted.as_slice().to_vec());
            t_z.push(x_powers[i + 1].multiply(&s_vector[i]));
            let next = vector_scale(&x_powers[i + 1], &b_columns[i + 1]);
            for (acc, term) in d_sum.iter_mut().zip(next.iter()) {
                *acc = acc.add(term);
            }
            t_sum = t_sum.add(&x_powers[i + 1].multiply(&s_vector[i + 1]));
        }
        b_z_columns.push(d_sum);
        t_z.push(t_sum);
        let b_z = GroupMatrix::from_columns(b_z_columns)?;
        let t_z = GroupVector::try_from_elements(t_z)?;

        let zero_statement =
            self.derive_zero_statement(statement, c_b_vector, x_powers, y, n)?;
        let zero_witness = ZeroWitness {
            a: a_z,
            b: b_z,
            r: r_z,
            s: t_z,
        };
        Ok((zero_statement, zero_witness))
    }

    /// The zero statement both sides derive: commitments to the shifted
    /// columns close with `com(-1, 0)`, the weighted prefix commitments
    /// close with their running product.
    fn derive_zero_statement(
        &self,
        statement: &HadamardStatement,
        c_b_vector: &GroupVector<GqElement>,
        x_powers: &[ZqElement],
        y: &ZqElement,
        n: usize,
    ) -> Result<ZeroStatement, CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        let m = statement.c_a.len();

        let minus_one = GroupVector::try_from_elements(vec![zq.one().negate(); n])?;
        let c_minus_one = get_commitment(&minus_one, &zq.identity(), &self.commitment_key)?;
        let mut c_a_z = statement.c_a.as_slice()[1..].to_vec();
        c_a_z.push(c_minus_one);

        let mut c_b_z = Vec::with_capacity(m);
        let mut running = group.identity();
        for i in 0..m - 1 {
            c_b_z.push(c_b_vector[i].exponentiate(&x_powers[i + 1]));
            running = running.multiply(&c_b_vector[i + 1].exponentiate(&x_powers[i + 1]));
        }
        c_b_z.push(running);

        Ok(ZeroStatement {
            c_a: GroupVector::try_from_elements(c_a_z)?,
            c_b: GroupVector::try_from_elements(c_b_z)?,
            y: y.clone(),
        })
    }

    /// Fixed transcript order: `x = H_q(p, q, pk, ck, c_A, c_b, c_B)` and
    /// `y = H_q("1", p, q, pk, ck, c_A, c_b, c_B)`.
    fn compute_challenges(
        &self,
        statement: &HadamardStatement,
        c_b_vector: &GroupVector<GqElement>,
    ) -> Result<(ZqElement, ZqElement), CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        let common = [
            Hashable::Integer(group.p().clone()),
            Hashable::Integer(group.q().clone()),
            self.public_key.to_hashable(),
            self.commitment_key.to_hashable(),
            statement.c_a.to_hashable(),
            statement.c_b.to_hashable(),
            c_b_vector.to_hashable(),
        ];
        let x = self.hash.recursive_hash_to_zq(&zq, &common)?;
        let mut prefixed: Vec<Hashable> = vec![Hashable::from_text("1")];
        prefixed.extend_from_slice(&common);
        let y = self.hash.recursive_hash_to_zq(&zq, &prefixed)?;
        Ok((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;

    fn service(context: &TestContext) -> HadamardArgumentService {
        HadamardArgumentService::new(
            context.key_pair.public_key().clone(),
            context.commitment_key.clone(),
            context.random.clone(),
            context.hash.clone(),
        )
        .unwrap()
    }

    fn statement_and_witness(
        context: &TestContext,
        n: usize,
        m: usize,
    ) -> (HadamardStatement, HadamardWitness) {
        let a = GroupMatrix::from_columns(
            (0..m)
                .map(|i| {
                    (0..n)
                        .map(|row| context.zq_element((2 + 5 * i + 11 * row) as u32))
                        .collect::<Vec<_>>()
                })
                .collect(),
        )
        .unwrap();
        let b = (1..m).fold(a.column(0), |acc, i| {
            GroupVector::try_from_elements(
                acc.iter()
                    .zip(a.column(i).iter())
                    .map(|(x, y)| x.multiply(y))
                    .collect(),
            )
            .unwrap()
        });
        let r = context.random.random_exponents(&context.zq, m).unwrap();
        let s = context.random.random_exponent(&context.zq).unwrap();
        let c_a = get_commitment_matrix(&a, &r, &context.commitment_key).unwrap();
        let c_b = get_commitment(&b, &s, &context.commitment_key).unwrap();
        (
            HadamardStatement { c_a, c_b },
            HadamardWitness { a, b, r, s },
        )
    }

    #[test]
    fn proves_and_verifies() {
        let context = TestContext::new(301, 3, 5);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, 3, 2);
        let argument = service.get_hadamard_argument(&statement, &witness).unwrap();
        assert!(service
            .verify_hadamard_argument(&statement, &argument)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn three_columns_round_trip() {
        let context = TestContext::new(302, 3, 6);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, 4, 3);
        let argument = service.get_hadamard_argument(&statement, &witness).unwrap();
        assert!(service
            .verify_hadamard_argument(&statement, &argument)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn rejects_wrong_product_witness() {
        let context = TestContext::new(303, 3, 5);
        let service = service(&context);
        let (statement, mut witness) = statement_and_witness(&context, 3, 2);
        witness.b = GroupVector::try_from_elements(
            witness
                .b
                .iter()
                .map(|v| v.add(&context.zq_element(1)))
                .collect(),
        )
        .unwrap();
        assert!(matches!(
            service.get_hadamard_argument(&statement, &witness),
            Err(CryptoError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn single_column_is_rejected() {
        let context = TestContext::new(304, 3, 5);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, 3, 2);
        let truncated = HadamardStatement {
            c_a: GroupVector::try_from_elements(vec![statement.c_a[0].clone()]).unwrap(),
            c_b: statement.c_b.clone(),
        };
        assert!(service.get_hadamard_argument(&truncated, &witness).is_err());
    }

    #[test]
    fn tampered_argument_fails_verification() {
        let context = TestContext::new(305, 3, 6);
        let service = service(&context);
        let (statement, witness) = statement_and_witness(&context, 3, 3);
        let argument = service.get_hadamard_argument(&statement, &witness).unwrap();

        let mut tampered = argument.clone();
        let mut commitments = tampered.c_b_vector.as_slice().to_vec();
        commitments[1] = commitments[1].multiply(&commitments[0]);
        tampered.c_b_vector = GroupVector::try_from_elements(commitments).unwrap();
        assert!(!service
            .verify_hadamard_argument(&statement, &tampered)
            .unwrap()
            .is_verified());

        let mut tampered_zero = argument.clone();
        tampered_zero.zero_argument.r_prime = tampered_zero
            .zero_argument
            .r_prime
            .add(&context.zq_element(1));
        assert!(!service
            .verify_hadamard_argument(&statement, &tampered_zero)
            .unwrap()
            .is_verified());
    }
}
