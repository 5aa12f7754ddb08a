//! Shuffle argument: proves that one ciphertext vector is a re-encrypting
//! shuffle of another, by composing a product argument over the committed
//! permutation with a multi-exponentiation argument over the shuffled
//! ciphertexts.

use num_bigint::BigUint;

use crate::elgamal::{
    get_ciphertext_vector_exponentiation, ElGamalMultiRecipientCiphertext,
    ElGamalMultiRecipientMessage, ElGamalMultiRecipientPublicKey,
};
use crate::errors::CryptoError;
use crate::group::{
    GqElement, GqGroup, GroupMatrix, GroupVector, HasGroup, ZqElement, ZqGroup,
};
use crate::hashing::{Hashable, HashService, ToHashable};
use crate::mixnet::Permutation;
use crate::pedersen::{get_commitment_matrix, CommitmentKey};
use crate::random::RandomService;
use crate::verification::VerificationResult;

use super::multi_exponentiation::{
    MultiExponentiationArgument, MultiExponentiationArgumentService,
    MultiExponentiationStatement, MultiExponentiationWitness,
};
use super::product::{
    ProductArgument, ProductArgumentService, ProductStatement, ProductWitness,
};
use super::{check_hash_length, powers, vector_add, vector_scale};

const LOG_TARGET: &str = "mixnet_primitives::arguments::shuffle";

/// Statement `(C, C')`: the input and the claimed shuffled-and-re-encrypted
/// ciphertext vectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffleStatement {
    pub ciphertexts: GroupVector<ElGamalMultiRecipientCiphertext>,
    pub shuffled_ciphertexts: GroupVector<ElGamalMultiRecipientCiphertext>,
}

/// Witness `(π, ρ)` with `C'_i = Enc(1, ρ_i) · C_{π(i)}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffleWitness {
    pub permutation: Permutation,
    pub re_encryption_exponents: GroupVector<ZqElement>,
}

/// The argument `(c_A, c_B, product argument, multi-exponentiation
/// argument)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffleArgument {
    pub c_a: GroupVector<GqElement>,
    pub c_b: GroupVector<GqElement>,
    pub product_argument: ProductArgument,
    pub multi_exponentiation_argument: MultiExponentiationArgument,
}

impl ShuffleArgument {
    /// The row count of the `N = m · n` decomposition.
    pub fn m(&self) -> usize {
        self.c_a.len()
    }
}

impl HasGroup for ShuffleArgument {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        self.product_argument.group()
    }
}

pub struct ShuffleArgumentService {
    public_key: ElGamalMultiRecipientPublicKey,
    commitment_key: CommitmentKey,
    random: RandomService,
    hash: HashService,
    product_argument_service: ProductArgumentService,
    multi_exponentiation_argument_service: MultiExponentiationArgumentService,
}

impl ShuffleArgumentService {
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
        let product_argument_service = ProductArgumentService::new(
            public_key.clone(),
            commitment_key.clone(),
            random.clone(),
            hash.clone(),
        )?;
        let multi_exponentiation_argument_service = MultiExponentiationArgumentService::new(
            public_key.clone(),
            commitment_key.clone(),
            random.clone(),
            hash.clone(),
        )?;
        Ok(ShuffleArgumentService {
            public_key,
            commitment_key,
            random,
            hash,
            product_argument_service,
            multi_exponentiation_argument_service,
        })
    }

    /// Proves the shuffle for the decomposition `N = m · n`.
    pub fn get_shuffle_argument(
        &self,
        statement: &ShuffleStatement,
        witness: &ShuffleWitness,
        m: usize,
        n: usize,
    ) -> Result<ShuffleArgument, CryptoError> {
        let group = self.commitment_key.group();
        let zq = ZqGroup::same_order_as(group);
        let big_n = self.check_statement(statement, m, n)?;

        if witness.permutation.size() != big_n
            || witness.re_encryption_exponents.len() != big_n
        {
            return Err(CryptoError::invalid_argument(
                "the witness dimensions do not match the statement",
            ));
        }
        if witness.re_encryption_exponents.group() != Some(&zq) {
            return Err(CryptoError::invariant(
                "the re-encryption exponents must match the group order",
            ));
        }

        // Statement-witness consistency: C'_i = Enc(1, ρ_i) · C_{π(i)}.
        let size = statement.ciphertexts.element_size().expect("non-empty");
        let ones = ElGamalMultiRecipientMessage::ones(group, size)?;
        for i in 0..big_n {
            let re_encrypted = ElGamalMultiRecipientCiphertext::get_ciphertext(
                &ones,
                &witness.re_encryption_exponents[i],
                &self.public_key,
            )?
            .multiply(&statement.ciphertexts[witness.permutation.get(i)]);
            if statement.shuffled_ciphertexts[i] != re_encrypted {
                return Err(CryptoError::precondition(
                    "the shuffled ciphertexts are not a re-encrypting shuffle of the inputs",
                ));
            }
        }

        // Commit to the permutation, column by column.
        let r = self.random.random_exponents(&zq, m)?;
        let permutation_elements = GroupVector::try_from_elements(
            witness
                .permutation
                .images()
                .iter()
                .map(|&image| ZqElement::reduce(&BigUint::from(image), zq.clone()))
                .collect::<Vec<_>>(),
        )?;
        let a_matrix = permutation_elements.to_matrix(m, n)?.transpose();
        let c_a = get_commitment_matrix(&a_matrix, &r, &self.commitment_key)?;

        let x = self.compute_challenge_x(statement, &c_a)?;
        let x_powers = powers(&x, big_n);

        // Commit to the challenge powers in permuted order.
        let s = self.random.random_exponents(&zq, m)?;
        let b_elements = GroupVector::try_from_elements(
            (0..big_n)
                .map(|i| x_powers[witness.permutation.get(i)].clone())
                .collect::<Vec<_>>(),
        )?;
        let b_matrix = b_elements.to_matrix(m, n)?.transpose();
        let c_b = get_commitment_matrix(&b_matrix, &s, &self.commitment_key)?;

        let (y, z) = self.compute_challenges_y_z(statement, &c_a, &c_b)?;
        tracing::debug!(target: LOG_TARGET, x = %x, y = %y, z = %z, m, n, "derived challenges");

        // Product argument over D - z with D = y·A + B.
        let product_statement =
            self.derive_product_statement(statement, &c_a, &c_b, &x, &y, &z, m, n)?;
        let minus_z = z.negate();
        let d_minus_z_columns: Vec<Vec<ZqElement>> = (0..m)
            .map(|j| {
                vector_add(
                    &vector_scale(&y, &a_matrix.column(j)),
                    &b_matrix.column(j),
                )
                .iter()
                .map(|entry| entry.add(&minus_z))
                .collect()
            })
            .collect();
        let product_witness = ProductWitness {
            a: GroupMatrix::from_columns(d_minus_z_columns)?,
            r: vector_add(&vector_scale(&y, &r), &s),
        };
        let product_argument = self
            .product_argument_service
            .get_product_argument(&product_statement, &product_witness)?;

        // Multi-exponentiation argument over the shuffled matrix.
        let rho = witness
            .re_encryption_exponents
            .iter()
            .zip(b_elements.iter())
            .fold(zq.identity(), |acc, (rho_i, b_i)| {
                acc.add(&rho_i.multiply(b_i))
            })
            .negate();
        let multi_exponentiation_statement =
            self.derive_multi_exponentiation_statement(statement, &c_b, &x_powers, m, n)?;
        let multi_exponentiation_witness = MultiExponentiationWitness {
            a: b_matrix,
            r: s,
            rho,
        };
        let multi_exponentiation_argument = self
            .multi_exponentiation_argument_service
            .get_multi_exponentiation_argument(
                &multi_exponentiation_statement,
                &multi_exponentiation_witness,
            )?;

        Ok(ShuffleArgument {
            c_a,
            c_b,
            product_argument,
            multi_exponentiation_argument,
        })
    }

    /// Verifies the argument; sub-verifier failures are aggregated with
    /// context.
    pub fn verify_shuffle_argument(
        &self,
        statement: &ShuffleStatement,
        argument: &ShuffleArgument,
    ) -> Result<VerificationResult, CryptoError> {
        let group = self.commitment_key.group();
        let m = argument.c_a.len();
        if m == 0 || argument.c_b.len() != m {
            return Err(CryptoError::invalid_argument(
                "the argument commitment vectors must be non-empty and of equal size",
            ));
        }
        let big_n = statement.ciphertexts.len();
        if big_n % m != 0 {
            return Err(CryptoError::invalid_argument(format!(
                "the ciphertext count {big_n} is not divisible into {m} rows"
            )));
        }
        let n = big_n / m;
        self.check_statement(statement, m, n)?;
        if argument.group() != group
            || argument.c_a.group() != Some(group)
            || argument.c_b.group() != Some(group)
        {
            return Err(CryptoError::invariant(
                "the argument must belong to the commitment key group",
            ));
        }

        let x = self.compute_challenge_x(statement, &argument.c_a)?;
        let (y, z) = self.compute_challenges_y_z(statement, &argument.c_a, &argument.c_b)?;
        let x_powers = powers(&x, big_n);

        let product_statement = self.derive_product_statement(
            statement,
            &argument.c_a,
            &argument.c_b,
            &x,
            &y,
            &z,
            m,
            n,
        )?;
        let product_check = self
            .product_argument_service
            .verify_product_argument(&product_statement, &argument.product_argument)?
            .add_error_message("Failed to verify the product argument of the shuffle");

        let multi_exponentiation_statement =
            self.derive_multi_exponentiation_statement(statement, &argument.c_b, &x_powers, m, n)?;
        let multi_exponentiation_check = self
            .multi_exponentiation_argument_service
            .verify_multi_exponentiation_argument(
                &multi_exponentiation_statement,
                &argument.multi_exponentiation_argument,
            )?
            .add_error_message("Failed to verify the multi-exponentiation argument of the shuffle");

        Ok(product_check
            .and(|| multi_exponentiation_check)
            .add_error_message("Failed to verify the shuffle argument"))
    }

    fn check_statement(
        &self,
        statement: &ShuffleStatement,
        m: usize,
        n: usize,
    ) -> Result<usize, CryptoError> {
        let group = self.commitment_key.group();
        let big_n = statement.ciphertexts.len();
        if big_n == 0 {
            return Err(CryptoError::invalid_argument(
                "cannot argue about an empty shuffle",
            ));
        }
        if statement.shuffled_ciphertexts.len() != big_n {
            return Err(CryptoError::DimensionMismatch {
                expected: big_n,
                actual: statement.shuffled_ciphertexts.len(),
            });
        }
        if m == 0 || n < 2 || m * n != big_n {
            return Err(CryptoError::invalid_argument(format!(
                "invalid decomposition {big_n} = {m} x {n}; m >= 1 and n >= 2 required"
            )));
        }
        if n > self.commitment_key.size() {
            return Err(CryptoError::DimensionMismatch {
                expected: self.commitment_key.size(),
                actual: n,
            });
        }
        let size = statement.ciphertexts.element_size().expect("non-empty");
        if size == 0 || size > self.public_key.size() {
            return Err(CryptoError::invalid_argument(format!(
                "the ciphertext size must lie in [1, {}], got {size}",
                self.public_key.size()
            )));
        }
        if statement.ciphertexts.group() != Some(group)
            || statement.shuffled_ciphertexts.group() != Some(group)
            || statement.shuffled_ciphertexts.element_size() != Some(size)
        {
            return Err(CryptoError::invariant(
                "both ciphertext vectors must share the commitment key group and one size",
            ));
        }
        Ok(big_n)
    }

    /// Statement of the embedded product argument:
    /// `(c_D · c_{-z}, ∏_i (y·i + x^i - z))`.
    #[allow(clippy::too_many_arguments)]
    fn derive_product_statement(
        &self,
        statement: &ShuffleStatement,
        c_a: &GroupVector<GqElement>,
        c_b: &GroupVector<GqElement>,
        x: &ZqElement,
        y: &ZqElement,
        z: &ZqElement,
        m: usize,
        n: usize,
    ) -> Result<ProductStatement, CryptoError> {
        let zq = ZqGroup::same_order_as(self.commitment_key.group());
        let big_n = statement.ciphertexts.len();

        let minus_z_matrix = GroupMatrix::from_rows(vec![vec![z.negate(); m]; n])?;
        let zero_randomness = GroupVector::try_from_elements(vec![zq.identity(); m])?;
        let c_minus_z =
            get_commitment_matrix(&minus_z_matrix, &zero_randomness, &self.commitment_key)?;

        let c_d = GroupVector::try_from_elements(
            c_a.iter()
                .zip(c_b.iter())
                .map(|(c_a_j, c_b_j)| c_a_j.exponentiate(y).multiply(c_b_j))
                .collect::<Vec<_>>(),
        )?;
        let combined = GroupVector::try_from_elements(
            c_d.iter()
                .zip(c_minus_z.iter())
                .map(|(d, mz)| d.multiply(mz))
                .collect::<Vec<_>>(),
        )?;

        let x_powers = powers(x, big_n);
        let product = (0..big_n).fold(zq.one(), |acc, i| {
            let term = y
                .multiply(&ZqElement::reduce(&BigUint::from(i), zq.clone()))
                .add(&x_powers[i])
                .subtract(z);
            acc.multiply(&term)
        });

        Ok(ProductStatement {
            c_a: combined,
            b: product,
        })
    }

    /// Statement of the embedded multi-exponentiation argument:
    /// `(C'.toMatrix(m, n), ∏_i C_i^{x^i}, c_B)`.
    fn derive_multi_exponentiation_statement(
        &self,
        statement: &ShuffleStatement,
        c_b: &GroupVector<GqElement>,
        x_powers: &[ZqElement],
        m: usize,
        n: usize,
    ) -> Result<MultiExponentiationStatement, CryptoError> {
        let shuffled_matrix = statement.shuffled_ciphertexts.to_matrix(m, n)?;
        let x_power_vector = GroupVector::try_from_elements(x_powers.to_vec())?;
        let combined =
            get_ciphertext_vector_exponentiation(&statement.ciphertexts, &x_power_vector)?;
        Ok(MultiExponentiationStatement {
            ciphertext_matrix: shuffled_matrix,
            ciphertext: combined,
            c_a: c_b.clone(),
        })
    }

    /// `x = H_q(p, q, pk, ck, C, C', c_A)`.
    fn compute_challenge_x(
        &self,
        statement: &ShuffleStatement,
        c_a: &GroupVector<GqElement>,
    ) -> Result<ZqElement, CryptoError> {
        let zq = ZqGroup::same_order_as(self.commitment_key.group());
        self.hash
            .recursive_hash_to_zq(&zq, &self.base_transcript(statement, c_a))
    }

    /// `y = H_q(c_B, …base…)` and `z = H_q("1", c_B, …base…)` over the same
    /// base transcript as `x`.
    fn compute_challenges_y_z(
        &self,
        statement: &ShuffleStatement,
        c_a: &GroupVector<GqElement>,
        c_b: &GroupVector<GqElement>,
    ) -> Result<(ZqElement, ZqElement), CryptoError> {
        let zq = ZqGroup::same_order_as(self.commitment_key.group());
        let base = self.base_transcript(statement, c_a);

        let mut y_values: Vec<Hashable> = vec![c_b.to_hashable()];
        y_values.extend_from_slice(&base);
        let y = self.hash.recursive_hash_to_zq(&zq, &y_values)?;

        let mut z_values: Vec<Hashable> = vec![Hashable::from_text("1"), c_b.to_hashable()];
        z_values.extend_from_slice(&base);
        let z = self.hash.recursive_hash_to_zq(&zq, &z_values)?;
        Ok((y, z))
    }

    fn base_transcript(
        &self,
        statement: &ShuffleStatement,
        c_a: &GroupVector<GqElement>,
    ) -> [Hashable; 7] {
        let group = self.commitment_key.group();
        [
            Hashable::Integer(group.p().clone()),
            Hashable::Integer(group.q().clone()),
            self.public_key.to_hashable(),
            self.commitment_key.to_hashable(),
            statement.ciphertexts.to_hashable(),
            statement.shuffled_ciphertexts.to_hashable(),
            c_a.to_hashable(),
        ]
    }
}
