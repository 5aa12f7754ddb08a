use std::fmt;
use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CryptoError;
use crate::math::is_probable_prime;

use super::gq_element::GqElement;

/// Miller-Rabin certainty used when validating group parameters.
const PARAMETER_CERTAINTY: u32 = 80;

#[derive(Debug)]
pub(crate) struct GqGroupParameters {
    pub(crate) p: BigUint,
    pub(crate) q: BigUint,
    pub(crate) g: BigUint,
}

/// The multiplicative subgroup of order `q` inside `Z*_p`, `p = 2q + 1`.
///
/// Construction validates every invariant: `p` and `q` prime, `p = 2q + 1`,
/// `1 < g < p`, `g^q ≡ 1 (mod p)`. The parameters sit behind an `Arc`, so
/// elements tag their group cheaply; equality is structural.
#[derive(Clone, Debug)]
pub struct GqGroup {
    params: Arc<GqGroupParameters>,
}

impl GqGroup {
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self, CryptoError> {
        let two = BigUint::from(2u8);
        if p != &two * &q + BigUint::one() {
            return Err(CryptoError::InvalidGroupParameters(format!(
                "p must equal 2q + 1, got p = {p}, q = {q}"
            )));
        }
        let mut rng = OsRng;
        if !is_probable_prime(&p, PARAMETER_CERTAINTY, &mut rng) {
            return Err(CryptoError::InvalidGroupParameters(format!(
                "p = {p} is not prime"
            )));
        }
        if !is_probable_prime(&q, PARAMETER_CERTAINTY, &mut rng) {
            return Err(CryptoError::InvalidGroupParameters(format!(
                "q = {q} is not prime"
            )));
        }
        if g <= BigUint::one() || g >= p {
            return Err(CryptoError::InvalidGroupParameters(format!(
                "the generator must lie in (1, p), got g = {g}"
            )));
        }
        if !g.modpow(&q, &p).is_one() {
            return Err(CryptoError::InvalidGroupParameters(format!(
                "g = {g} is not a member of the group of order {q}"
            )));
        }
        Ok(GqGroup {
            params: Arc::new(GqGroupParameters { p, q, g }),
        })
    }

    pub fn p(&self) -> &BigUint {
        &self.params.p
    }

    /// The group order.
    pub fn q(&self) -> &BigUint {
        &self.params.q
    }

    pub fn generator_value(&self) -> &BigUint {
        &self.params.g
    }

    /// The generator as a group element.
    pub fn generator(&self) -> GqElement {
        GqElement::known_member(self.params.g.clone(), self.clone())
    }

    /// The multiplicative identity.
    pub fn identity(&self) -> GqElement {
        GqElement::known_member(BigUint::one(), self.clone())
    }

    /// Membership predicate: `0 < value < p` and `value^q ≡ 1 (mod p)`.
    pub fn is_group_member(&self, value: &BigUint) -> bool {
        !value.is_zero()
            && value < &self.params.p
            && value.modpow(&self.params.q, &self.params.p).is_one()
    }
}

impl PartialEq for GqGroup {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.params, &other.params)
            || (self.params.p == other.params.p
                && self.params.q == other.params.q
                && self.params.g == other.params.g)
    }
}

impl Eq for GqGroup {}

impl fmt::Display for GqGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GqGroup(p = {}, q = {}, g = {})",
            self.params.p, self.params.q, self.params.g
        )
    }
}

#[derive(Serialize, Deserialize)]
struct GqGroupEncoding {
    p: String,
    q: String,
    g: String,
}

impl Serialize for GqGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GqGroupEncoding {
            p: self.params.p.to_str_radix(16),
            q: self.params.q.to_str_radix(16),
            g: self.params.g.to_str_radix(16),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GqGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoding = GqGroupEncoding::deserialize(deserializer)?;
        let parse = |name: &str, hex: &str| {
            BigUint::parse_bytes(hex.as_bytes(), 16)
                .ok_or_else(|| D::Error::custom(format!("{name} is not a hex integer")))
        };
        let p = parse("p", &encoding.p)?;
        let q = parse("q", &encoding.q)?;
        let g = parse("g", &encoding.g)?;
        GqGroup::new(p, q, g).map_err(D::Error::custom)
    }
}
