use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::errors::CryptoError;
use crate::hashing::{Hashable, ToHashable};

use super::traits::{GroupVectorElement, HasGroup};
use super::zq_group::ZqGroup;

/// An exponent `v ∈ [0, q)` tagged with its [`ZqGroup`].
///
/// Arithmetic between elements of different groups is a programming error
/// and asserts; constructors return typed errors for out-of-range values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZqElement {
    value: BigUint,
    group: ZqGroup,
}

impl ZqElement {
    pub fn new(value: BigUint, group: ZqGroup) -> Result<Self, CryptoError> {
        if !group.contains(&value) {
            return Err(CryptoError::invariant(format!(
                "value {value} does not lie in [0, {})",
                group.q()
            )));
        }
        Ok(ZqElement { value, group })
    }

    /// Reduces an arbitrary non-negative integer into the group.
    pub fn reduce(value: &BigUint, group: ZqGroup) -> Self {
        ZqElement {
            value: value % group.q(),
            group,
        }
    }

    pub(crate) fn known_value(value: BigUint, group: ZqGroup) -> Self {
        debug_assert!(group.contains(&value));
        ZqElement { value, group }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn add(&self, other: &ZqElement) -> ZqElement {
        assert_eq!(self.group, other.group, "cannot add exponents of different groups");
        ZqElement {
            value: (&self.value + &other.value) % self.group.q(),
            group: self.group.clone(),
        }
    }

    pub fn subtract(&self, other: &ZqElement) -> ZqElement {
        assert_eq!(
            self.group, other.group,
            "cannot subtract exponents of different groups"
        );
        let q = self.group.q();
        ZqElement {
            value: ((q + &self.value) - &other.value) % q,
            group: self.group.clone(),
        }
    }

    pub fn multiply(&self, other: &ZqElement) -> ZqElement {
        assert_eq!(
            self.group, other.group,
            "cannot multiply exponents of different groups"
        );
        ZqElement {
            value: (&self.value * &other.value) % self.group.q(),
            group: self.group.clone(),
        }
    }

    pub fn negate(&self) -> ZqElement {
        let q = self.group.q();
        ZqElement {
            value: (q - &self.value) % q,
            group: self.group.clone(),
        }
    }

    /// `v^exponent mod q`; the exponent is an arbitrary non-negative integer.
    pub fn exponentiate(&self, exponent: &BigUint) -> ZqElement {
        ZqElement {
            value: self.value.modpow(exponent, self.group.q()),
            group: self.group.clone(),
        }
    }

    /// The multiplicative inverse modulo the prime `q`.
    pub fn invert(&self) -> Result<ZqElement, CryptoError> {
        if self.value.is_zero() {
            return Err(CryptoError::NotInvertible(self.value.to_string()));
        }
        let q = self.group.q();
        let exponent = q - BigUint::from(2u8);
        Ok(ZqElement {
            value: self.value.modpow(&exponent, q),
            group: self.group.clone(),
        })
    }
}

impl HasGroup for ZqElement {
    type Group = ZqGroup;

    fn group(&self) -> &ZqGroup {
        &self.group
    }
}

impl GroupVectorElement for ZqElement {
    fn element_size(&self) -> usize {
        1
    }
}

impl ToHashable for ZqElement {
    fn to_hashable(&self) -> Hashable {
        Hashable::Integer(self.value.clone())
    }
}

impl fmt::Display for ZqElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zq_11() -> ZqGroup {
        ZqGroup::new(BigUint::from(11u8)).unwrap()
    }

    fn elem(v: u8) -> ZqElement {
        ZqElement::new(BigUint::from(v), zq_11()).unwrap()
    }

    #[test]
    fn construction_enforces_range() {
        assert!(ZqElement::new(BigUint::from(10u8), zq_11()).is_ok());
        assert!(ZqElement::new(BigUint::from(11u8), zq_11()).is_err());
    }

    #[test]
    fn reduce_wraps_large_values() {
        let reduced = ZqElement::reduce(&BigUint::from(25u8), zq_11());
        assert_eq!(reduced.value(), &BigUint::from(3u8));
    }

    #[test]
    fn modular_arithmetic() {
        assert_eq!(elem(7).add(&elem(8)), elem(4));
        assert_eq!(elem(3).subtract(&elem(9)), elem(5));
        assert_eq!(elem(6).multiply(&elem(4)), elem(2));
        assert_eq!(elem(4).negate(), elem(7));
        assert_eq!(elem(0).negate(), elem(0));
        assert_eq!(elem(2).exponentiate(&BigUint::from(5u8)), elem(10));
    }

    #[test]
    fn inversion() {
        let inverse = elem(2).invert().unwrap();
        assert_eq!(elem(2).multiply(&inverse), elem(1));
        assert!(matches!(
            elem(0).invert(),
            Err(CryptoError::NotInvertible(_))
        ));
    }

    #[test]
    #[should_panic(expected = "different groups")]
    fn cross_group_arithmetic_panics() {
        let other = ZqElement::new(BigUint::from(1u8), ZqGroup::new(BigUint::from(7u8)).unwrap())
            .unwrap();
        let _ = elem(1).add(&other);
    }
}
