use std::fmt;

use num_bigint::BigUint;
use num_traits::One;

use crate::errors::CryptoError;
use crate::hashing::{Hashable, ToHashable};

use super::gq_group::GqGroup;
use super::traits::{GroupVectorElement, HasGroup};
use super::zq_element::ZqElement;

/// A member `v ∈ {1, …, p-1}` with `v^q ≡ 1 (mod p)`, tagged with its
/// [`GqGroup`].
///
/// Membership is enforced at construction; the only bypass is
/// [`GqElement::from_square_root`], which squares its input and therefore
/// always lands in the subgroup. Elements of different groups never
/// interact: mixing them in arithmetic asserts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GqElement {
    value: BigUint,
    group: GqGroup,
}

impl GqElement {
    /// Validated constructor: fails unless `value` is a group member.
    pub fn from_value(value: BigUint, group: GqGroup) -> Result<Self, CryptoError> {
        if !group.is_group_member(&value) {
            return Err(CryptoError::invariant(format!(
                "value {value} is not a member of the group of order {}",
                group.q()
            )));
        }
        Ok(GqElement { value, group })
    }

    /// Trusted factory: maps `x ∈ (0, p)` to the known square `x² mod p`.
    pub fn from_square_root(x: &BigUint, group: &GqGroup) -> Result<Self, CryptoError> {
        if x == &BigUint::from(0u8) || x >= group.p() {
            return Err(CryptoError::invalid_argument(format!(
                "the square root must lie in (0, p), got {x}"
            )));
        }
        let value = x.modpow(&BigUint::from(2u8), group.p());
        Ok(GqElement {
            value,
            group: group.clone(),
        })
    }

    /// Internal constructor for values already known to be members, e.g.
    /// the generator or results of group arithmetic.
    pub(crate) fn known_member(value: BigUint, group: GqGroup) -> Self {
        debug_assert!(group.is_group_member(&value));
        GqElement { value, group }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn multiply(&self, other: &GqElement) -> GqElement {
        assert_eq!(
            self.group, other.group,
            "cannot multiply elements of different groups"
        );
        GqElement {
            value: (&self.value * &other.value) % self.group.p(),
            group: self.group.clone(),
        }
    }

    /// `v^e mod p` for an exponent of the matching order-`q` group.
    pub fn exponentiate(&self, exponent: &ZqElement) -> GqElement {
        assert_eq!(
            exponent.group().q(),
            self.group.q(),
            "exponent group order must match the group order"
        );
        GqElement {
            value: self.value.modpow(exponent.value(), self.group.p()),
            group: self.group.clone(),
        }
    }

    /// The multiplicative inverse `v^{q-1}`, using `v^q ≡ 1`.
    pub fn invert(&self) -> GqElement {
        let exponent = self.group.q() - BigUint::one();
        GqElement {
            value: self.value.modpow(&exponent, self.group.p()),
            group: self.group.clone(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.value.is_one()
    }
}

impl HasGroup for GqElement {
    type Group = GqGroup;

    fn group(&self) -> &GqGroup {
        &self.group
    }
}

impl GroupVectorElement for GqElement {
    fn element_size(&self) -> usize {
        1
    }
}

impl ToHashable for GqElement {
    fn to_hashable(&self) -> Hashable {
        Hashable::Integer(self.value.clone())
    }
}

impl fmt::Display for GqElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::ZqGroup;

    fn group_23() -> GqGroup {
        GqGroup::new(
            BigUint::from(23u8),
            BigUint::from(11u8),
            BigUint::from(2u8),
        )
        .unwrap()
    }

    fn elem(v: u8) -> GqElement {
        GqElement::from_value(BigUint::from(v), group_23()).unwrap()
    }

    fn exponent(v: u8) -> ZqElement {
        ZqElement::new(BigUint::from(v), ZqGroup::same_order_as(&group_23())).unwrap()
    }

    #[test]
    fn from_value_enforces_membership() {
        assert!(GqElement::from_value(BigUint::from(4u8), group_23()).is_ok());
        // 5 is not a quadratic residue mod 23.
        assert!(GqElement::from_value(BigUint::from(5u8), group_23()).is_err());
        assert!(GqElement::from_value(BigUint::from(0u8), group_23()).is_err());
        assert!(GqElement::from_value(BigUint::from(23u8), group_23()).is_err());
    }

    #[test]
    fn from_square_root_always_lands_in_the_group() {
        let group = group_23();
        for x in 1u8..23 {
            let element = GqElement::from_square_root(&BigUint::from(x), &group).unwrap();
            assert!(group.is_group_member(element.value()));
        }
        assert!(GqElement::from_square_root(&BigUint::from(0u8), &group).is_err());
        assert!(GqElement::from_square_root(&BigUint::from(23u8), &group).is_err());
    }

    #[test]
    fn multiplication_and_inverse() {
        let a = elem(4);
        let b = elem(6);
        assert_eq!(a.multiply(&b), elem(1));
        assert_eq!(a.multiply(&a.invert()), group_23().identity());
        assert_eq!(b.multiply(&b.invert()), group_23().identity());
    }

    #[test]
    fn exponentiation() {
        // 2^5 = 32 ≡ 9 (mod 23)
        assert_eq!(group_23().generator().exponentiate(&exponent(5)), elem(9));
        // Any member to the power q is the identity.
        let q = BigUint::from(11u8);
        let to_q = ZqElement::reduce(&q, ZqGroup::same_order_as(&group_23()));
        assert_eq!(elem(13).exponentiate(&to_q), elem(13).exponentiate(&exponent(0)));
    }

    #[test]
    fn generator_powers_stay_in_the_group() {
        let group = group_23();
        for r in 0u8..11 {
            let power = group.generator().exponentiate(&exponent(r));
            assert!(group.is_group_member(power.value()));
        }
    }

    #[test]
    #[should_panic(expected = "different groups")]
    fn cross_group_multiplication_panics() {
        let other_group = GqGroup::new(
            BigUint::from(47u8),
            BigUint::from(23u8),
            BigUint::from(2u8),
        )
        .unwrap();
        let foreign = GqElement::from_value(BigUint::from(4u8), other_group).unwrap();
        let _ = elem(4).multiply(&foreign);
    }
}
