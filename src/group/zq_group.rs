use std::fmt;
use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::errors::CryptoError;

use super::gq_group::GqGroup;
use super::zq_element::ZqElement;

/// The additive group of integers modulo `q`, the exponent ring of a
/// [`GqGroup`] of the same order.
#[derive(Clone, Debug)]
pub struct ZqGroup {
    q: Arc<BigUint>,
}

impl ZqGroup {
    pub fn new(q: BigUint) -> Result<Self, CryptoError> {
        if q <= BigUint::one() {
            return Err(CryptoError::InvalidGroupParameters(format!(
                "the order of a ZqGroup must be greater than 1, got {q}"
            )));
        }
        Ok(ZqGroup { q: Arc::new(q) })
    }

    /// The exponent group matching the order of `group`, so exponents and
    /// group elements always agree.
    pub fn same_order_as(group: &GqGroup) -> Self {
        ZqGroup {
            q: Arc::new(group.q().clone()),
        }
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// The additive identity.
    pub fn identity(&self) -> ZqElement {
        ZqElement::known_value(BigUint::zero(), self.clone())
    }

    /// The multiplicative unit; well-defined since `q > 1`.
    pub fn one(&self) -> ZqElement {
        ZqElement::known_value(BigUint::one(), self.clone())
    }

    pub fn contains(&self, value: &BigUint) -> bool {
        value < &self.q
    }
}

impl PartialEq for ZqGroup {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.q, &other.q) || self.q == other.q
    }
}

impl Eq for ZqGroup {}

impl fmt::Display for ZqGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZqGroup(q = {})", self.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_trivial_orders() {
        assert!(ZqGroup::new(BigUint::zero()).is_err());
        assert!(ZqGroup::new(BigUint::one()).is_err());
        assert!(ZqGroup::new(BigUint::from(2u8)).is_ok());
    }

    #[test]
    fn same_order_as_gq_group() {
        let gq = GqGroup::new(
            BigUint::from(23u8),
            BigUint::from(11u8),
            BigUint::from(2u8),
        )
        .unwrap();
        let zq = ZqGroup::same_order_as(&gq);
        assert_eq!(zq.q(), gq.q());
        assert!(zq.identity().value().is_zero());
    }

    #[test]
    fn containment() {
        let zq = ZqGroup::new(BigUint::from(11u8)).unwrap();
        assert!(zq.contains(&BigUint::from(10u8)));
        assert!(!zq.contains(&BigUint::from(11u8)));
    }
}
