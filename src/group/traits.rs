use std::fmt::Debug;

/// A value tagged with the mathematical group it belongs to.
///
/// The trait is closed on purpose: only the algebra types of this crate and
/// the ElGamal payload types implement it.
pub trait HasGroup {
    type Group: Clone + PartialEq + Debug;

    fn group(&self) -> &Self::Group;
}

/// An element that may populate a [`super::GroupVector`] or
/// [`super::GroupMatrix`].
///
/// `element_size` is 1 for scalars and the inner length for elements that
/// are themselves vectors, such as multi-recipient ciphertexts; collections
/// require it to be uniform.
pub trait GroupVectorElement: HasGroup + Clone + PartialEq + Debug {
    fn element_size(&self) -> usize;
}
