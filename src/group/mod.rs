//! Group algebra for the safe-prime setting.
//!
//! `GqGroup` is the multiplicative subgroup of quadratic residues of order
//! `q` inside `Z*_p` with `p = 2q + 1`; `ZqGroup` is its exponent ring.
//! Collections of elements live in [`GroupVector`] and [`GroupMatrix`],
//! which enforce group and element-size homogeneity at construction.

mod gq_element;
mod gq_group;
mod group_matrix;
mod group_vector;
mod traits;
mod zq_element;
mod zq_group;

pub use gq_element::GqElement;
pub use gq_group::GqGroup;
pub use group_matrix::GroupMatrix;
pub use group_vector::GroupVector;
pub use traits::{GroupVectorElement, HasGroup};
pub use zq_element::ZqElement;
pub use zq_group::ZqGroup;
