use num_bigint::BigUint;

/// Closed union of values the recursive hash can ingest.
///
/// Lists are recursive and must be non-empty at hash time; the boundary
/// check lives in the hash service, not here, so intermediate construction
/// stays ergonomic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hashable {
    Bytes(Vec<u8>),
    Text(String),
    Integer(BigUint),
    List(Vec<Hashable>),
}

impl Hashable {
    pub fn from_text(text: impl Into<String>) -> Self {
        Hashable::Text(text.into())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Hashable::Bytes(bytes.into())
    }
}

impl From<&BigUint> for Hashable {
    fn from(value: &BigUint) -> Self {
        Hashable::Integer(value.clone())
    }
}

impl From<usize> for Hashable {
    fn from(value: usize) -> Self {
        Hashable::Integer(BigUint::from(value))
    }
}

impl From<&str> for Hashable {
    fn from(value: &str) -> Self {
        Hashable::Text(value.to_string())
    }
}

/// Renders a domain object into its canonical [`Hashable`] form.
///
/// Kept closed: only the algebra, collection and ElGamal payload types of
/// this crate implement it.
pub trait ToHashable {
    fn to_hashable(&self) -> Hashable;
}

impl ToHashable for Hashable {
    fn to_hashable(&self) -> Hashable {
        self.clone()
    }
}
