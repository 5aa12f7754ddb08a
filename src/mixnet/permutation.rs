use num_bigint::BigUint;

use crate::errors::CryptoError;
use crate::hashing::{Hashable, ToHashable};
use crate::random::RandomService;

/// A bijection on `[0, N)`, stored as the image array `π[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    mapping: Vec<usize>,
}

impl Permutation {
    /// Uniform random permutation by Fisher-Yates over rejection-sampled
    /// offsets: for each `i`, swap `π[i]` with `π[i + U(0, N - i))`.
    pub fn generate(size: usize, random: &RandomService) -> Result<Self, CryptoError> {
        if size == 0 {
            return Err(CryptoError::invalid_argument(
                "the permutation size must be strictly positive",
            ));
        }
        let mut mapping: Vec<usize> = (0..size).collect();
        for i in 0..size {
            let offset = random.random_integer(&BigUint::from(size - i))?;
            let offset = usize::try_from(&offset).expect("offset is below size");
            mapping.swap(i, i + offset);
        }
        Ok(Permutation { mapping })
    }

    /// Builds a permutation from an explicit image array, validating it is
    /// a bijection on `[0, N)`.
    pub fn from_mapping(mapping: Vec<usize>) -> Result<Self, CryptoError> {
        if mapping.is_empty() {
            return Err(CryptoError::invalid_argument(
                "the permutation size must be strictly positive",
            ));
        }
        let mut seen = vec![false; mapping.len()];
        for &image in &mapping {
            if image >= mapping.len() || seen[image] {
                return Err(CryptoError::invalid_argument(
                    "the mapping is not a bijection on [0, N)",
                ));
            }
            seen[image] = true;
        }
        Ok(Permutation { mapping })
    }

    pub(crate) fn empty() -> Self {
        Permutation {
            mapping: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.mapping.len()
    }

    /// The image `π(index)`.
    pub fn get(&self, index: usize) -> usize {
        self.mapping[index]
    }

    pub fn images(&self) -> &[usize] {
        &self.mapping
    }
}

impl ToHashable for Permutation {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(self.mapping.iter().map(|&i| Hashable::from(i)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn random(seed: u64) -> RandomService {
        RandomService::from_rng(ChaCha20Rng::seed_from_u64(seed))
    }

    #[test]
    fn generated_permutations_are_bijections() {
        for seed in 0..10 {
            let permutation = Permutation::generate(7, &random(seed)).unwrap();
            let mut images: Vec<usize> = permutation.images().to_vec();
            images.sort_unstable();
            assert_eq!(images, (0..7).collect::<Vec<_>>());
        }
    }

    #[test]
    fn size_one_is_the_identity() {
        let permutation = Permutation::generate(1, &random(1)).unwrap();
        assert_eq!(permutation.get(0), 0);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(Permutation::generate(0, &random(1)).is_err());
    }

    #[test]
    fn mapping_validation() {
        assert!(Permutation::from_mapping(vec![2, 0, 1]).is_ok());
        assert!(Permutation::from_mapping(vec![0, 0, 1]).is_err());
        assert!(Permutation::from_mapping(vec![0, 3, 1]).is_err());
        assert!(Permutation::from_mapping(vec![]).is_err());
    }
}
