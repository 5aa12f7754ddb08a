//! Small argument-validation helpers shared by constructors and services.

use crate::errors::CryptoError;

/// Checks that every item agrees under the projection `f`, e.g. that all
/// elements of a vector live in the same group.
pub fn all_equal<T, K: PartialEq>(
    items: impl IntoIterator<Item = T>,
    f: impl Fn(&T) -> K,
    description: &str,
) -> Result<(), CryptoError> {
    let mut witness: Option<K> = None;
    for item in items {
        let key = f(&item);
        match &witness {
            None => witness = Some(key),
            Some(first) if *first == key => {}
            Some(_) => {
                return Err(CryptoError::invariant(format!(
                    "all items must have the same {description}"
                )))
            }
        }
    }
    Ok(())
}

/// Rejects empty collections.
pub fn check_non_empty<T>(items: &[T], description: &str) -> Result<(), CryptoError> {
    if items.is_empty() {
        return Err(CryptoError::invalid_argument(format!(
            "{description} must not be empty"
        )));
    }
    Ok(())
}

/// Rejects `value` outside `[1, upper]`, reporting `description`.
pub fn check_in_bounds(value: usize, upper: usize, description: &str) -> Result<(), CryptoError> {
    if value == 0 || value > upper {
        return Err(CryptoError::invalid_argument(format!(
            "{description} must lie in [1, {upper}], got {value}"
        )));
    }
    Ok(())
}
