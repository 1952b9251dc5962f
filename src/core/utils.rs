use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::error::MobgaError;

/// Get the random number generator. If no seed is provided, a generator with a default seed is
/// returned so that runs are reproducible.
///
/// # Arguments
///
/// * `seed`: The optional seed.
///
/// returns: `Box<dyn RngCore>`
pub(crate) fn get_rng(seed: Option<u64>) -> Box<dyn RngCore> {
    let rng = match seed {
        None => ChaCha8Rng::from_seed(Default::default()),
        Some(s) => ChaCha8Rng::seed_from_u64(s),
    };
    Box::new(rng)
}

/// Calculate the vector minimum value.
///
/// # Arguments
///
/// * `v`: The vector.
///
/// returns: `Result<f64, MobgaError>`
pub fn vector_min(v: &[f64]) -> Result<f64, MobgaError> {
    Ok(*v
        .iter()
        .min_by(|a, b| a.total_cmp(b))
        .ok_or(MobgaError::Generic(
            "Cannot calculate vector min value".to_string(),
        ))?)
}

/// Calculate the vector maximum value.
///
/// # Arguments
///
/// * `v`: The vector.
///
/// returns: `Result<f64, MobgaError>`
pub fn vector_max(v: &[f64]) -> Result<f64, MobgaError> {
    Ok(*v
        .iter()
        .max_by(|a, b| a.total_cmp(b))
        .ok_or(MobgaError::Generic(
            "Cannot calculate vector max value".to_string(),
        ))?)
}

/// Get the indices that would sort the data in ascending order.
///
/// # Arguments
///
/// * `data`: The values to sort.
///
/// returns: `Vec<usize>`
pub fn argsort(data: &[f64]) -> Vec<usize> {
    let mut indices = (0..data.len()).collect::<Vec<_>>();
    indices.sort_by(|a, b| data[*a].total_cmp(&data[*b]));
    indices
}

#[cfg(test)]
mod test {
    use crate::core::utils::{argsort, vector_max, vector_min};

    #[test]
    fn test_vector_min_max() {
        let v = vec![3.0, 1.0, 2.0];
        assert_eq!(vector_min(&v).unwrap(), 1.0);
        assert_eq!(vector_max(&v).unwrap(), 3.0);
        assert!(vector_min(&[]).is_err());
    }

    #[test]
    fn test_argsort() {
        let v = vec![3.0, 1.0, 2.0];
        assert_eq!(argsort(&v), vec![1, 2, 0]);
    }
}
