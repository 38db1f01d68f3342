use log::warn;
use nalgebra::DMatrix;

/// 2-norm condition number: ratio of the largest to the smallest singular value.
/// Infinite for a matrix with a zero singular value.
pub fn condition_number(A: &DMatrix<f64>) -> f64 {
    let singular_values = A.singular_values();
    let max_sigma = singular_values.max();
    let min_sigma = singular_values.min();
    if min_sigma == 0.0 {
        f64::INFINITY
    } else {
        max_sigma / min_sigma
    }
}

/// A system of linear equations is poorly conditioned if its solution is sensitive to small changes in
/// the input data. Emits a warning (and does nothing else) when the condition number exceeds `threshold`.
pub fn poorly_conditioned(A: &DMatrix<f64>, threshold: f64) -> bool {
    let cond = condition_number(A);
    let poorly_conditioned = cond > threshold;
    if poorly_conditioned {
        warn!(
            "Warning: condition number of the matrix is approximately {:.1e}",
            cond
        );
    }
    poorly_conditioned
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_condition_number_of_diagonal_matrix() {
        let A = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![4.0, 2.0, 0.5]));
        assert_relative_eq!(condition_number(&A), 8.0, epsilon = 1e-12);
        assert!(!poorly_conditioned(&A, 1e8));
    }

    #[test]
    fn test_singular_matrix_is_poorly_conditioned() {
        let A = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(poorly_conditioned(&A, 1e8));
    }
}
