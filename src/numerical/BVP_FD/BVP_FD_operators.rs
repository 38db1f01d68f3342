//! Sparse operators of the discrete problem
//!
//!   eps*u'' + u*(u' - 1) = f(x)
//!
//! discretised with central differences on m+2 nodes. All matrices are
//! (m+2)x(m+2) `sprs` CSR matrices assembled from triplets in two steps: first
//! the regular tridiagonal pattern over all rows, then the Dirichlet override
//! of the first and the last row.
//!
//! The diagonals are handed around the way a `diags([sub, diag, sup], [-1, 0, 1])`
//! builder takes them: `sub[j]` lands at (j+1, j), `sup[j]` lands at (j, j+1).
use nalgebra::DVector;
use sprs::{CsMat, TriMat};

pub type Triplets = Vec<(usize, usize, f64)>;

/// scale * diags([sub, diag, sup], [-1, 0, 1]) as a list of triplets.
/// `diag` has n entries, `sub` and `sup` have n-1 entries each.
pub fn tridiagonal_triplets(sub: &[f64], diag: &[f64], sup: &[f64], scale: f64) -> Triplets {
    let n = diag.len();
    assert_eq!(sub.len() + 1, n, "sub-diagonal must have n-1 entries");
    assert_eq!(sup.len() + 1, n, "super-diagonal must have n-1 entries");
    let mut triplets: Triplets = Vec::with_capacity(3 * n);
    for (j, s) in sub.iter().enumerate() {
        triplets.push((j + 1, j, scale * s));
    }
    for (i, d) in diag.iter().enumerate() {
        triplets.push((i, i, scale * d));
    }
    for (j, p) in sup.iter().enumerate() {
        triplets.push((j, j + 1, scale * p));
    }
    triplets
}

/// replace row 0 by [1, 0, ...] and row n-1 by [..., 0, 1]
pub fn dirichlet_rows(triplets: Triplets, n: usize) -> Triplets {
    let last = n - 1;
    let mut triplets: Triplets = triplets
        .into_iter()
        .filter(|(i, _, _)| *i != 0 && *i != last)
        .collect();
    triplets.push((0, 0, 1.0));
    triplets.push((last, last, 1.0));
    triplets
}

/// zero out row 0 and row n-1 (keeps the entries so the sparsity pattern stays fixed)
pub fn zero_boundary_rows(triplets: Triplets, n: usize) -> Triplets {
    let last = n - 1;
    triplets
        .into_iter()
        .map(|(i, j, v)| if i == 0 || i == last { (i, j, 0.0) } else { (i, j, v) })
        .collect()
}

pub fn triplets_to_csr(n: usize, triplets: &Triplets) -> CsMat<f64> {
    let mut triplet_matrix = TriMat::new((n, n));
    for (i, j, v) in triplets {
        triplet_matrix.add_triplet(*i, *j, *v);
    }
    let csr_matrix: CsMat<f64> = triplet_matrix.to_csr();
    csr_matrix
}

/// A = eps/h^2 * tridiag(1, -2, 1) with identity rows for the two Dirichlet conditions.
/// Built once per solve.
pub fn linear_operator(epsilon: f64, h: f64, m: usize) -> CsMat<f64> {
    let n = m + 2;
    let off = vec![1.0; n - 1];
    let diag = vec![-2.0; n];
    let triplets = tridiagonal_triplets(&off, &diag, &off, epsilon / (h * h));
    triplets_to_csr(n, &dirichlet_rows(triplets, n))
}

/// Diagonals of the nonlinear part of the Jacobian, not yet scaled by 1/(2h):
///  sub[j] = -U[j+1] with sub[m] = 0,
///  diag[i] = U[i+1] - U[i-1] - 2h for interior i, 0 on the boundary,
///  sup[j] = U[j] with sup[0] = 0.
/// The two forced zeros are the entries that would fall into the boundary rows.
pub fn nonlinear_diagonals(U: &DVector<f64>, h: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = U.len();
    let m = n - 2;
    let mut sub: Vec<f64> = U.iter().skip(1).map(|u| -u).collect();
    sub[m] = 0.0;
    let mut diag = vec![0.0; n];
    for i in 1..=m {
        diag[i] = U[i + 1] - U[i - 1] - 2.0 * h;
    }
    let mut sup: Vec<f64> = U.iter().take(n - 1).copied().collect();
    sup[0] = 0.0;
    (sub, diag, sup)
}

/// N(U): derivative of the term u*(u' - 1) of the discrete residual, rows 0 and m+1 are zero
pub fn nonlinear_correction(U: &DVector<f64>, h: f64) -> CsMat<f64> {
    let n = U.len();
    let (sub, diag, sup) = nonlinear_diagonals(U, h);
    let triplets = tridiagonal_triplets(&sub, &diag, &sup, 1.0 / (2.0 * h));
    triplets_to_csr(n, &zero_boundary_rows(triplets, n))
}

/// Jk = A + N(U), rebuilt from scratch every Newton step
pub fn jacobian(A: &CsMat<f64>, U: &DVector<f64>, h: f64) -> CsMat<f64> {
    let N = nonlinear_correction(U, h);
    A + &N
}

/// value at (i, j), zero if the entry is not stored
pub fn entry(mat: &CsMat<f64>, i: usize, j: usize) -> f64 {
    mat.get(i, j).copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tridiagonal_layout() {
        let t = tridiagonal_triplets(&[1.0, 2.0], &[3.0, 4.0, 5.0], &[6.0, 7.0], 2.0);
        let mat = triplets_to_csr(3, &t);
        assert_eq!(entry(&mat, 1, 0), 2.0);
        assert_eq!(entry(&mat, 2, 1), 4.0);
        assert_eq!(entry(&mat, 0, 0), 6.0);
        assert_eq!(entry(&mat, 2, 2), 10.0);
        assert_eq!(entry(&mat, 0, 1), 12.0);
        assert_eq!(entry(&mat, 1, 2), 14.0);
        assert_eq!(entry(&mat, 0, 2), 0.0);
    }

    #[test]
    fn test_linear_operator_dirichlet_rows() {
        let (epsilon, h, m) = (0.5, 0.25, 3);
        let A = linear_operator(epsilon, h, m);
        assert_eq!(A.shape(), (5, 5));
        let s = epsilon / (h * h);
        // boundary rows are identity rows
        for j in 0..5 {
            assert_eq!(entry(&A, 0, j), if j == 0 { 1.0 } else { 0.0 });
            assert_eq!(entry(&A, 4, j), if j == 4 { 1.0 } else { 0.0 });
        }
        for i in 1..=m {
            assert_relative_eq!(entry(&A, i, i - 1), s);
            assert_relative_eq!(entry(&A, i, i), -2.0 * s);
            assert_relative_eq!(entry(&A, i, i + 1), s);
        }
    }

    #[test]
    fn test_linear_operator_without_interior_points() {
        let A = linear_operator(1.0, 1.0, 0);
        assert_eq!(entry(&A, 0, 0), 1.0);
        assert_eq!(entry(&A, 0, 1), 0.0);
        assert_eq!(entry(&A, 1, 0), 0.0);
        assert_eq!(entry(&A, 1, 1), 1.0);
    }

    #[test]
    fn test_nonlinear_correction_boundary_rows_are_zero() {
        let U = DVector::from_vec(vec![0.3, 1.0, 2.0, 4.0, 0.7]);
        let h = 0.1;
        let N = nonlinear_correction(&U, h);
        for j in 0..5 {
            assert_eq!(entry(&N, 0, j), 0.0);
            assert_eq!(entry(&N, 4, j), 0.0);
        }
        // row 2: -U[2], U[3]-U[1]-2h, U[2], all over 2h
        assert_relative_eq!(entry(&N, 2, 1), -2.0 / 0.2, epsilon = 1e-12);
        assert_relative_eq!(entry(&N, 2, 2), (4.0 - 1.0 - 0.2) / 0.2, epsilon = 1e-12);
        assert_relative_eq!(entry(&N, 2, 3), 2.0 / 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_three_by_three_jacobian_by_hand() {
        // m = 1 on [0, 1]: h = 0.5, eps = 0.1, eps/h^2 = 0.4, 1/(2h) = 1
        let (epsilon, h) = (0.1, 0.5);
        let U = DVector::from_vec(vec![0.0, 0.5, 1.0]);
        let A = linear_operator(epsilon, h, 1);
        let expected_A = [[1.0, 0.0, 0.0], [0.4, -0.8, 0.4], [0.0, 0.0, 1.0]];
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(entry(&A, i, j), expected_A[i][j], epsilon = 1e-14);
            }
        }
        // N row 1: -U[1], U[2]-U[0]-2h, U[1]
        let N = nonlinear_correction(&U, h);
        let expected_N = [[0.0, 0.0, 0.0], [-0.5, 0.0, 0.5], [0.0, 0.0, 0.0]];
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(entry(&N, i, j), expected_N[i][j], epsilon = 1e-14);
            }
        }
        let J = jacobian(&A, &U, h);
        let expected_J = [[1.0, 0.0, 0.0], [-0.1, -0.8, 0.9], [0.0, 0.0, 1.0]];
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(entry(&J, i, j), expected_J[i][j], epsilon = 1e-14);
            }
        }
    }
}
