use crate::error::{BvpError, Result};
use crate::somelinalg::lu_band::LU_band;
use log::debug;
use nalgebra::{DMatrix, DVector};
use sprs::CsMat;
use strum_macros::{Display, EnumIter, EnumString};

/// Direct solvers available for the Newton step J*delta = G.
///  "band" - LU with partial pivoting restricted to the band of the matrix (default, O(n) for tridiagonal systems)
///  "lu"   - nalgebra dense LU of the densified matrix (small systems, reference results)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum LinearSysMethod {
    #[default]
    #[strum(serialize = "band")]
    Band,
    #[strum(serialize = "lu")]
    Lu,
}

impl LinearSysMethod {
    pub fn solve(&self, A: &CsMat<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
        sparse_solvers_depot(A, b, *self)
    }
}

pub fn csmat_to_dmatrix(A: &CsMat<f64>) -> DMatrix<f64> {
    let (nrows, ncols) = A.shape();
    let mut dense = DMatrix::zeros(nrows, ncols);
    for (&v, (i, j)) in A.iter() {
        dense[(i, j)] += v;
    }
    dense
}

pub fn sparse_solvers_depot(
    A: &CsMat<f64>,
    b: &DVector<f64>,
    method: LinearSysMethod,
) -> Result<DVector<f64>> {
    let (nrows, ncols) = A.shape();
    if nrows != ncols || nrows != b.len() {
        return Err(BvpError::DimensionMismatch(format!(
            "matrix is {}x{}, right hand side has {} entries",
            nrows,
            ncols,
            b.len()
        )));
    }
    match method {
        LinearSysMethod::Band => {
            let mut lu = LU_band::from_csmat(A)?;
            debug!("band solver, (kl, ku) = {:?}", lu.bandwidths());
            lu.factorize()?;
            lu.solve(b)
        }
        LinearSysMethod::Lu => {
            let lu = csmat_to_dmatrix(A).lu();
            if !lu.is_invertible() {
                let column = (0..nrows)
                    .find(|&k| lu.u()[(k, k)] == 0.0)
                    .unwrap_or(0);
                return Err(BvpError::SingularSystem {
                    method: method.to_string(),
                    column,
                });
            }
            let x = lu.solve(b).ok_or(BvpError::SingularSystem {
                method: method.to_string(),
                column: 0,
            })?;
            if x.iter().any(|v| !v.is_finite()) {
                return Err(BvpError::NonFiniteSolution);
            }
            Ok(x)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sprs::TriMat;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn tridiagonal(n: usize, sub: f64, diag: f64, sup: f64) -> CsMat<f64> {
        let mut tri = TriMat::new((n, n));
        for i in 0..n {
            tri.add_triplet(i, i, diag);
            if i > 0 {
                tri.add_triplet(i, i - 1, sub);
            }
            if i + 1 < n {
                tri.add_triplet(i, i + 1, sup);
            }
        }
        tri.to_csr()
    }

    #[test]
    fn test_methods_agree() {
        let A = tridiagonal(12, 1.0, -3.0, 1.5);
        let b = DVector::from_fn(12, |i, _| (i as f64).sin());
        let reference = csmat_to_dmatrix(&A).lu().solve(&b).unwrap();
        for method in LinearSysMethod::iter() {
            let x = method.solve(&A, &b).unwrap();
            for i in 0..12 {
                assert_relative_eq!(x[i], reference[i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_singular_matrix_is_an_error() {
        let mut tri = TriMat::new((3, 3));
        tri.add_triplet(0, 0, 1.0);
        tri.add_triplet(2, 2, 1.0);
        // row and column 1 are empty
        let A: CsMat<f64> = tri.to_csr();
        let b = DVector::from_vec(vec![1.0, 1.0, 1.0]);
        for method in LinearSysMethod::iter() {
            let res = method.solve(&A, &b);
            assert!(
                matches!(res, Err(BvpError::SingularSystem { .. })),
                "{} solver accepted a singular matrix",
                method
            );
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let A = tridiagonal(3, 1.0, 2.0, 1.0);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(matches!(
            sparse_solvers_depot(&A, &b, LinearSysMethod::Band),
            Err(BvpError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(LinearSysMethod::from_str("LU").unwrap(), LinearSysMethod::Lu);
        assert_eq!(LinearSysMethod::from_str("band").unwrap(), LinearSysMethod::Band);
        assert!(LinearSysMethod::from_str("gmres").is_err());
        assert_eq!(LinearSysMethod::default().to_string(), "band");
    }
}
