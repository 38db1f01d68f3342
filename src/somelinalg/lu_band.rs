#![allow(non_snake_case)]
use crate::error::{BvpError, Result};
use nalgebra::{DMatrix, DVector};
use sprs::CsMat;

/// LU decomposition with partial (row) pivoting of a banded matrix kept in compact band storage.
///
/// A matrix with kl sub-diagonals and ku super-diagonals is stored in an n x (2*kl + ku + 1) array,
/// element A[(i, j)] lives in band[(i, j + kl - i)]. Row swaps of partial pivoting widen the upper band
/// of U to kl + ku, the extra kl columns hold that fill-in. Multipliers of L are stored below the
/// diagonal and are not permuted afterwards, so the row swaps have to be replayed on the right hand side
/// in the same order during the forward substitution (LINPACK/LAPACK gbtrf convention).
/// Work is O(n * kl * (kl + ku)) instead of O(n^3) of a dense factorisation.
pub struct LU_band {
    band: DMatrix<f64>,
    n: usize,
    kl: usize,
    ku: usize,
    /// pivot row chosen at each elimination step
    piv: Vec<usize>,
    factorized: bool,
}

impl LU_band {
    pub fn new(n: usize, kl: usize, ku: usize) -> LU_band {
        LU_band {
            band: DMatrix::zeros(n, 2 * kl + ku + 1),
            n,
            kl,
            ku,
            piv: (0..n).collect(),
            factorized: false,
        }
    }

    /// copy a sparse matrix into band storage, bandwidths are found from the stored entries
    pub fn from_csmat(A: &CsMat<f64>) -> Result<LU_band> {
        let (nrows, ncols) = A.shape();
        if nrows != ncols {
            return Err(BvpError::DimensionMismatch(format!(
                "matrix must be square, got {}x{}",
                nrows, ncols
            )));
        }
        let (kl, ku) = find_bandwidths(A);
        let mut lu = LU_band::new(nrows, kl, ku);
        for (&v, (i, j)) in A.iter() {
            lu.set(i, j, v);
        }
        Ok(lu)
    }

    pub fn bandwidths(&self) -> (usize, usize) {
        (self.kl, self.ku)
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.band[(i, j + self.kl - i)] = value;
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.band[(i, j + self.kl - i)]
    }

    fn get_mut(&mut self, i: usize, j: usize) -> &mut f64 {
        &mut self.band[(i, j + self.kl - i)]
    }

    /// last column touched by row k of U after fill-in
    fn right_border(&self, k: usize) -> usize {
        std::cmp::min(self.n - 1, k + self.kl + self.ku)
    }

    pub fn factorize(&mut self) -> Result<()> {
        let n = self.n;
        for k in 0..n {
            let lower_border = std::cmp::min(n - 1, k + self.kl);
            // pivot: largest element of column k on or below the diagonal
            let mut p = k;
            let mut pmax = self.get(k, k).abs();
            for i in k + 1..=lower_border {
                let v = self.get(i, k).abs();
                if v > pmax {
                    pmax = v;
                    p = i;
                }
            }
            if pmax == 0.0 || !pmax.is_finite() {
                return Err(BvpError::SingularSystem {
                    method: "band".to_string(),
                    column: k,
                });
            }
            self.piv[k] = p;
            let right_border = self.right_border(k);
            if p != k {
                for j in k..=right_border {
                    let tmp = self.get(k, j);
                    *self.get_mut(k, j) = self.get(p, j);
                    *self.get_mut(p, j) = tmp;
                }
            }
            let diag = self.get(k, k);
            for i in k + 1..=lower_border {
                let l = self.get(i, k) / diag;
                *self.get_mut(i, k) = l;
                if l == 0.0 {
                    continue;
                }
                for j in k + 1..=right_border {
                    let ukj = self.get(k, j);
                    *self.get_mut(i, j) -= l * ukj;
                }
            }
        }
        self.factorized = true;
        Ok(())
    }

    pub fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>> {
        let n = self.n;
        if b.len() != n {
            return Err(BvpError::DimensionMismatch(format!(
                "matrix has {} rows, right hand side has {} entries",
                n,
                b.len()
            )));
        }
        if !self.factorized {
            return Err(BvpError::Config(
                "factorize() must be called before solve()".to_string(),
            ));
        }
        let mut x = b.clone();
        // L y = P b
        for k in 0..n {
            let p = self.piv[k];
            if p != k {
                x.swap_rows(k, p);
            }
            let lower_border = std::cmp::min(n - 1, k + self.kl);
            let xk = x[k];
            for i in k + 1..=lower_border {
                x[i] -= self.get(i, k) * xk;
            }
        }
        // U x = y
        for k in (0..n).rev() {
            let mut s = x[k];
            for j in k + 1..=self.right_border(k) {
                s -= self.get(k, j) * x[j];
            }
            x[k] = s / self.get(k, k);
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(BvpError::NonFiniteSolution);
        }
        Ok(x)
    }
}

/// (kl, ku): number of sub- and super-diagonals holding stored entries
pub fn find_bandwidths(A: &CsMat<f64>) -> (usize, usize) {
    let mut kl = 0;
    let mut ku = 0;
    for (_, (i, j)) in A.iter() {
        if i > j {
            kl = kl.max(i - j);
        } else {
            ku = ku.max(j - i);
        }
    }
    (kl, ku)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sprs::TriMat;

    fn csr_from_dense(rows: &[&[f64]]) -> CsMat<f64> {
        let n = rows.len();
        let mut tri = TriMat::new((n, n));
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                if *v != 0.0 {
                    tri.add_triplet(i, j, *v);
                }
            }
        }
        tri.to_csr()
    }

    #[test]
    fn test_bandwidths() {
        let A = csr_from_dense(&[
            &[1.0, 2.0, 0.0, 0.0],
            &[3.0, 1.0, 0.0, 5.0],
            &[0.0, 1.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0, 1.0],
        ]);
        assert_eq!(find_bandwidths(&A), (1, 2));
    }

    #[test]
    fn test_band_lu_matches_dense_lu() {
        // row 1 has a larger entry below the diagonal, so pivoting kicks in
        let rows: [&[f64]; 5] = [
            &[1.0, 0.0, 0.0, 0.0, 0.0],
            &[4.0, -9.0, 5.0, 0.0, 0.0],
            &[0.0, 3.0, -8.0, 6.0, 0.0],
            &[0.0, 0.0, 7.0, -2.0, 1.0],
            &[0.0, 0.0, 0.0, 0.0, 1.0],
        ];
        let A = csr_from_dense(&rows);
        let b = DVector::from_vec(vec![0.5, 1.0, -2.0, 3.0, 1.5]);
        let mut lu = LU_band::from_csmat(&A).unwrap();
        lu.factorize().unwrap();
        let x = lu.solve(&b).unwrap();

        let dense = DMatrix::from_fn(5, 5, |i, j| rows[i][j]);
        let x_dense = dense.clone().lu().solve(&b).unwrap();
        for i in 0..5 {
            assert_relative_eq!(x[i], x_dense[i], epsilon = 1e-12);
        }
        let r = dense * x - b;
        assert!(r.amax() < 1e-12);
    }

    #[test]
    fn test_singular_band_matrix() {
        let A = csr_from_dense(&[&[1.0, 1.0, 0.0], &[1.0, 1.0, 0.0], &[0.0, 0.0, 1.0]]);
        let mut lu = LU_band::from_csmat(&A).unwrap();
        let res = lu.factorize();
        assert!(matches!(res, Err(BvpError::SingularSystem { column: 1, .. })));
    }
}
