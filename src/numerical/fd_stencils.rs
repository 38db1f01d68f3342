//! Finite-difference stencil coefficients.
//!
//! Given n points x[0..n] and a point xbar, find weights c such that
//!   u^(k)(xbar) ~ sum_j c[j] u(x[j])
//! exactly for polynomials of degree n-1 (k < n required). On a uniform grid with spacing dx the error is
//! O(dx^(n-k)) in general; the points need not be equally spaced.
//!
//! Two algorithms:
//! - `fdcoeffV` solves the n x n Vandermonde system (simple, ill-conditioned for many points, a warning is
//!   logged when the condition number exceeds 1e8);
//! - `fdcoeffF` is Fornberg's recursion (Math. Comp. 51 (1988) 699-706), stable, and can produce weights of
//!   all derivative orders 0..k at once (`fdcoeffF_full`).
//!
//! This module is a standalone helper: the BVP solver uses the classic 3-point stencils directly.
use crate::error::{BvpError, Result};
use crate::somelinalg::linear_sys_diagnostics::poorly_conditioned;
use log::info;
use nalgebra::{DMatrix, DVector};

const VANDERMONDE_COND_WARNING: f64 = 1e8;

fn factorial(i: usize) -> f64 {
    (1..=i).fold(1.0, |acc, j| acc * j as f64)
}

/// weights of the k-th derivative at xbar from the values at x, via the Vandermonde system
pub fn fdcoeffV(k: usize, xbar: f64, x: &[f64]) -> Result<DVector<f64>> {
    let n = x.len();
    if k >= n {
        return Err(BvpError::StencilTooNarrow { k, n });
    }
    let xrow: Vec<f64> = x.iter().map(|xi| xi - xbar).collect();
    // row i holds (x - xbar)^i / i!
    let A = DMatrix::from_fn(n, n, |i, j| xrow[j].powi(i as i32) / factorial(i));
    poorly_conditioned(&A, VANDERMONDE_COND_WARNING);

    let mut b = DVector::zeros(n);
    b[k] = 1.0;
    let c = A.lu().solve(&b).ok_or(BvpError::SingularSystem {
        method: "lu".to_string(),
        column: 0,
    })?;
    if c.iter().any(|v| !v.is_finite()) {
        return Err(BvpError::NonFiniteSolution);
    }
    Ok(c)
}

/// Fornberg's weights for all derivative orders 0..=k: column s of the returned (n x (k+1))
/// matrix holds the weights of the s-th derivative
pub fn fdcoeffF_full(k: usize, xbar: f64, x: &[f64]) -> Result<DMatrix<f64>> {
    if x.is_empty() || k > x.len() - 1 {
        return Err(BvpError::StencilTooNarrow { k, n: x.len() });
    }
    let n = x.len() - 1;
    let m = k;
    let mut c1 = 1.0;
    let mut c4 = x[0] - xbar;
    let mut C = DMatrix::zeros(n + 1, m + 1);
    C[(0, 0)] = 1.0;
    for i in 1..=n {
        let mn = std::cmp::min(i, m);
        let mut c2 = 1.0;
        let c5 = c4;
        c4 = x[i] - xbar;
        for j in 0..i {
            let c3 = x[i] - x[j];
            c2 *= c3;
            if j == i - 1 {
                for s in (1..=mn).rev() {
                    C[(i, s)] = c1 * (s as f64 * C[(i - 1, s - 1)] - c5 * C[(i - 1, s)]) / c2;
                }
                C[(i, 0)] = -c1 * c5 * C[(i - 1, 0)] / c2;
            }
            for s in (1..=mn).rev() {
                C[(j, s)] = (c4 * C[(j, s)] - s as f64 * C[(j, s - 1)]) / c3;
            }
            C[(j, 0)] = c4 * C[(j, 0)] / c3;
        }
        c1 = c2;
    }
    // coinciding points divide by zero above
    if C.iter().any(|v| !v.is_finite()) {
        return Err(BvpError::NonFiniteSolution);
    }
    Ok(C)
}

/// Fornberg's weights of the k-th derivative only
pub fn fdcoeffF(k: usize, xbar: f64, x: &[f64]) -> Result<DVector<f64>> {
    let C = fdcoeffF_full(k, xbar, x)?;
    Ok(C.column(k).into_owned())
}

/// %g-like rendering with 6 significant digits
fn format_g(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{}", v);
    }
    let digits = 5 - v.abs().log10().floor() as i32;
    if digits > 0 {
        let scale = 10f64.powi(digits);
        format!("{}", (v * scale).round() / scale)
    } else {
        format!("{}", v.round())
    }
}

/// Stencil of the k-th derivative on integer points (indices of grid nodes) with unit spacing, e.g.
/// `fdstencil(2, 0, &[-1, 0, 1])` gives [1, -2, 1] and "[ + 1 U_{-1} - 2 U_{0} + 1 U_{1}] / h^2".
/// The coefficients and the rendered stencil are returned, the text is also logged.
pub fn fdstencil(k: usize, jbar: i64, stencil_points: &[i64]) -> Result<(DVector<f64>, String)> {
    let x: Vec<f64> = stencil_points.iter().map(|&p| p as f64).collect();
    let c = fdcoeffV(k, jbar as f64, &x)?;

    let mut s = String::from("[");
    for (cj, pj) in c.iter().zip(stencil_points.iter()) {
        let sign = if *cj >= 0.0 { " + " } else { " - " };
        s.push_str(sign);
        s.push_str(&format!("{} U_{{{}}}", format_g(cj.abs()), pj));
    }
    s.push_str(&format!("] / h^{}", k));
    info!(
        "Stencil for approximation to order {} derivative at U_{{{}}} is: \n {}",
        k, jbar, s
    );
    Ok((c, s))
}
