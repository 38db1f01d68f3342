use crate::numerical::BVP_FD::grid::Grid;
use nalgebra::DVector;

/// Residual of the discrete problem at the iterate Uk:
///  G[0]   = Uk[0] - alpha
///  G[m+1] = Uk[m+1] - beta
///  G[i]   = eps/h^2 (Uk[i-1] - 2Uk[i] + Uk[i+1]) + Uk[i]((Uk[i+1] - Uk[i-1])/(2h) - 1) - f(x[i])
/// f is only evaluated on interior nodes.
pub fn residual<F>(
    Uk: &DVector<f64>,
    grid: &Grid,
    epsilon: f64,
    f: &F,
    alpha: f64,
    beta: f64,
) -> DVector<f64>
where
    F: Fn(f64) -> f64 + ?Sized,
{
    let n = grid.len();
    let h = grid.h;
    let c = epsilon / (h * h);
    let mut Gk = DVector::zeros(n);
    Gk[0] = Uk[0] - alpha;
    Gk[n - 1] = Uk[n - 1] - beta;
    for (i, xi) in grid.interior() {
        let (left, mid, right) = (Uk[i - 1], Uk[i], Uk[i + 1]);
        Gk[i] = c * (left - 2.0 * mid + right) + mid * ((right - left) / (2.0 * h) - 1.0) - f(xi);
    }
    Gk
}

/// infinity norm, 0 for an empty vector
pub fn inf_norm(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}
