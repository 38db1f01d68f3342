//! numerical methods for the boundary value problem eps*u'' + u*(u' - 1) = f
/// Example
/// ```
/// use RustedBVP::numerical::BVP_FD::NR_FD_solver::{NRBVP_FD, linear_initial_guess};
/// use RustedBVP::numerical::BVP_FD::BVP_FD_config::SolverOptions;
/// let mut nr = NRBVP_FD::new(
///     0.01,
///     |_x: f64| 0.0,
///     (0.0, 0.0),
///     (1.0, 1.0),
///     19,
///     linear_initial_guess((0.0, 0.0), (1.0, 1.0)),
/// );
/// nr.set_options(SolverOptions::default().with_loglevel(None));
/// let u = nr.solver().unwrap();
/// assert_eq!(u.len(), 21);
/// ```
pub mod BVP_FD;
/// finite difference weights on arbitrary stencils (Vandermonde and Fornberg algorithms)
pub mod fd_stencils;
