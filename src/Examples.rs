//! examples of usage of RustedBVP
/// Newton solver for eps*u'' + u*(u' - 1) = f: single problems, a convergence study, stencils and
/// parameter sweeps
pub mod bvp_fd_examples;
