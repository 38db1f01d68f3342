//! some linear algebra functions used throughout the code
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// LU decomposition with partial pivoting in compact band storage
pub mod lu_band;
/// choice of the linear solver for the Newton step
pub mod sparse_solvers_depot;
/// diagnostics for linear systems and matrices: if it is singular
/// or poorly conditioned
pub mod linear_sys_diagnostics;
