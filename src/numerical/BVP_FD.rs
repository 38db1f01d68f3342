
pub mod BVP_FD_config;
pub mod BVP_FD_operators;
pub mod BVP_FD_utils;
pub mod NR_FD_solver;
pub mod grid;
pub mod residual;
