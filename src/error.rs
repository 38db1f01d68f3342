//! Error types of the finite-difference BVP solver.
//!
//! Configuration errors are raised before the first Newton step, linear-algebra
//! errors abort the iteration, export errors come from the result writers.
//! Non-convergence is not an error: the solver returns its best iterate and
//! reports the status instead.

use thiserror::Error;

/// Result type alias using [`BvpError`].
pub type Result<T> = std::result::Result<T, BvpError>;

#[derive(Error, Debug)]
pub enum BvpError {
    // ============ configuration ============
    /// number of interior points is not representable (negative in a config file etc.)
    #[error("Invalid number of interior grid points: {m}")]
    InvalidGridSize { m: i64 },

    /// ax == bx or non-finite bounds
    #[error("Degenerate domain [{ax}, {bx}]: bounds must be finite and distinct")]
    DegenerateDomain { ax: f64, bx: f64 },

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// the initial guess function returned a vector of the wrong length
    #[error("Initial guess has length {got}, grid has {expected} nodes")]
    InitialGuessLength { expected: usize, got: usize },

    /// derivative order is not smaller than the number of stencil points
    #[error("Stencil of {n} points cannot approximate a derivative of order {k}")]
    StencilTooNarrow { k: usize, n: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    // ============ linear algebra ============
    #[error("Singular linear system ({method} solver): zero pivot in column {column}")]
    SingularSystem { method: String, column: usize },

    #[error("Linear solve produced a non-finite solution")]
    NonFiniteSolution,

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    // ============ output ============
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Plotting error: {0}")]
    Plot(String),
}

impl From<toml::de::Error> for BvpError {
    fn from(e: toml::de::Error) -> Self {
        BvpError::Config(e.to_string())
    }
}
