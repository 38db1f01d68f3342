use crate::error::{BvpError, Result};
use nalgebra::DVector;

/// Uniform grid on [ax, bx] with m interior points: x[0] = ax, x[m+1] = bx, h = (bx-ax)/(m+1)
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub x: DVector<f64>,
    pub h: f64,
    pub m: usize,
}

impl Grid {
    pub fn new(ax: f64, bx: f64, m: usize) -> Result<Grid> {
        if !ax.is_finite() || !bx.is_finite() || ax == bx {
            return Err(BvpError::DegenerateDomain { ax, bx });
        }
        let h = (bx - ax) / (m + 1) as f64;
        let mut x = DVector::from_fn(m + 2, |i, _| ax + i as f64 * h);
        // the right end is taken as given, not accumulated from h
        x[m + 1] = bx;
        Ok(Grid { x, h, m })
    }

    /// total number of nodes, m + 2
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn interior(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        (1..=self.m).map(move |i| (i, self.x[i]))
    }
}
