use std::fmt;

use faer::Mat;

use crate::error::{Error, Result};

/// Pivot magnitudes below this threshold are treated as structurally zero.
pub const PIVOT_EPSILON: f64 = 1e-12;

/// The augmented MNA matrix for a circuit with `nv` unknowns.
///
/// Rows/columns are 1-indexed in the circuit sense: row/column 0 is ground
/// and is carried in storage but never written or solved. Shape is
/// `(nv+1) x (nv+2)`; the last column is the right-hand side.
pub struct MnaSystem {
    nv: usize,
    data: Mat<f64>,
}

impl MnaSystem {
    pub fn new(nv: usize) -> Self {
        Self {
            nv,
            data: Mat::zeros(nv + 1, nv + 2),
        }
    }

    pub fn nv(&self) -> usize {
        self.nv
    }

    fn rhs_col(&self) -> usize {
        self.nv + 1
    }

    /// Zeroes every entry. Called once per Newton iteration before re-stamping.
    pub fn clear(&mut self) {
        for row in 0..self.data.nrows() {
            for col in 0..self.data.ncols() {
                self.data[(row, col)] = 0.0;
            }
        }
    }

    pub fn add(&mut self, row: usize, col: usize, val: f64) {
        if row == 0 || col == 0 {
            return;
        }
        self.data[(row, col)] += val;
    }

    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        if row == 0 || col == 0 {
            return;
        }
        self.data[(row, col)] = val;
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row == 0 || col == 0 {
            return 0.0;
        }
        self.data[(row, col)]
    }

    pub fn add_rhs(&mut self, row: usize, val: f64) {
        if row == 0 {
            return;
        }
        let col = self.rhs_col();
        self.data[(row, col)] += val;
    }

    pub fn set_rhs(&mut self, row: usize, val: f64) {
        if row == 0 {
            return;
        }
        let col = self.rhs_col();
        self.data[(row, col)] = val;
    }

    /// Four-terminal transconductance stamp: `+val` at `(a,c)`/`(b,d)`, `-val` at `(a,d)`/`(b,c)`.
    pub fn stamp_g(&mut self, a: usize, b: usize, c: usize, d: usize, val: f64) {
        self.add(a, c, val);
        self.add(b, d, val);
        self.add(a, d, -val);
        self.add(b, c, -val);
    }

    /// Two-terminal conductance: `stamp_g(a, b, a, b, g)`.
    pub fn stamp_cond(&mut self, a: usize, b: usize, g: f64) {
        self.stamp_g(a, b, a, b, g);
    }

    /// Current injection flowing from `b` into `a`: row `a` decreases by `i`, row `b` increases by `i`.
    pub fn stamp_isrc(&mut self, a: usize, b: usize, i: f64) {
        self.add_rhs(a, -i);
        self.add_rhs(b, i);
    }

    fn swap_rows(&mut self, r1: usize, r2: usize) {
        if r1 == r2 {
            return;
        }
        for col in 0..self.data.ncols() {
            let tmp = self.data[(r1, col)];
            self.data[(r1, col)] = self.data[(r2, col)];
            self.data[(r2, col)] = tmp;
        }
    }

    /// Gauss-Jordan elimination with partial (column) pivoting, rebuilt from
    /// scratch on every call since the matrix carries no numeric memory
    /// between Newton iterations. On success, `solution(i)` returns `x[i]`.
    pub fn solve(&mut self) -> Result<()> {
        let nv = self.nv;
        let rhs = self.rhs_col();
        for i in 1..=nv {
            let mut pivot_row = i;
            let mut pivot_mag = self.data[(i, i)].abs();
            for l in (i + 1)..=nv {
                let mag = self.data[(l, i)].abs();
                if mag > pivot_mag {
                    pivot_mag = mag;
                    pivot_row = l;
                }
            }
            if pivot_mag < PIVOT_EPSILON {
                return Err(Error::Singular {
                    column: i,
                    pivot: self.data[(pivot_row, i)],
                });
            }
            self.swap_rows(i, pivot_row);

            let pivot = self.data[(i, i)];
            for col in i..=rhs {
                self.data[(i, col)] /= pivot;
            }

            for row in 1..=nv {
                if row == i {
                    continue;
                }
                let factor = self.data[(row, i)];
                if factor == 0.0 {
                    continue;
                }
                for col in i..=rhs {
                    let delta = factor * self.data[(i, col)];
                    self.data[(row, col)] -= delta;
                }
            }
        }
        Ok(())
    }

    pub fn solution(&self, index: usize) -> f64 {
        if index == 0 {
            return 0.0;
        }
        self.data[(index, self.rhs_col())]
    }

    pub fn solution_vec(&self) -> Vec<f64> {
        (0..=self.nv).map(|i| self.solution(i)).collect()
    }
}

impl fmt::Display for MnaSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 1..=self.nv {
            for col in 1..=(self.nv + 1) {
                write!(f, "{:11.4} ", self.data[(row, col)])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_simple_diagonal_system() {
        let mut sys = MnaSystem::new(2);
        sys.set(1, 1, 10.0);
        sys.set(1, 2, 2.0);
        sys.set_rhs(1, 15.0);
        sys.set(2, 1, 2.0);
        sys.set(2, 2, 10.0);
        sys.set_rhs(2, -3.0);

        sys.solve().unwrap();

        let x1 = sys.solution(1);
        let x2 = sys.solution(2);
        assert!((10.0 * x1 + 2.0 * x2 - 15.0).abs() < 1e-9);
        assert!((2.0 * x1 + 10.0 * x2 + 3.0).abs() < 1e-9);
    }

    #[test]
    fn ground_writes_are_discarded() {
        let mut sys = MnaSystem::new(1);
        sys.add(0, 0, 5.0);
        sys.stamp_cond(0, 1, 3.0);
        assert_eq!(sys.get(0, 0), 0.0);
        assert_eq!(sys.get(1, 1), 3.0);
    }

    #[test]
    fn detects_singular_system() {
        let mut sys = MnaSystem::new(2);
        // Two dependent rows: 1*x1 + 1*x2 = 1 twice over.
        sys.set(1, 1, 1.0);
        sys.set(1, 2, 1.0);
        sys.set_rhs(1, 1.0);
        sys.set(2, 1, 1.0);
        sys.set(2, 2, 1.0);
        sys.set_rhs(2, 1.0);

        let err = sys.solve().unwrap_err();
        assert!(matches!(err, Error::Singular { column: 2, .. }));
    }

    #[test]
    fn partial_pivoting_selects_largest_magnitude() {
        let mut sys = MnaSystem::new(2);
        // Without pivoting, the (1,1) entry is 0 and the naive algorithm
        // would divide by zero; pivoting must swap rows 1 and 2 first.
        sys.set(1, 1, 0.0);
        sys.set(1, 2, 2.0);
        sys.set_rhs(1, 4.0);
        sys.set(2, 1, 3.0);
        sys.set(2, 2, 1.0);
        sys.set_rhs(2, 5.0);

        sys.solve().unwrap();
        let x1 = sys.solution(1);
        let x2 = sys.solution(2);
        assert!((2.0 * x2 - 4.0).abs() < 1e-9);
        assert!((3.0 * x1 + x2 - 5.0).abs() < 1e-9);
    }
}
