//! Dense integer cost matrix.

use serde::{Deserialize, Serialize};

/// A dense n×n matrix of non-negative integer transit costs, row-major.
///
/// Units depend on what the matrix holds: metres for distances, seconds for
/// durations, or the native unit of an objective.
///
/// # Examples
///
/// ```
/// use fleet_routing::distance::CostMatrix;
///
/// let mut m = CostMatrix::new(3);
/// m.set(0, 1, 500);
/// m.set(1, 0, 700);
/// assert_eq!(m.get(0, 1), 500);
/// assert!(m.has_zero_diagonal());
/// assert!(!m.is_symmetric());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostMatrix {
    data: Vec<i64>,
    size: usize,
}

impl CostMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size * size],
            size,
        }
    }

    /// Creates a matrix from an explicit row-major n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<i64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Builds a matrix by evaluating `f(from, to)` for every off-diagonal cell.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> i64) -> Self {
        let mut m = Self::new(size);
        for i in 0..size {
            for j in 0..size {
                if i != j {
                    m.set(i, j, f(i, j));
                }
            }
        }
        m
    }

    /// Returns the cost from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> i64 {
        self.data[from * self.size + to]
    }

    /// Sets the cost from `from` to `to`.
    pub fn set(&mut self, from: usize, to: usize, value: i64) {
        self.data[from * self.size + to] = value;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns a new matrix with `f` applied to every cell; the diagonal stays zero.
    pub fn map(&self, mut f: impl FnMut(i64) -> i64) -> Self {
        Self::from_fn(self.size, |i, j| f(self.get(i, j)))
    }

    /// Returns `true` if `m[i][j] == m[j][i]` for every pair.
    pub fn is_symmetric(&self) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if self.get(i, j) != self.get(j, i) {
                    return false;
                }
            }
        }
        true
    }

    /// Returns `true` if every diagonal entry is zero.
    pub fn has_zero_diagonal(&self) -> bool {
        (0..self.size).all(|i| self.get(i, i) == 0)
    }

    /// First cell, row-major, that is negative or sits on the diagonal
    /// without being zero. `None` for a well-formed matrix.
    pub fn invalid_cell(&self) -> Option<(usize, usize, i64)> {
        (0..self.size)
            .flat_map(|i| (0..self.size).map(move |j| (i, j)))
            .map(|(i, j)| (i, j, self.get(i, j)))
            .find(|&(i, j, value)| value < 0 || (i == j && value != 0))
    }

    /// Largest entry (0 for an empty matrix).
    pub fn max_value(&self) -> i64 {
        self.data.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data() {
        let m = CostMatrix::from_data(2, vec![0, 5, 7, 0]).expect("valid");
        assert_eq!(m.get(0, 1), 5);
        assert_eq!(m.get(1, 0), 7);
        assert_eq!(m.size(), 2);
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert!(CostMatrix::from_data(2, vec![0, 1, 2]).is_none());
    }

    #[test]
    fn test_from_fn_keeps_zero_diagonal() {
        let m = CostMatrix::from_fn(3, |i, j| (i * 10 + j) as i64 + 1);
        assert!(m.has_zero_diagonal());
        assert_eq!(m.get(2, 1), 22);
    }

    #[test]
    fn test_invalid_cell() {
        let good = CostMatrix::from_data(2, vec![0, 5, 7, 0]).expect("valid");
        assert_eq!(good.invalid_cell(), None);
        let negative = CostMatrix::from_data(2, vec![0, -5000, 7, 0]).expect("valid");
        assert_eq!(negative.invalid_cell(), Some((0, 1, -5000)));
        let diagonal = CostMatrix::from_data(2, vec![7, 5, 5, 0]).expect("valid");
        assert_eq!(diagonal.invalid_cell(), Some((0, 0, 7)));
    }

    #[test]
    fn test_map() {
        let m = CostMatrix::from_data(2, vec![0, 10, 10, 0]).expect("valid");
        let doubled = m.map(|v| v * 2);
        assert_eq!(doubled.get(0, 1), 20);
        assert_eq!(m.get(0, 1), 10);
        assert!(doubled.is_symmetric());
    }

    #[test]
    fn test_asymmetric_matrix() {
        let mut m = CostMatrix::new(2);
        m.set(0, 1, 10);
        m.set(1, 0, 15);
        assert!(!m.is_symmetric());
        assert_eq!(m.max_value(), 15);
    }
}
