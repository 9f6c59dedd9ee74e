use nalgebra::DMatrix;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("Position {index} is out of range for a matrix of size {size}")]
    OutOfRange { index: usize, size: usize },
    #[error("Diagonal cell ({0}, {0}) must stay zero")]
    DiagonalWrite(usize),
    #[error("Score {0} is not a non-negative number")]
    InvalidScore(f64),
    #[error("Cannot prune a matrix of size {0}")]
    NothingToPrune(usize),
}

/// Maps a position of the full matrix to its position once `removed` is gone.
///
/// `index` must differ from `removed`.
pub fn compress_index(index: usize, removed: usize) -> usize {
    if index > removed { index - 1 } else { index }
}

/// Inverse of [`compress_index`]: the full-matrix position of `index` in the
/// matrix without `removed`.
pub fn expand_index(index: usize, removed: usize) -> usize {
    if index >= removed { index + 1 } else { index }
}

/// A symmetric all-pairs score matrix over conformer labels.
///
/// Rows and columns are addressed by position; `labels[position]` names the
/// conformer. Labels keep their relative order as rows are pruned.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    values: DMatrix<f64>,
    labels: Vec<usize>,
}

impl DistanceMatrix {
    /// A zero matrix over labels `0..size`.
    pub fn new(size: usize) -> Self {
        Self::with_labels((0..size).collect())
    }

    pub fn with_labels(labels: Vec<usize>) -> Self {
        Self {
            values: DMatrix::zeros(labels.len(), labels.len()),
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    fn check(&self, index: usize) -> Result<(), MatrixError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(MatrixError::OutOfRange {
                index,
                size: self.len(),
            })
        }
    }

    /// Writes `value` to both (i, j) and (j, i).
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<(), MatrixError> {
        self.check(i)?;
        self.check(j)?;
        if i == j {
            return Err(MatrixError::DiagonalWrite(i));
        }
        if value.is_nan() || value < 0.0 {
            return Err(MatrixError::InvalidScore(value));
        }
        self.values[(i, j)] = value;
        self.values[(j, i)] = value;
        Ok(())
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        (i < self.len() && j < self.len()).then(|| self.values[(i, j)])
    }

    pub fn row_sum(&self, row: usize) -> Option<f64> {
        (row < self.len()).then(|| self.values.row(row).iter().fold(0.0, |acc, v| acc + v))
    }

    fn off_diagonal(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.len();
        (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (i, j, self.values[(i, j)])))
    }

    /// The largest off-diagonal score and its (row, col), row < col; first wins ties.
    pub fn max_value(&self) -> Option<(usize, usize, f64)> {
        self.off_diagonal()
            .fold(None, |best, cell| match best {
                Some((_, _, v)) if v >= cell.2 => best,
                _ => Some(cell),
            })
    }

    /// The smallest off-diagonal score and its (row, col), row < col; first wins ties.
    pub fn min_value(&self) -> Option<(usize, usize, f64)> {
        self.off_diagonal()
            .fold(None, |best, cell| match best {
                Some((_, _, v)) if v <= cell.2 => best,
                _ => Some(cell),
            })
    }

    /// Position of the most divergent row. Equal sums go to the highest label.
    pub fn max_sum_row(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for row in 0..self.len() {
            let sum = self.row_sum(row)?;
            best = match best {
                Some((b, s)) if sum < s || (sum == s && self.labels[row] < self.labels[b]) => {
                    Some((b, s))
                }
                _ => Some((row, sum)),
            };
        }
        best.map(|(row, _)| row)
    }

    /// Position of the most central row. Equal sums go to the lowest label.
    pub fn min_sum_row(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        let mut best_sum = f64::INFINITY;
        for row in 0..self.len() {
            let sum = self.row_sum(row)?;
            let better = match best {
                None => sum <= best_sum,
                Some((b, _)) => {
                    sum < best_sum || (sum == best_sum && self.labels[row] < self.labels[b])
                }
            };
            if better {
                best = Some((row, sum));
                best_sum = sum;
            }
        }
        best.map(|(row, _)| row)
    }

    /// Removes the row and column at `position` and returns its label.
    pub fn remove(&mut self, position: usize) -> Result<usize, MatrixError> {
        self.check(position)?;
        let size = self.len() - 1;
        let values = &self.values;
        let shrunk = DMatrix::from_fn(size, size, |r, c| {
            values[(expand_index(r, position), expand_index(c, position))]
        });
        self.values = shrunk;
        Ok(self.labels.remove(position))
    }

    /// Removes the most divergent row (see [`Self::max_sum_row`]) and returns its label.
    pub fn prune_most_divergent(&mut self) -> Result<usize, MatrixError> {
        if self.len() < 2 {
            return Err(MatrixError::NothingToPrune(self.len()));
        }
        let position = self
            .max_sum_row()
            .ok_or(MatrixError::NothingToPrune(self.len()))?;
        self.remove(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(scores: &[(usize, usize, f64)], size: usize) -> DistanceMatrix {
        let mut m = DistanceMatrix::new(size);
        for &(i, j, v) in scores {
            m.set(i, j, v).unwrap();
        }
        m
    }

    fn assert_symmetric(m: &DistanceMatrix) {
        for i in 0..m.len() {
            assert_eq!(m.get(i, i), Some(0.0));
            for j in 0..m.len() {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
    }

    #[test]
    fn index_helpers_are_inverse() {
        for removed in 0..5 {
            for new in 0..4 {
                let old = expand_index(new, removed);
                assert_ne!(old, removed);
                assert_eq!(compress_index(old, removed), new);
            }
        }
        assert_eq!(compress_index(4, 2), 3);
        assert_eq!(compress_index(1, 2), 1);
        assert_eq!(expand_index(2, 2), 3);
        assert_eq!(expand_index(1, 2), 1);
    }

    #[test]
    fn set_keeps_matrix_symmetric() {
        let mut m = filled(&[(0, 1, 1.0), (2, 0, 3.0), (1, 2, 2.0)], 3);
        m.set(1, 0, 4.0).unwrap();
        assert_symmetric(&m);
        assert_eq!(m.get(0, 1), Some(4.0));
        assert_eq!(m.get(3, 0), None);
    }

    #[test]
    fn set_rejects_diagonal_out_of_range_and_invalid_scores() {
        let mut m = DistanceMatrix::new(2);
        assert_eq!(m.set(1, 1, 0.0), Err(MatrixError::DiagonalWrite(1)));
        assert_eq!(
            m.set(0, 2, 1.0),
            Err(MatrixError::OutOfRange { index: 2, size: 2 })
        );
        assert_eq!(m.set(0, 1, -1.0), Err(MatrixError::InvalidScore(-1.0)));
        assert!(m.set(0, 1, f64::NAN).is_err());
        assert!(m.set(0, 1, f64::MAX).is_ok());
    }

    #[test]
    fn extreme_values_ignore_the_diagonal() {
        let m = filled(&[(0, 1, 0.5), (0, 2, 0.2), (1, 2, 0.9)], 3);
        assert_eq!(m.max_value(), Some((1, 2, 0.9)));
        assert_eq!(m.min_value(), Some((0, 2, 0.2)));
        assert_eq!(DistanceMatrix::new(1).max_value(), None);
    }

    #[test]
    fn row_sums_and_extreme_rows() {
        let m = filled(&[(0, 1, 1.0), (0, 2, 1.0), (1, 2, 5.0)], 3);
        assert_eq!(m.row_sum(0), Some(2.0));
        assert_eq!(m.row_sum(1), Some(6.0));
        assert_eq!(m.max_sum_row(), Some(2)); // rows 1 and 2 tie, highest label
        assert_eq!(m.min_sum_row(), Some(0));
    }

    #[test]
    fn all_zero_matrix_selects_by_label_tie_break() {
        let m = DistanceMatrix::new(4);
        assert_eq!(m.max_sum_row(), Some(3));
        assert_eq!(m.min_sum_row(), Some(0));
    }

    #[test]
    fn sentinel_rows_are_most_divergent() {
        let m = filled(
            &[(0, 1, 0.1), (0, 2, f64::MAX), (1, 2, f64::MAX)],
            3,
        );
        assert_eq!(m.row_sum(2), Some(f64::INFINITY));
        assert_eq!(m.max_sum_row(), Some(2));
    }

    #[test]
    fn prune_removes_one_label_and_preserves_survivors() {
        let mut m = filled(
            &[
                (0, 1, 0.1),
                (0, 2, 0.2),
                (0, 3, 3.0),
                (1, 2, 0.3),
                (1, 3, 3.1),
                (2, 3, 2.9),
            ],
            4,
        );
        assert_eq!(m.prune_most_divergent(), Ok(3));
        assert_eq!(m.labels(), &[0, 1, 2]);
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(1, 2), Some(0.3));
        assert_eq!(m.get(0, 2), Some(0.2));
        assert_symmetric(&m);

        assert_eq!(m.prune_most_divergent(), Ok(2));
        assert_eq!(m.labels(), &[0, 1]);
        assert_eq!(m.get(0, 1), Some(0.1));
    }

    #[test]
    fn removing_a_middle_row_shifts_later_positions() {
        let mut m = filled(&[(0, 1, 1.0), (0, 2, 2.0), (1, 2, 3.0)], 3);
        assert_eq!(m.remove(1), Ok(1));
        assert_eq!(m.labels(), &[0, 2]);
        assert_eq!(m.get(0, 1), Some(2.0));
    }

    #[test]
    fn n_minus_one_prunings_leave_one_label() {
        let n = 6;
        let mut m = DistanceMatrix::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                m.set(i, j, (i * 7 + j * 3) as f64 % 5.0 + 0.5).unwrap();
            }
        }
        for step in 1..n {
            m.prune_most_divergent().unwrap();
            assert_eq!(m.len(), n - step);
            assert!(m.labels().windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(
            m.prune_most_divergent(),
            Err(MatrixError::NothingToPrune(1))
        );
    }

    #[test]
    fn two_row_tie_keeps_lowest_label() {
        let mut m = filled(&[(0, 1, 0.7)], 2);
        assert_eq!(m.prune_most_divergent(), Ok(1));
        assert_eq!(m.labels(), &[0]);
    }
}
