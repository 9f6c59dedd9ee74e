use crate::core::utils::geometry::{centroid, distance};
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use thiserror::Error;

const SVD_EPSILON: f64 = 1e-12;
const SVD_MAX_ITERATIONS: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("Point sets differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    #[error("Cannot align empty point sets")]
    Empty,
    #[error("Singular value decomposition did not converge")]
    SvdFailed,
    #[error("Alignment produced a non-finite result")]
    NonFinite,
}

impl AlignmentError {
    /// Numerical failures may be downgraded to a sentinel score; the
    /// remaining variants signal inconsistent inputs.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::SvdFailed | Self::NonFinite)
    }
}

/// The optimal rigid-body transform carrying point set A onto point set B.
#[derive(Debug, Clone, PartialEq)]
pub struct Superposition {
    pub centroid_a: Point3<f64>,
    pub centroid_b: Point3<f64>,
    pub rotation: Rotation3<f64>,
    /// RMSD between transformed A and B.
    pub rmsd: f64,
}

impl Superposition {
    /// Computes the least-squares superposition of `a` onto `b` (Kabsch).
    ///
    /// Points are paired by index. The rotation is a proper one; reflections
    /// are corrected by flipping the axis of the smallest singular value.
    ///
    /// # Errors
    ///
    /// Returns [`AlignmentError`] on mismatched or empty inputs, if the SVD does
    /// not converge, or if any intermediate value is not finite.
    pub fn compute(a: &[Point3<f64>], b: &[Point3<f64>]) -> Result<Self, AlignmentError> {
        if a.len() != b.len() {
            return Err(AlignmentError::LengthMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        let (Some(centroid_a), Some(centroid_b)) = (centroid(a), centroid(b)) else {
            return Err(AlignmentError::Empty);
        };

        let covariance = a
            .iter()
            .zip(b)
            .fold(Matrix3::zeros(), |acc: Matrix3<f64>, (pa, pb)| {
                acc + (pa - centroid_a) * (pb - centroid_b).transpose()
            });
        if !covariance.iter().all(|v| v.is_finite()) {
            return Err(AlignmentError::NonFinite);
        }

        let svd = covariance
            .try_svd(true, true, SVD_EPSILON, SVD_MAX_ITERATIONS)
            .ok_or(AlignmentError::SvdFailed)?;
        let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
            return Err(AlignmentError::SvdFailed);
        };

        let v = v_t.transpose();
        let mut correction = Vector3::repeat(1.0);
        if (v * u.transpose()).determinant() < 0.0 {
            correction[svd.singular_values.imin()] = -1.0;
        }
        let matrix = v * Matrix3::from_diagonal(&correction) * u.transpose();
        if !matrix.iter().all(|v| v.is_finite()) {
            return Err(AlignmentError::NonFinite);
        }

        let mut superposition = Self {
            centroid_a,
            centroid_b,
            rotation: Rotation3::from_matrix_unchecked(matrix),
            rmsd: 0.0,
        };
        let sum_sq: f64 = a
            .iter()
            .zip(b)
            .map(|(pa, pb)| (superposition.transform(pa) - pb).norm_squared())
            .sum();
        superposition.rmsd = (sum_sq / a.len() as f64).sqrt();
        if !superposition.rmsd.is_finite() {
            return Err(AlignmentError::NonFinite);
        }
        Ok(superposition)
    }

    /// Maps one point: p ↦ R(p − cA) + cB.
    pub fn transform(&self, point: &Point3<f64>) -> Point3<f64> {
        self.centroid_b + self.rotation * (point - self.centroid_a)
    }

    /// Applies the transform to a companion point set.
    pub fn apply(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.transform(p)).collect()
    }
}

/// RMS deviation between the intramolecular distance sets of two conformers.
///
/// For every pair i<j the difference |dA(i,j) − dB(i,j)| is taken; the result
/// is the root of the mean squared difference. This needs no superposition and
/// is invariant to rigid motion of either set. Fewer than two points give 0.
pub fn internal_distance_deviation(
    a: &[Point3<f64>],
    b: &[Point3<f64>],
) -> Result<f64, AlignmentError> {
    if a.len() != b.len() {
        return Err(AlignmentError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let n = a.len();
    if n < 2 {
        return Ok(0.0);
    }

    let mut sum_sq = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let diff = distance(&a[i], &a[j]) - distance(&b[i], &b[j]);
            sum_sq += diff * diff;
        }
    }
    let pairs = (n * (n - 1) / 2) as f64;
    Ok((sum_sq / pairs).sqrt())
}
