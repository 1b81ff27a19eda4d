//! Homography estimation and perspective warping.
//!
//! Matched point pairs feed a normalized DLT solver inside a seeded RANSAC
//! loop; the accepted model is refit on its full inlier set. Estimation
//! failure (too few pairs, degenerate geometry, not enough consensus) is an
//! expected outcome and is reported as `Ok(None)` rather than an error.

mod dlt;
mod warp;

pub use warp::warp_into_reference;

use nalgebra::{Matrix3, Vector3};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::trace::{trace_event, trace_span};
use crate::util::{DeepMatchError, DeepMatchResult};

/// Robust estimation settings for [`estimate_homography`].
#[derive(Debug, Clone, PartialEq)]
pub struct RansacParams {
    /// Maximum sampling iterations.
    pub max_iterations: usize,
    /// Reprojection error bound in pixels for counting a pair as an inlier.
    pub inlier_threshold: f64,
    /// Minimum inlier count for a model to be accepted.
    pub min_inliers: usize,
    /// Seed for the sampling RNG; a fixed seed keeps runs reproducible.
    pub seed: u64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            inlier_threshold: 5.0,
            min_inliers: 4,
            seed: 0,
        }
    }
}

/// Projective transform mapping reference-image pixels to target-image
/// pixels, together with the indices of the pairs that support it.
#[derive(Debug, Clone, PartialEq)]
pub struct Homography {
    /// The 3x3 matrix, scaled so the bottom-right entry is 1 when possible.
    pub matrix: Matrix3<f64>,
    /// Indices into the input point sequences that agree with the model.
    pub inliers: Vec<usize>,
}

/// Estimates a homography from matched point pairs.
///
/// `pts_a` and `pts_b` correspond index-for-index; mismatched lengths are a
/// usage error. Fewer than four pairs, a degenerate configuration (e.g.
/// collinear points) or insufficient consensus under `params` yield
/// `Ok(None)`.
pub fn estimate_homography(
    pts_a: &[[f32; 2]],
    pts_b: &[[f32; 2]],
    params: &RansacParams,
) -> DeepMatchResult<Option<Homography>> {
    if pts_a.len() != pts_b.len() {
        return Err(DeepMatchError::PointLengthMismatch {
            left: pts_a.len(),
            right: pts_b.len(),
        });
    }
    let n = pts_a.len();
    let required = params.min_inliers.max(4);
    if n < required {
        return Ok(None);
    }

    let _span = trace_span!("estimate_homography", pairs = n).entered();

    let a: Vec<[f64; 2]> = pts_a.iter().map(|p| [p[0] as f64, p[1] as f64]).collect();
    let b: Vec<[f64; 2]> = pts_b.iter().map(|p| [p[0] as f64, p[1] as f64]).collect();

    let mut best_inliers: Vec<usize> = Vec::new();
    if n == 4 {
        let Some(matrix) = dlt::homography_dlt(&a, &b) else {
            return Ok(None);
        };
        best_inliers = inlier_indices(&matrix, &a, &b, params.inlier_threshold);
    } else {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.seed);
        for _ in 0..params.max_iterations {
            let pick = sample(&mut rng, n, 4);
            let sample_a: Vec<[f64; 2]> = pick.iter().map(|i| a[i]).collect();
            let sample_b: Vec<[f64; 2]> = pick.iter().map(|i| b[i]).collect();
            let Some(matrix) = dlt::homography_dlt(&sample_a, &sample_b) else {
                continue;
            };
            let inliers = inlier_indices(&matrix, &a, &b, params.inlier_threshold);
            if inliers.len() > best_inliers.len() {
                best_inliers = inliers;
            }
        }
    }

    if best_inliers.len() < required {
        return Ok(None);
    }

    // Refit on the full consensus set for the final model.
    let refit_a: Vec<[f64; 2]> = best_inliers.iter().map(|&i| a[i]).collect();
    let refit_b: Vec<[f64; 2]> = best_inliers.iter().map(|&i| b[i]).collect();
    let Some(matrix) = dlt::homography_dlt(&refit_a, &refit_b) else {
        return Ok(None);
    };
    let inliers = inlier_indices(&matrix, &a, &b, params.inlier_threshold);
    if inliers.len() < required {
        return Ok(None);
    }

    trace_event!("homography", inliers = inliers.len());
    Ok(Some(Homography { matrix, inliers }))
}

/// Applies `matrix` to a point, returning `None` when it maps to infinity.
pub(crate) fn project(matrix: &Matrix3<f64>, p: [f64; 2]) -> Option<[f64; 2]> {
    let v = matrix * Vector3::new(p[0], p[1], 1.0);
    if v.z.abs() < 1e-12 {
        return None;
    }
    Some([v.x / v.z, v.y / v.z])
}

fn inlier_indices(
    matrix: &Matrix3<f64>,
    a: &[[f64; 2]],
    b: &[[f64; 2]],
    threshold: f64,
) -> Vec<usize> {
    let threshold_sq = threshold * threshold;
    a.iter()
        .zip(b)
        .enumerate()
        .filter_map(|(i, (pa, pb))| {
            let projected = project(matrix, *pa)?;
            let dx = projected[0] - pb[0];
            let dy = projected[1] - pb[1];
            (dx * dx + dy * dy <= threshold_sq).then_some(i)
        })
        .collect()
}
