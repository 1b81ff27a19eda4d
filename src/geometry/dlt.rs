//! Direct linear transform solver for the homography.

use std::cmp::Ordering;

use nalgebra::{DMatrix, Matrix3, SymmetricEigen};

/// Hartley normalization: translate points to their centroid and scale so
/// the mean distance from the origin is sqrt(2).
fn normalization(points: &[[f64; 2]]) -> Option<Matrix3<f64>> {
    let count = points.len() as f64;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for p in points {
        cx += p[0];
        cy += p[1];
    }
    cx /= count;
    cy /= count;

    let mut mean_dist = 0.0;
    for p in points {
        mean_dist += ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt();
    }
    mean_dist /= count;
    if mean_dist < 1e-12 {
        return None;
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    Some(Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0))
}

fn apply_similarity(t: &Matrix3<f64>, p: [f64; 2]) -> [f64; 2] {
    [t[(0, 0)] * p[0] + t[(0, 2)], t[(1, 1)] * p[1] + t[(1, 2)]]
}

/// Solves `b ~ H a` for four or more correspondences.
///
/// Returns `None` when the linear system does not pin down a unique
/// projective map (coincident or collinear configurations).
pub(crate) fn homography_dlt(a: &[[f64; 2]], b: &[[f64; 2]]) -> Option<Matrix3<f64>> {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    if n < 4 {
        return None;
    }

    let ta = normalization(a)?;
    let tb = normalization(b)?;

    let mut system = DMatrix::<f64>::zeros(2 * n, 9);
    for (i, (pa, pb)) in a.iter().zip(b).enumerate() {
        let [x, y] = apply_similarity(&ta, *pa);
        let [u, v] = apply_similarity(&tb, *pb);
        let r = 2 * i;
        system[(r, 0)] = -x;
        system[(r, 1)] = -y;
        system[(r, 2)] = -1.0;
        system[(r, 6)] = u * x;
        system[(r, 7)] = u * y;
        system[(r, 8)] = u;
        system[(r + 1, 3)] = -x;
        system[(r + 1, 4)] = -y;
        system[(r + 1, 5)] = -1.0;
        system[(r + 1, 6)] = v * x;
        system[(r + 1, 7)] = v * y;
        system[(r + 1, 8)] = v;
    }

    // Null vector of the 2n x 9 system via the 9x9 normal matrix; its
    // eigenvalues are the squared singular values, so the rank checks below
    // work on squared magnitudes.
    let normal = system.transpose() * &system;
    let eigen = SymmetricEigen::new(normal);
    let mut order: Vec<usize> = (0..9).collect();
    order.sort_by(|&i, &j| {
        eigen.eigenvalues[i]
            .partial_cmp(&eigen.eigenvalues[j])
            .unwrap_or(Ordering::Equal)
    });

    let largest = eigen.eigenvalues[order[8]];
    if largest < 1e-12 {
        return None;
    }
    // A unique solution needs exactly one (near-)zero eigenvalue.
    if eigen.eigenvalues[order[1]] / largest < 1e-14 {
        return None;
    }

    let h = eigen.eigenvectors.column(order[0]);
    let normalized = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);

    let tb_inv = tb.try_inverse()?;
    let mut matrix = tb_inv * normalized * ta;
    let scale = matrix[(2, 2)];
    if scale.abs() > 1e-12 {
        matrix /= scale;
    }
    Some(matrix)
}
