use deepmatch::{estimate_homography, warp_into_reference, DeepMatchError, RansacParams};
use image::{Rgb, RgbImage};
use nalgebra::{Matrix3, Vector3};

fn apply(h: &Matrix3<f64>, p: [f32; 2]) -> [f32; 2] {
    let v = h * Vector3::new(p[0] as f64, p[1] as f64, 1.0);
    [(v.x / v.z) as f32, (v.y / v.z) as f32]
}

fn grid(step: usize, count: usize) -> Vec<[f32; 2]> {
    let mut pts = Vec::with_capacity(count * count);
    for row in 0..count {
        for col in 0..count {
            pts.push([(col * step) as f32, (row * step) as f32]);
        }
    }
    pts
}

#[test]
fn fewer_than_four_points_is_not_an_error() {
    let pts = vec![[0.0f32, 0.0], [10.0, 0.0], [0.0, 10.0]];
    let result = estimate_homography(&pts, &pts, &RansacParams::default()).unwrap();
    assert!(result.is_none());
}

#[test]
fn mismatched_lengths_are_rejected() {
    let pts_a = vec![[0.0f32, 0.0]; 4];
    let pts_b = vec![[0.0f32, 0.0]; 3];
    let err = estimate_homography(&pts_a, &pts_b, &RansacParams::default())
        .err()
        .unwrap();
    assert_eq!(err, DeepMatchError::PointLengthMismatch { left: 4, right: 3 });
}

#[test]
fn recovers_known_projective_map() {
    let truth = Matrix3::new(1.1, 0.02, 5.0, -0.03, 0.97, -8.0, 1e-4, -5e-5, 1.0);
    let pts_a = grid(100, 6);
    let pts_b: Vec<[f32; 2]> = pts_a.iter().map(|&p| apply(&truth, p)).collect();

    let estimate = estimate_homography(&pts_a, &pts_b, &RansacParams::default())
        .unwrap()
        .expect("exact correspondences must produce a model");

    assert_eq!(estimate.inliers.len(), pts_a.len());
    for r in 0..3 {
        for c in 0..3 {
            let expected = truth[(r, c)];
            let got = estimate.matrix[(r, c)];
            assert!(
                (got - expected).abs() <= 1e-3 * expected.abs().max(1.0),
                "entry ({r},{c}): expected {expected}, got {got}"
            );
        }
    }
}

#[test]
fn tolerates_outlier_contamination() {
    let truth = Matrix3::new(0.95, -0.01, 12.0, 0.02, 1.05, -4.0, 2e-5, 1e-5, 1.0);
    let pts_a = grid(80, 6);
    let mut pts_b: Vec<[f32; 2]> = pts_a.iter().map(|&p| apply(&truth, p)).collect();

    // Corrupt every fourth pair well beyond the inlier threshold.
    for (i, p) in pts_b.iter_mut().enumerate() {
        if i % 4 == 0 {
            p[0] += 250.0 + i as f32;
            p[1] -= 180.0;
        }
    }
    let clean = pts_a.len() - pts_a.len().div_ceil(4);

    let estimate = estimate_homography(&pts_a, &pts_b, &RansacParams::default())
        .unwrap()
        .expect("a quarter of outliers must not break consensus");

    assert!(
        estimate.inliers.len() >= clean,
        "expected at least {clean} inliers, got {}",
        estimate.inliers.len()
    );
    for r in 0..3 {
        for c in 0..3 {
            let expected = truth[(r, c)];
            let got = estimate.matrix[(r, c)];
            assert!(
                (got - expected).abs() <= 1e-2 * expected.abs().max(1.0),
                "entry ({r},{c}): expected {expected}, got {got}"
            );
        }
    }
}

#[test]
fn collinear_points_yield_no_model() {
    let pts: Vec<[f32; 2]> = (0..12).map(|i| [i as f32, 2.0 * i as f32]).collect();
    let result = estimate_homography(&pts, &pts, &RansacParams::default()).unwrap();
    assert!(result.is_none());
}

#[test]
fn minimal_four_point_solve_is_accepted() {
    let pts_a = vec![[0.0f32, 0.0], [100.0, 0.0], [100.0, 100.0], [0.0, 100.0]];
    let truth = Matrix3::new(1.0, 0.0, 15.0, 0.0, 1.0, -7.0, 0.0, 0.0, 1.0);
    let pts_b: Vec<[f32; 2]> = pts_a.iter().map(|&p| apply(&truth, p)).collect();

    let estimate = estimate_homography(&pts_a, &pts_b, &RansacParams::default())
        .unwrap()
        .expect("four exact corners must solve");
    assert_eq!(estimate.inliers.len(), 4);
}

#[test]
fn warp_preserves_dimensions_and_transparency() {
    let target = RgbImage::from_fn(100, 80, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 40])
    });
    // Reference pixel (x, y) samples target pixel (x + 30, y).
    let shift = Matrix3::new(1.0, 0.0, 30.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);

    let warped = warp_into_reference(&target, &shift, 100, 80);
    assert_eq!(warped.dimensions(), (100, 80));

    let mapped = warped.get_pixel(0, 0);
    assert_eq!(mapped.0, [30, 0, 40, 255]);

    // x = 75 projects to 105, outside the 100-wide target.
    let unmapped = warped.get_pixel(75, 10);
    assert_eq!(unmapped.0[3], 0);
}
