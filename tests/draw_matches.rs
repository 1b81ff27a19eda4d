use deepmatch::{draw_matches, render_result, warp_into_reference, DeepMatchError};
use image::{Rgb, RgbImage};
use nalgebra::Matrix3;

fn make_image(width: u32, height: u32, fill: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(fill))
}

#[test]
fn composite_has_side_by_side_dimensions() {
    let img_a = make_image(120, 90, [10, 10, 10]);
    let img_b = make_image(100, 110, [20, 20, 20]);

    let canvas = draw_matches(&img_a, &img_b, &[], &[], &[]).unwrap();
    assert_eq!(canvas.dimensions(), (220, 110));

    // Source pixels survive the composite; the gap below the shorter image
    // stays black.
    assert_eq!(canvas.get_pixel(5, 5).0, [10, 10, 10]);
    assert_eq!(canvas.get_pixel(130, 5).0, [20, 20, 20]);
    assert_eq!(canvas.get_pixel(5, 100).0, [0, 0, 0]);
}

#[test]
fn high_confidence_match_is_drawn_green() {
    let img_a = make_image(60, 60, [0, 0, 0]);
    let img_b = make_image(60, 60, [0, 0, 0]);

    let canvas = draw_matches(
        &img_a,
        &img_b,
        &[[10.0, 10.0]],
        &[[30.0, 30.0]],
        &[1.0],
    )
    .unwrap();

    // The marker at the reference keypoint takes the score color.
    assert_eq!(canvas.get_pixel(10, 10).0, [0, 255, 0]);
    // The target-side marker is shifted by the reference width.
    assert_eq!(canvas.get_pixel(90, 30).0, [0, 255, 0]);
}

#[test]
fn point_and_score_lengths_must_agree() {
    let img_a = make_image(40, 40, [0, 0, 0]);
    let img_b = make_image(40, 40, [0, 0, 0]);

    let err = draw_matches(&img_a, &img_b, &[[1.0, 1.0]], &[], &[])
        .err()
        .unwrap();
    assert_eq!(err, DeepMatchError::PointLengthMismatch { left: 1, right: 0 });

    let err = draw_matches(&img_a, &img_b, &[[1.0, 1.0]], &[[2.0, 2.0]], &[])
        .err()
        .unwrap();
    assert_eq!(err, DeepMatchError::PointLengthMismatch { left: 1, right: 0 });
}

#[test]
fn zero_sized_inputs_are_rejected() {
    let img_a = RgbImage::new(0, 0);
    let img_b = make_image(40, 40, [0, 0, 0]);
    let err = draw_matches(&img_a, &img_b, &[], &[], &[]).err().unwrap();
    assert_eq!(
        err,
        DeepMatchError::InvalidImage {
            reason: "zero-sized image",
        }
    );
}

#[test]
fn report_image_appends_warped_panel() {
    let panel = make_image(100, 50, [5, 5, 5]);
    let target = make_image(40, 50, [200, 100, 50]);
    let identity = Matrix3::identity();
    let warped = warp_into_reference(&target, &identity, 40, 50);

    let report = render_result(&panel, &warped);
    assert_eq!(report.dimensions(), (140, 50));
    assert_eq!(report.get_pixel(10, 10).0, [5, 5, 5]);
    assert_eq!(report.get_pixel(120, 10).0, [200, 100, 50]);
}
