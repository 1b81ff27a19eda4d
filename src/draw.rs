//! Match visualization helpers.

use image::{imageops, Rgb, RgbImage, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::util::{DeepMatchError, DeepMatchResult};

/// Color ramp from red (score 0) to green (score 1).
fn score_color(score: f32) -> Rgb<u8> {
    let s = score.clamp(0.0, 1.0);
    Rgb([(255.0 * (1.0 - s)) as u8, (255.0 * s) as u8, 0])
}

/// Draws both images side by side with a marker per matched keypoint and a
/// line per pair, colored by confidence.
///
/// Purely presentational: the composite is `wa+wb` wide and `max(ha, hb)`
/// tall, with the target drawn to the right of the reference.
pub fn draw_matches(
    img_a: &RgbImage,
    img_b: &RgbImage,
    pts_a: &[[f32; 2]],
    pts_b: &[[f32; 2]],
    scores: &[f32],
) -> DeepMatchResult<RgbImage> {
    if img_a.width() == 0 || img_a.height() == 0 || img_b.width() == 0 || img_b.height() == 0 {
        return Err(DeepMatchError::InvalidImage {
            reason: "zero-sized image",
        });
    }
    if pts_a.len() != pts_b.len() {
        return Err(DeepMatchError::PointLengthMismatch {
            left: pts_a.len(),
            right: pts_b.len(),
        });
    }
    if pts_a.len() != scores.len() {
        return Err(DeepMatchError::PointLengthMismatch {
            left: pts_a.len(),
            right: scores.len(),
        });
    }

    let width = img_a.width() + img_b.width();
    let height = img_a.height().max(img_b.height());
    let mut canvas = RgbImage::new(width, height);
    imageops::replace(&mut canvas, img_a, 0, 0);
    imageops::replace(&mut canvas, img_b, i64::from(img_a.width()), 0);

    let offset = img_a.width() as f32;
    for ((pa, pb), &score) in pts_a.iter().zip(pts_b).zip(scores) {
        let color = score_color(score);
        draw_line_segment_mut(
            &mut canvas,
            (pa[0], pa[1]),
            (pb[0] + offset, pb[1]),
            color,
        );
        draw_filled_circle_mut(&mut canvas, (pa[0] as i32, pa[1] as i32), 2, color);
        draw_filled_circle_mut(
            &mut canvas,
            ((pb[0] + offset) as i32, pb[1] as i32),
            2,
            color,
        );
    }
    Ok(canvas)
}

/// Composes the matches panel and the warped target into one report image,
/// the warped panel rendered over black to the right.
pub fn render_result(matches_panel: &RgbImage, warped: &RgbaImage) -> RgbImage {
    let width = matches_panel.width() + warped.width();
    let height = matches_panel.height().max(warped.height());
    let mut canvas = RgbImage::new(width, height);
    imageops::replace(&mut canvas, matches_panel, 0, 0);
    for (x, y, pixel) in warped.enumerate_pixels() {
        let alpha = pixel.0[3] as u16;
        let rgb = Rgb([
            ((pixel.0[0] as u16 * alpha) / 255) as u8,
            ((pixel.0[1] as u16 * alpha) / 255) as u8,
            ((pixel.0[2] as u16 * alpha) / 255) as u8,
        ]);
        canvas.put_pixel(matches_panel.width() + x, y, rgb);
    }
    canvas
}
