//! Perspective resampling of the target image into the reference frame.

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use nalgebra::Matrix3;

use super::project;

/// Resamples `target` through `matrix` (reference pixels → target pixels)
/// into an `out_width x out_height` image.
///
/// Each output pixel takes the bilinearly interpolated target value at its
/// projection; pixels whose projection falls outside the target stay fully
/// transparent.
pub fn warp_into_reference(
    target: &RgbImage,
    matrix: &Matrix3<f64>,
    out_width: u32,
    out_height: u32,
) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(out_width, out_height, Rgba([0, 0, 0, 0]));
    for y in 0..out_height {
        for x in 0..out_width {
            let Some(src) = project(matrix, [x as f64, y as f64]) else {
                continue;
            };
            let Some(Rgb(rgb)) = sample_bilinear(target, src[0] as f32, src[1] as f32) else {
                continue;
            };
            out.put_pixel(x, y, Rgba([rgb[0], rgb[1], rgb[2], 255]));
        }
    }
    out
}

fn sample_bilinear(img: &RgbImage, x: f32, y: f32) -> Option<Rgb<u8>> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    if x < 0.0 || y < 0.0 || x > (width - 1) as f32 || y > (height - 1) as f32 {
        return None;
    }

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let mut rgb = [0u8; 3];
    for channel in 0..3 {
        let p00 = img.get_pixel(x0, y0).0[channel] as f32;
        let p10 = img.get_pixel(x1, y0).0[channel] as f32;
        let p01 = img.get_pixel(x0, y1).0[channel] as f32;
        let p11 = img.get_pixel(x1, y1).0[channel] as f32;
        let top = p00 + (p10 - p00) * fx;
        let bottom = p01 + (p11 - p01) * fx;
        rgb[channel] = (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgb(rgb))
}
