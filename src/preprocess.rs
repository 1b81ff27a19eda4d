//! Image preprocessing for the extractor network.
//!
//! The extractor consumes a fixed-resolution RGB tensor. Input images are
//! resized with preserved aspect ratio and padded bottom-right with zeros to
//! the network resolution (letterbox), then scaled to `[0, 1]` in NCHW
//! layout. [`PreprocessTransform`] keeps the bookkeeping needed to map
//! coordinates produced on the network input back to pixels of the original
//! image.

use image::{imageops, RgbImage};
use ndarray::Array4;

use crate::util::{DeepMatchError, DeepMatchResult};

/// Maps coordinates from the network input space back to the original image.
///
/// The extractor reports keypoints normalized to `[-1, 1]` over the input
/// canvas; [`denormalize`](Self::denormalize) undoes both that normalization
/// and the letterbox resize in one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessTransform {
    orig_width: u32,
    orig_height: u32,
    input_width: u32,
    input_height: u32,
    resize_scale: f32,
}

impl PreprocessTransform {
    /// Builds the transform for an `orig_width x orig_height` image
    /// letterboxed into an `input_width x input_height` canvas.
    pub fn new(
        orig_width: u32,
        orig_height: u32,
        input_width: u32,
        input_height: u32,
    ) -> DeepMatchResult<Self> {
        if orig_width == 0 || orig_height == 0 {
            return Err(DeepMatchError::InvalidImage {
                reason: "zero-sized image",
            });
        }
        if input_width == 0 || input_height == 0 {
            return Err(DeepMatchError::InvalidImage {
                reason: "zero-sized network input",
            });
        }
        let resize_scale = (input_height as f32 / orig_height as f32)
            .min(input_width as f32 / orig_width as f32);
        Ok(Self {
            orig_width,
            orig_height,
            input_width,
            input_height,
            resize_scale,
        })
    }

    /// Original image width in pixels.
    pub fn orig_width(&self) -> u32 {
        self.orig_width
    }

    /// Original image height in pixels.
    pub fn orig_height(&self) -> u32 {
        self.orig_height
    }

    /// Network input width in pixels.
    pub fn input_width(&self) -> u32 {
        self.input_width
    }

    /// Network input height in pixels.
    pub fn input_height(&self) -> u32 {
        self.input_height
    }

    /// Ratio applied when resizing the original into the input canvas.
    pub fn resize_scale(&self) -> f32 {
        self.resize_scale
    }

    /// Maps a point in input-canvas pixels to original-image pixels.
    pub fn to_original(&self, x: f32, y: f32) -> [f32; 2] {
        [x / self.resize_scale, y / self.resize_scale]
    }

    /// Maps a keypoint from the network's normalized `[-1, 1]` space to
    /// original-image pixels.
    pub fn denormalize(&self, kx: f32, ky: f32) -> [f32; 2] {
        let px = (kx + 1.0) * 0.5 * self.input_width as f32;
        let py = (ky + 1.0) * 0.5 * self.input_height as f32;
        self.to_original(px, py)
    }
}

/// Resizes and normalizes `image` into an NCHW `(1, 3, input_height,
/// input_width)` tensor together with the transform that undoes the resize.
///
/// The image is scaled by `min(input_height/h, input_width/w)` with bilinear
/// filtering, pasted into the top-left corner of a zero-filled canvas and
/// divided by 255. Fails on zero-sized input.
pub fn preprocess(
    image: &RgbImage,
    input_width: u32,
    input_height: u32,
) -> DeepMatchResult<(Array4<f32>, PreprocessTransform)> {
    let (width, height) = image.dimensions();
    let transform = PreprocessTransform::new(width, height, input_width, input_height)?;

    let scale = transform.resize_scale();
    let new_width = ((width as f32 * scale) as u32).max(1);
    let new_height = ((height as f32 * scale) as u32).max(1);
    let resized = imageops::resize(image, new_width, new_height, imageops::FilterType::Triangle);

    let mut tensor = Array4::<f32>::zeros((1, 3, input_height as usize, input_width as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            tensor[[0, channel, y as usize, x as usize]] = pixel.0[channel] as f32 / 255.0;
        }
    }

    Ok((tensor, transform))
}
