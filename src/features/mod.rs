//! Keypoint/descriptor containers and the extractor network wrapper.

use ndarray::Array2;

use crate::util::{DeepMatchError, DeepMatchResult};

mod extractor;

pub use extractor::Extractor;

/// Keypoints, descriptors and detection scores from one extractor pass.
///
/// The three sequences are index-aligned: `keypoints[i]` is described by
/// `descriptors.row(i)` and scored by `scores[i]`. Keypoint coordinates stay
/// in the network's normalized `[-1, 1]` space; use
/// `PreprocessTransform::denormalize` to recover original-image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    keypoints: Vec<[f32; 2]>,
    descriptors: Array2<f32>,
    scores: Vec<f32>,
}

impl FeatureSet {
    /// Creates a feature set, enforcing the parallel-length invariant.
    pub fn new(
        keypoints: Vec<[f32; 2]>,
        descriptors: Array2<f32>,
        scores: Vec<f32>,
    ) -> DeepMatchResult<Self> {
        if keypoints.len() != descriptors.nrows() || keypoints.len() != scores.len() {
            return Err(DeepMatchError::LengthMismatch {
                keypoints: keypoints.len(),
                descriptors: descriptors.nrows(),
                scores: scores.len(),
            });
        }
        Ok(Self {
            keypoints,
            descriptors,
            scores,
        })
    }

    /// Number of detected keypoints.
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// Whether the extractor found no keypoints at all.
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Keypoint coordinates in normalized `[-1, 1]` space.
    pub fn keypoints(&self) -> &[[f32; 2]] {
        &self.keypoints
    }

    /// Descriptor matrix, one row per keypoint.
    pub fn descriptors(&self) -> &Array2<f32> {
        &self.descriptors
    }

    /// Detection confidence per keypoint.
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Length of a single descriptor vector.
    pub fn descriptor_dim(&self) -> usize {
        self.descriptors.ncols()
    }
}
