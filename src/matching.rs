//! Learned feature matching between two feature sets.

use std::path::Path;

use ndarray::{Array3, Axis, Ix1, Ix2};
use ort::session::Session;

use crate::features::FeatureSet;
use crate::session::{load_session, runtime_error, squeeze_batch};
use crate::trace::{trace_event, trace_span};
use crate::util::{DeepMatchError, DeepMatchResult};

/// Raw matcher output: index pairs into the two keypoint lists plus the
/// network's confidence per pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchIndices {
    /// `[index into A, index into B]` per accepted match.
    pub pairs: Vec<[usize; 2]>,
    /// Confidence per pair, index-aligned with `pairs`.
    pub scores: Vec<f32>,
}

/// Matched keypoint coordinates mapped to each image's original pixel space.
///
/// All three sequences share the same length and correspond index-for-index:
/// `points_a[i]` in the reference image matches `points_b[i]` in the target
/// with confidence `scores[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    /// Matched coordinates in the reference image, original pixels.
    pub points_a: Vec<[f32; 2]>,
    /// Matched coordinates in the target image, original pixels.
    pub points_b: Vec<[f32; 2]>,
    /// Match confidence per pair.
    pub scores: Vec<f32>,
}

impl MatchResult {
    /// Number of matched pairs.
    pub fn len(&self) -> usize {
        self.points_a.len()
    }

    /// Whether the matcher accepted no pairs at all.
    pub fn is_empty(&self) -> bool {
        self.points_a.is_empty()
    }
}

/// Pretrained matching network behind an ONNX Runtime session.
///
/// The graph consumes `kpts0`/`kpts1`/`desc0`/`desc1` (batched keypoint
/// coordinates and descriptors for both images) and produces, in graph
/// order, accepted index pairs `(K, 2)` and their confidences `(K,)`. The
/// network's own mutual/confidence gating decides what counts as a match;
/// `min_score` adds an optional filter on top and defaults to off.
pub struct Matcher {
    session: Session,
    output_names: Vec<String>,
    min_score: Option<f32>,
}

impl Matcher {
    /// Loads the matcher graph from `path`.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        intra_threads: usize,
        min_score: Option<f32>,
    ) -> DeepMatchResult<Self> {
        let path = path.as_ref();
        let session = load_session(path, intra_threads)?;
        let output_names: Vec<String> = session
            .outputs
            .iter()
            .map(|output| output.name.clone())
            .collect();
        if output_names.len() < 2 {
            return Err(DeepMatchError::ModelLoad {
                path: path.display().to_string(),
                reason: format!(
                    "expected matches/scores outputs, graph declares {}",
                    output_names.len()
                ),
            });
        }
        Ok(Self {
            session,
            output_names,
            min_score,
        })
    }

    /// Correlates two feature sets in one forward pass.
    ///
    /// Matching is not guaranteed symmetric: swapping the argument order may
    /// produce a different pair set. Pairs whose index is negative (the
    /// network's "unmatched" marker) are dropped; remaining indices are
    /// validated against both keypoint lists. Empty feature sets
    /// short-circuit to an empty result without running the network.
    pub fn match_features(
        &self,
        a: &FeatureSet,
        b: &FeatureSet,
    ) -> DeepMatchResult<MatchIndices> {
        let _span = trace_span!("match_features", left = a.len(), right = b.len()).entered();
        if a.is_empty() || b.is_empty() {
            return Ok(MatchIndices::default());
        }

        let kpts0 = batched_keypoints(a);
        let kpts1 = batched_keypoints(b);
        let desc0 = a.descriptors().clone().insert_axis(Axis(0));
        let desc1 = b.descriptors().clone().insert_axis(Axis(0));

        let inputs = ort::inputs![
            "kpts0" => kpts0.view(),
            "kpts1" => kpts1.view(),
            "desc0" => desc0.view(),
            "desc1" => desc1.view(),
        ]
        .map_err(runtime_error)?;
        let outputs = self.session.run(inputs).map_err(runtime_error)?;

        let pair_view = outputs[self.output_names[0].as_str()]
            .try_extract_tensor::<i64>()
            .map_err(runtime_error)?;
        let pair_matrix = squeeze_batch(pair_view, 2)
            .into_dimensionality::<Ix2>()
            .map_err(|_| DeepMatchError::MalformedOutput {
                reason: "matches: expected a 2-d tensor".to_string(),
            })?;
        if pair_matrix.ncols() != 2 {
            return Err(DeepMatchError::MalformedOutput {
                reason: format!("matches: expected 2 columns, got {}", pair_matrix.ncols()),
            });
        }

        let score_view = outputs[self.output_names[1].as_str()]
            .try_extract_tensor::<f32>()
            .map_err(runtime_error)?;
        let score_vector = squeeze_batch(score_view, 1).into_dimensionality::<Ix1>().map_err(|_| {
            DeepMatchError::MalformedOutput {
                reason: "match scores: expected a 1-d tensor".to_string(),
            }
        })?;
        if pair_matrix.nrows() != score_vector.len() {
            return Err(DeepMatchError::MalformedOutput {
                reason: format!(
                    "match scores: {} scores for {} pairs",
                    score_vector.len(),
                    pair_matrix.nrows()
                ),
            });
        }

        let mut result = MatchIndices::default();
        for (row, &score) in pair_matrix.outer_iter().zip(score_vector.iter()) {
            let (left, right) = (row[0], row[1]);
            if left < 0 || right < 0 {
                continue;
            }
            let (left, right) = (left as usize, right as usize);
            if left >= a.len() || right >= b.len() {
                return Err(DeepMatchError::MalformedOutput {
                    reason: format!(
                        "match index ({left}, {right}) out of range for {}x{} keypoints",
                        a.len(),
                        b.len()
                    ),
                });
            }
            if let Some(bound) = self.min_score {
                if score <= bound {
                    continue;
                }
            }
            result.pairs.push([left, right]);
            result.scores.push(score);
        }

        trace_event!("matched", pairs = result.pairs.len());
        Ok(result)
    }
}

fn batched_keypoints(set: &FeatureSet) -> Array3<f32> {
    let mut kpts = Array3::<f32>::zeros((1, set.len(), 2));
    for (i, kp) in set.keypoints().iter().enumerate() {
        kpts[[0, i, 0]] = kp[0];
        kpts[[0, i, 1]] = kp[1];
    }
    kpts
}
