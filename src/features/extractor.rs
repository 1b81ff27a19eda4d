//! ONNX session wrapper for the keypoint/descriptor network.

use std::path::Path;

use ndarray::{Array2, Array4, ArrayViewD, Ix1, Ix2};
use ort::session::Session;

use super::FeatureSet;
use crate::session::{load_session, runtime_error, squeeze_batch};
use crate::trace::{trace_event, trace_span};
use crate::util::{DeepMatchError, DeepMatchResult};

/// Pretrained keypoint/descriptor network behind an ONNX Runtime session.
///
/// The graph maps an NCHW float image to three outputs, in graph order:
/// keypoint coordinates `(N, 2)` normalized to `[-1, 1]`, descriptors
/// `(N, D)` and detection scores `(N,)`. A leading batch axis of size 1 on
/// any output is accepted and squeezed. Extraction is deterministic for a
/// given graph and input; failures surface immediately without retries.
pub struct Extractor {
    session: Session,
    input_name: String,
    output_names: Vec<String>,
}

impl Extractor {
    /// Loads the extractor graph from `path`.
    pub fn from_file<P: AsRef<Path>>(path: P, intra_threads: usize) -> DeepMatchResult<Self> {
        let path = path.as_ref();
        let session = load_session(path, intra_threads)?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| DeepMatchError::ModelLoad {
                path: path.display().to_string(),
                reason: "graph declares no inputs".to_string(),
            })?;
        let output_names: Vec<String> = session
            .outputs
            .iter()
            .map(|output| output.name.clone())
            .collect();
        if output_names.len() < 3 {
            return Err(DeepMatchError::ModelLoad {
                path: path.display().to_string(),
                reason: format!(
                    "expected keypoints/descriptors/scores outputs, graph declares {}",
                    output_names.len()
                ),
            });
        }
        Ok(Self {
            session,
            input_name,
            output_names,
        })
    }

    /// Runs one forward pass over a preprocessed tensor.
    pub fn extract(&self, tensor: &Array4<f32>) -> DeepMatchResult<FeatureSet> {
        let _span = trace_span!("extract").entered();

        let inputs =
            ort::inputs![self.input_name.as_str() => tensor.view()].map_err(runtime_error)?;
        let outputs = self.session.run(inputs).map_err(runtime_error)?;

        let keypoint_matrix = to_matrix(
            outputs[self.output_names[0].as_str()]
                .try_extract_tensor::<f32>()
                .map_err(runtime_error)?,
            "keypoints",
        )?;
        if keypoint_matrix.ncols() != 2 {
            return Err(DeepMatchError::MalformedOutput {
                reason: format!(
                    "keypoints: expected 2 columns, got {}",
                    keypoint_matrix.ncols()
                ),
            });
        }
        let keypoints: Vec<[f32; 2]> = keypoint_matrix
            .outer_iter()
            .map(|row| [row[0], row[1]])
            .collect();

        let descriptors = to_matrix(
            outputs[self.output_names[1].as_str()]
                .try_extract_tensor::<f32>()
                .map_err(runtime_error)?,
            "descriptors",
        )?;
        let scores = to_vector(
            outputs[self.output_names[2].as_str()]
                .try_extract_tensor::<f32>()
                .map_err(runtime_error)?,
            "scores",
        )?;

        trace_event!("extracted", keypoints = keypoints.len());
        FeatureSet::new(keypoints, descriptors, scores)
    }
}

fn to_matrix(view: ArrayViewD<'_, f32>, name: &str) -> DeepMatchResult<Array2<f32>> {
    squeeze_batch(view, 2)
        .into_dimensionality::<Ix2>()
        .map(|matrix| matrix.to_owned())
        .map_err(|_| DeepMatchError::MalformedOutput {
            reason: format!("{name}: expected a 2-d tensor"),
        })
}

fn to_vector(view: ArrayViewD<'_, f32>, name: &str) -> DeepMatchResult<Vec<f32>> {
    squeeze_batch(view, 1)
        .into_dimensionality::<Ix1>()
        .map(|vector| vector.to_vec())
        .map_err(|_| DeepMatchError::MalformedOutput {
            reason: format!("{name}: expected a 1-d tensor"),
        })
}
