//! ONNX Runtime session loading and tensor plumbing shared by the network
//! wrappers.

use std::path::Path;

use ndarray::{ArrayViewD, Axis};
use ort::session::{builder::GraphOptimizationLevel, Session};

use crate::util::{DeepMatchError, DeepMatchResult};

/// Builds a session for the graph at `path`.
///
/// One session is created per model file and owned by the wrapper that loads
/// it; there is no process-wide session state.
pub(crate) fn load_session(path: &Path, intra_threads: usize) -> DeepMatchResult<Session> {
    Session::builder()
        .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
        .and_then(|builder| builder.with_intra_threads(intra_threads))
        .and_then(|builder| builder.commit_from_file(path))
        .map_err(|err| DeepMatchError::ModelLoad {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
}

/// Maps a runtime failure during a forward pass.
pub(crate) fn runtime_error(err: ort::Error) -> DeepMatchError {
    DeepMatchError::Inference {
        reason: err.to_string(),
    }
}

/// Drops a leading batch axis of size 1 when the view exceeds the expected
/// rank.
///
/// Exported graphs differ in whether they keep the batch axis on outputs;
/// both conventions are accepted.
pub(crate) fn squeeze_batch<T>(view: ArrayViewD<'_, T>, expected_ndim: usize) -> ArrayViewD<'_, T> {
    if view.ndim() > expected_ndim && view.shape()[0] == 1 {
        view.index_axis_move(Axis(0), 0)
    } else {
        view
    }
}
