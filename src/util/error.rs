//! Error types for deepmatch.

use thiserror::Error;

/// Result alias for deepmatch operations.
pub type DeepMatchResult<T> = std::result::Result<T, DeepMatchError>;

/// Errors that can occur when running the matching pipeline.
///
/// Homography estimation failure is deliberately not represented here: a
/// degenerate point configuration is an expected outcome and is reported as
/// `Ok(None)` by the geometry routines.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeepMatchError {
    /// The input image cannot be preprocessed.
    #[error("invalid image: {reason}")]
    InvalidImage { reason: &'static str },
    /// A model file is missing or could not be loaded into a session.
    #[error("failed to load model {path}: {reason}")]
    ModelLoad { path: String, reason: String },
    /// The inference runtime failed during a forward pass.
    #[error("inference failed: {reason}")]
    Inference { reason: String },
    /// A network produced output with an unexpected shape or content.
    #[error("unexpected model output: {reason}")]
    MalformedOutput { reason: String },
    /// Keypoints, descriptors and scores must be index-aligned.
    #[error(
        "feature set length mismatch: {keypoints} keypoints, {descriptors} descriptors, {scores} scores"
    )]
    LengthMismatch {
        keypoints: usize,
        descriptors: usize,
        scores: usize,
    },
    /// Two point sequences that must correspond index-for-index differ in length.
    #[error("point sequences differ in length: {left} vs {right}")]
    PointLengthMismatch { left: usize, right: usize },
    /// Lookup of a template key that was never registered.
    #[error("template not registered: {key}")]
    TemplateNotFound { key: String },
    /// Loading or saving an image failed.
    #[error("image i/o error: {reason}")]
    ImageIo { reason: String },
}
