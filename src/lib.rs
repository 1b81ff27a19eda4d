//! DeepMatch runs a pretrained keypoint/descriptor network and a learned
//! feature matcher, both consumed as ONNX graphs, over pairs of images.
//!
//! The pipeline letterboxes each image to the network resolution, extracts
//! keypoints and descriptors, correlates the two feature sets with the
//! matcher network and maps matched coordinates back to original pixels.
//! Reference images can be registered once as named templates so repeated
//! matching against the same reference skips the extraction pass. Matched
//! pairs feed an optional RANSAC homography stage that warps the target
//! into the reference frame, plus side-by-side match rendering.

pub mod draw;
pub mod features;
pub mod geometry;
pub mod io;
pub mod matching;
pub mod pipeline;
pub mod preprocess;
pub mod template;
pub mod util;

mod session;
mod trace;

pub use draw::{draw_matches, render_result};
pub use features::{Extractor, FeatureSet};
pub use geometry::{estimate_homography, warp_into_reference, Homography, RansacParams};
pub use matching::{MatchIndices, MatchResult, Matcher};
pub use pipeline::{MatchSource, Model, ModelConfig};
pub use preprocess::{preprocess, PreprocessTransform};
pub use template::{TemplateCache, TemplateEntry};
pub use util::{DeepMatchError, DeepMatchResult};
