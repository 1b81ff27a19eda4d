//! Top-level two-image matching pipeline.
//!
//! [`Model`] owns one session per network plus the template cache and wires
//! the stages together: preprocess → extract (or template lookup) → match →
//! map coordinates back to original pixels. Geometry and drawing helpers
//! hang off the same handle for convenience.
//!
//! Every call is synchronous and blocks until its forward pass completes;
//! callers wanting concurrent batches run independent model instances or
//! serialize calls themselves.

use image::{RgbImage, RgbaImage};

use crate::draw;
use crate::features::{Extractor, FeatureSet};
use crate::geometry::{self, Homography, RansacParams};
use crate::matching::{MatchResult, Matcher};
use crate::preprocess::{preprocess, PreprocessTransform};
use crate::template::{TemplateCache, TemplateEntry};
use crate::trace::{trace_event, trace_span};
use crate::util::DeepMatchResult;

/// The reference side of a matching call: a fresh image or a registered
/// template key.
#[derive(Debug, Clone, Copy)]
pub enum MatchSource<'a> {
    /// Extract features from this image.
    Image(&'a RgbImage),
    /// Reuse features cached under this key.
    Template(&'a str),
}

impl<'a> From<&'a RgbImage> for MatchSource<'a> {
    fn from(image: &'a RgbImage) -> Self {
        Self::Image(image)
    }
}

impl<'a> From<&'a str> for MatchSource<'a> {
    fn from(key: &'a str) -> Self {
        Self::Template(key)
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Network input width in pixels, fixed at model export time.
    pub input_width: u32,
    /// Network input height in pixels.
    pub input_height: u32,
    /// Drop matches whose confidence is not strictly above this bound;
    /// `None` keeps everything the matcher network itself accepted.
    pub min_score: Option<f32>,
    /// Threads given to each ONNX Runtime session.
    pub intra_threads: usize,
    /// Robust estimation settings for [`Model::estimate_and_warp`].
    pub ransac: RansacParams,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input_width: 640,
            input_height: 640,
            min_score: None,
            intra_threads: 4,
            ransac: RansacParams::default(),
        }
    }
}

/// Two-network matching pipeline with a template cache.
pub struct Model {
    extractor: Extractor,
    matcher: Matcher,
    templates: TemplateCache,
    config: ModelConfig,
}

impl Model {
    /// Loads both networks with default settings.
    pub fn from_files<P, Q>(extractor_path: P, matcher_path: Q) -> DeepMatchResult<Self>
    where
        P: AsRef<std::path::Path>,
        Q: AsRef<std::path::Path>,
    {
        Self::with_config(extractor_path, matcher_path, ModelConfig::default())
    }

    /// Loads both networks with explicit settings.
    ///
    /// Fails fast when either model file is missing or malformed.
    pub fn with_config<P, Q>(
        extractor_path: P,
        matcher_path: Q,
        config: ModelConfig,
    ) -> DeepMatchResult<Self>
    where
        P: AsRef<std::path::Path>,
        Q: AsRef<std::path::Path>,
    {
        let extractor = Extractor::from_file(extractor_path, config.intra_threads)?;
        let matcher = Matcher::from_file(matcher_path, config.intra_threads, config.min_score)?;
        Ok(Self {
            extractor,
            matcher,
            templates: TemplateCache::new(),
            config,
        })
    }

    /// The settings this model was built with.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Extracts features for `image` and caches them under `key`, replacing
    /// any previous registration.
    pub fn register_template(&self, key: &str, image: &RgbImage) -> DeepMatchResult<()> {
        let _span = trace_span!("register_template", key = key).entered();
        let (features, transform) = self.extract_fresh(image)?;
        self.templates.insert(key, TemplateEntry { features, transform });
        Ok(())
    }

    /// Number of registered templates.
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Matches the reference side against `target`, returning matched point
    /// pairs mapped to each image's original pixel space.
    ///
    /// The reference features come from the cache when `source` is a
    /// template key (an unregistered key is an error) and from a fresh
    /// extraction otherwise; target features are always computed fresh.
    pub fn infer(&self, source: MatchSource<'_>, target: &RgbImage) -> DeepMatchResult<MatchResult> {
        let _span = trace_span!("infer").entered();
        let (features_a, transform_a) = match source {
            MatchSource::Image(image) => self.extract_fresh(image)?,
            MatchSource::Template(key) => {
                let entry = self.templates.lookup(key)?;
                (entry.features.clone(), entry.transform)
            }
        };
        let (features_b, transform_b) = self.extract_fresh(target)?;

        let indices = self.matcher.match_features(&features_a, &features_b)?;
        trace_event!("matches", count = indices.pairs.len());

        let mut result = MatchResult {
            points_a: Vec::with_capacity(indices.pairs.len()),
            points_b: Vec::with_capacity(indices.pairs.len()),
            scores: Vec::with_capacity(indices.pairs.len()),
        };
        for (pair, &score) in indices.pairs.iter().zip(&indices.scores) {
            let ka = features_a.keypoints()[pair[0]];
            let kb = features_b.keypoints()[pair[1]];
            result.points_a.push(transform_a.denormalize(ka[0], ka[1]));
            result.points_b.push(transform_b.denormalize(kb[0], kb[1]));
            result.scores.push(score);
        }
        Ok(result)
    }

    /// Estimates a homography from `result` without warping.
    ///
    /// `Ok(None)` means no consistent model exists — expected for weak
    /// overlap or degenerate matches, not an error.
    pub fn estimate_homography(&self, result: &MatchResult) -> DeepMatchResult<Option<Homography>> {
        geometry::estimate_homography(&result.points_a, &result.points_b, &self.config.ransac)
    }

    /// Estimates a homography from `result` and warps `target` into the
    /// reference frame, sized like `reference`, unmapped pixels transparent.
    pub fn estimate_and_warp(
        &self,
        reference: &RgbImage,
        target: &RgbImage,
        result: &MatchResult,
    ) -> DeepMatchResult<Option<RgbaImage>> {
        let Some(h) = self.estimate_homography(result)? else {
            return Ok(None);
        };
        Ok(Some(geometry::warp_into_reference(
            target,
            &h.matrix,
            reference.width(),
            reference.height(),
        )))
    }

    /// Renders the side-by-side match visualization for `result`.
    pub fn draw_matches(
        &self,
        img_a: &RgbImage,
        img_b: &RgbImage,
        result: &MatchResult,
    ) -> DeepMatchResult<RgbImage> {
        draw::draw_matches(img_a, img_b, &result.points_a, &result.points_b, &result.scores)
    }

    /// Composes the match visualization and the warped target into one
    /// report image. The warped panel is omitted when geometry fails.
    pub fn render_result(
        &self,
        reference: &RgbImage,
        target: &RgbImage,
        result: &MatchResult,
    ) -> DeepMatchResult<RgbImage> {
        let panel = self.draw_matches(reference, target, result)?;
        match self.estimate_and_warp(reference, target, result)? {
            Some(warped) => Ok(draw::render_result(&panel, &warped)),
            None => Ok(panel),
        }
    }

    fn extract_fresh(
        &self,
        image: &RgbImage,
    ) -> DeepMatchResult<(FeatureSet, PreprocessTransform)> {
        let (tensor, transform) =
            preprocess(image, self.config.input_width, self.config.input_height)?;
        let features = self.extractor.extract(&tensor)?;
        Ok((features, transform))
    }
}
