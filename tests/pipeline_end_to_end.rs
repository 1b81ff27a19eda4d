//! End-to-end run over real model files.
//!
//! Needs the exported extractor and matcher graphs plus two overlapping
//! photos of a planar scene. Point the environment variables at them and
//! run with `--ignored`:
//!
//! ```text
//! DEEPMATCH_EXTRACTOR=aliked.onnx DEEPMATCH_MATCHER=lightglue.onnx \
//! DEEPMATCH_IMAGE_A=a.jpg DEEPMATCH_IMAGE_B=b.jpg cargo test -- --ignored
//! ```

use deepmatch::io::load_rgb_image;
use deepmatch::{MatchSource, Model};

fn asset(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} must point at a test asset"))
}

#[test]
#[ignore = "needs model files and sample images"]
fn planar_scene_matches_and_warps() {
    let model = Model::from_files(asset("DEEPMATCH_EXTRACTOR"), asset("DEEPMATCH_MATCHER"))
        .expect("models must load");
    let img_a = load_rgb_image(asset("DEEPMATCH_IMAGE_A")).unwrap();
    let img_b = load_rgb_image(asset("DEEPMATCH_IMAGE_B")).unwrap();

    let result = model.infer(MatchSource::Image(&img_a), &img_b).unwrap();
    assert!(!result.is_empty());
    assert_eq!(result.points_a.len(), result.points_b.len());
    assert_eq!(result.points_a.len(), result.scores.len());

    // Matching is not symmetric; only the result shapes are guaranteed.
    let reverse = model.infer(MatchSource::Image(&img_b), &img_a).unwrap();
    assert_eq!(reverse.points_a.len(), reverse.points_b.len());
    assert_eq!(reverse.points_a.len(), reverse.scores.len());

    let warped = model
        .estimate_and_warp(&img_a, &img_b, &result)
        .unwrap()
        .expect("a planar scene with real overlap must align");
    assert_eq!(warped.dimensions(), img_a.dimensions());

    // The template path must reproduce direct extraction exactly.
    model.register_template("ref", &img_a).unwrap();
    assert_eq!(model.template_count(), 1);
    let cached = model.infer(MatchSource::Template("ref"), &img_b).unwrap();
    assert_eq!(cached.points_a, result.points_a);
    assert_eq!(cached.points_b, result.points_b);
    assert_eq!(cached.scores, result.scores);
}
