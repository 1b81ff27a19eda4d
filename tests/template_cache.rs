use deepmatch::{
    DeepMatchError, FeatureSet, PreprocessTransform, TemplateCache, TemplateEntry,
};
use ndarray::Array2;

fn entry(tag: f32) -> TemplateEntry {
    let keypoints = vec![[tag, -tag]];
    let descriptors = Array2::from_elem((1, 4), tag);
    let scores = vec![tag];
    TemplateEntry {
        features: FeatureSet::new(keypoints, descriptors, scores).unwrap(),
        transform: PreprocessTransform::new(640, 480, 640, 640).unwrap(),
    }
}

#[test]
fn lookup_of_unregistered_key_fails() {
    let cache = TemplateCache::new();
    let err = cache.lookup("missing").err().unwrap();
    assert_eq!(
        err,
        DeepMatchError::TemplateNotFound {
            key: "missing".to_string(),
        }
    );
}

#[test]
fn lookup_returns_registered_entry() {
    let cache = TemplateCache::new();
    let stored = entry(0.5);
    cache.insert("t1", stored.clone());

    let found = cache.lookup("t1").unwrap();
    assert_eq!(found.features, stored.features);
    assert_eq!(found.transform, stored.transform);
}

#[test]
fn reregistration_overwrites_previous_entry() {
    let cache = TemplateCache::new();
    cache.insert("t1", entry(1.0));
    cache.insert("t1", entry(2.0));

    let found = cache.lookup("t1").unwrap();
    assert_eq!(found.features.scores(), &[2.0]);
    assert_eq!(cache.len(), 1);
}

#[test]
fn distinct_keys_coexist() {
    let cache = TemplateCache::new();
    assert!(cache.is_empty());

    cache.insert("left", entry(1.0));
    cache.insert("right", entry(2.0));

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.lookup("left").unwrap().features.scores(), &[1.0]);
    assert_eq!(cache.lookup("right").unwrap().features.scores(), &[2.0]);
}
