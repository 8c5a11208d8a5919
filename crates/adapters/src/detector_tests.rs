use super::*;
use std::path::Path;

#[test]
fn null_detector_returns_nothing() {
    let d = NullDetector;
    assert!(d.scan(&[Path::new("/models")]).is_empty());
}
