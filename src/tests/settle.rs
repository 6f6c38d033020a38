use super::SettleDetector;

#[test]
fn test_settles_after_required_stable_samples() {
    let mut detector = SettleDetector::new(0.0, 3);
    for y in [20.0, 35.0, 45.0, 50.0] {
        assert!(!detector.sample(y), "still moving at {y}");
    }
    assert!(!detector.sample(50.0));
    assert!(!detector.sample(50.0));
    assert!(detector.sample(50.0));
}

#[test]
fn test_movement_resets_the_run() {
    let mut detector = SettleDetector::new(100.0, 3);
    assert!(!detector.sample(100.0));
    assert!(!detector.sample(100.4));
    assert_eq!(detector.stable_samples(), 2);

    assert!(!detector.sample(110.0));
    assert_eq!(detector.stable_samples(), 0);
}

#[test]
fn test_one_pixel_creep_counts_as_stable() {
    let mut detector = SettleDetector::new(0.0, 2);
    assert!(!detector.sample(1.0));
    assert!(detector.sample(2.0));
}
