use stereo_features::matching::{KnnMatch, Match};
use stereo_features::threshold::DescriptorThresholds;

fn knn(query_idx: usize, best: f32, second: Option<f32>) -> KnnMatch {
    KnnMatch {
        best: Match {
            query_idx,
            train_idx: query_idx,
            distance: best,
        },
        second: second.map(|distance| Match {
            query_idx,
            train_idx: query_idx + 1,
            distance,
        }),
    }
}

#[test]
fn test_odd_count_is_exact_median() {
    // gaps: 5, 8, 1
    let matches = vec![
        knn(0, 5.0, Some(10.0)),
        knn(1, 1.0, Some(9.0)),
        knn(2, 3.0, Some(4.0)),
    ];
    let th = DescriptorThresholds::estimate(&matches).unwrap();
    assert_eq!(th.nn, 3.0);
    assert_eq!(th.nn12, 5.0);
}

#[test]
fn test_even_count_middle_index() {
    // best distances sorted: 1 2 3 4 -> element 2
    // gaps sorted descending: 7 5 2 1 -> element 2
    let matches = vec![
        knn(0, 4.0, Some(5.0)),
        knn(1, 1.0, Some(8.0)),
        knn(2, 3.0, Some(5.0)),
        knn(3, 2.0, Some(7.0)),
    ];
    let th = DescriptorThresholds::estimate(&matches).unwrap();
    assert_eq!(th.nn, 3.0);
    assert_eq!(th.nn12, 2.0);
}

#[test]
fn test_input_order_does_not_matter() {
    let mut matches = vec![
        knn(0, 12.0, Some(40.0)),
        knn(1, 30.0, Some(31.0)),
        knn(2, 7.0, Some(50.0)),
        knn(3, 18.0, Some(20.0)),
        knn(4, 25.0, Some(60.0)),
    ];
    let th0 = DescriptorThresholds::estimate(&matches).unwrap();
    matches.reverse();
    let th1 = DescriptorThresholds::estimate(&matches).unwrap();
    assert_eq!(th0, th1);
    assert_eq!(th0.nn, 18.0);
    assert_eq!(th0.nn12, 28.0);
}

#[test]
fn test_empty_match_set() {
    assert!(DescriptorThresholds::estimate(&[]).is_none());
}

#[test]
fn test_missing_second_best() {
    let matches = vec![knn(0, 6.0, None), knn(1, 2.0, None), knn(2, 4.0, None)];
    let th = DescriptorThresholds::estimate(&matches).unwrap();
    assert_eq!(th.nn, 4.0);
    assert_eq!(th.nn12, 0.0);

    // only candidates with a runner-up contribute a gap
    let matches = vec![knn(0, 6.0, None), knn(1, 2.0, Some(9.0))];
    let th = DescriptorThresholds::estimate(&matches).unwrap();
    assert_eq!(th.nn12, 7.0);
}

#[test]
fn test_scaled() {
    let th = DescriptorThresholds { nn: 10.0, nn12: 4.0 }.scaled(1.5);
    assert!((th.nn - 15.0).abs() < 1e-12);
    assert!((th.nn12 - 6.0).abs() < 1e-12);
}
