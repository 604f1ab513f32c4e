use ndarray::{Array1, Array2, Axis};
use panelrs::{stats, Error, GroupByConfig, ParallelGroupBy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_keys(rng: &mut StdRng, n: usize, distinct: i64) -> Vec<i64> {
    (0..n).map(|_| rng.random_range(0..distinct)).collect()
}

#[test]
fn test_layout_partitions_rows() {
    let mut rng = StdRng::seed_from_u64(7);
    for &(n, distinct) in &[(1usize, 1i64), (50, 3), (500, 40), (2000, 2000)] {
        let keys = random_keys(&mut rng, n, distinct);
        let groupby = ParallelGroupBy::new(&keys);
        let layout = groupby.layout();

        // every row appears exactly once
        let mut seen = vec![0usize; n];
        for cell in layout.index_matrix().iter().flatten() {
            seen[*cell] += 1;
        }
        assert!(seen.iter().all(|&c| c == 1));

        // rows in a group share a key and keep their original order
        for row in layout.index_matrix().outer_iter() {
            let members: Vec<usize> = row.iter().flatten().copied().collect();
            assert!(!members.is_empty());
            assert!(members.iter().all(|&r| keys[r] == keys[members[0]]));
            assert!(members.windows(2).all(|w| w[0] < w[1]));
            // padding only on the right
            let present = row.iter().take_while(|c| c.is_some()).count();
            assert_eq!(present, members.len());
        }

        assert_eq!(layout.group_sizes().iter().sum::<usize>(), n);
        assert_eq!(
            layout.group_sizes().iter().max().copied().unwrap_or(0),
            groupby.width()
        );
    }
}

#[test]
fn test_split_revert_round_trip() {
    let mut rng = StdRng::seed_from_u64(11);
    let keys = random_keys(&mut rng, 1000, 25);
    let values: Array1<f64> = (0..1000).map(|_| rng.random_range(-100.0..100.0)).collect();

    let groupby = ParallelGroupBy::new(&keys);
    let grouped = groupby.split(&values).unwrap();
    assert_eq!(grouped.dim(), groupby.shape());

    // padded cells hold NaN and nothing else does
    for (pad, v) in groupby.padding_mask().iter().zip(grouped.iter()) {
        assert_eq!(*pad, v.is_nan());
    }

    let reverted = groupby.revert(&grouped, "values").unwrap();
    assert_eq!(reverted, values);
}

#[test]
fn test_parallel_layout_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(3);
    let keys: Vec<f64> = (0..20_000)
        .map(|_| rng.random_range(0..300) as f64 * 0.25)
        .collect();
    let sequential = ParallelGroupBy::with_config(
        &keys,
        &GroupByConfig {
            parallel_sort_threshold: usize::MAX,
        },
    );
    let parallel = ParallelGroupBy::with_config(
        &keys,
        &GroupByConfig {
            parallel_sort_threshold: 1,
        },
    );
    assert_eq!(
        sequential.layout().inverse_index(),
        parallel.layout().inverse_index()
    );
    assert_eq!(sequential.boundaries(), parallel.boundaries());
}

#[test]
fn test_group_reduction_broadcast_back() {
    // 2 groups: {0, 2, 4} and {1, 3}
    let keys = [5, 9, 5, 9, 5];
    let values = Array1::from(vec![1.0, 10.0, 2.0, 30.0, f64::NAN]);
    let groupby = ParallelGroupBy::new(&keys);

    let grouped = groupby.split(&values).unwrap();
    let sums = stats::nansum(&grouped, Axis(1));
    assert_eq!(sums.to_vec(), vec![3.0, 40.0]);

    let broadcast = &groupby.create(1.0, None).unwrap() * &sums.insert_axis(Axis(1));
    let per_row = groupby.revert(&broadcast, "group_sum").unwrap();
    assert_eq!(per_row.to_vec(), vec![3.0, 40.0, 3.0, 40.0, 3.0]);
}

#[test]
fn test_group_count_via_create() {
    let keys = [1u32, 1, 2, 3, 3, 3];
    let groupby = ParallelGroupBy::new(&keys);
    let ones = groupby.create(1.0f64, None).unwrap();
    let counts = stats::nansum(&ones, Axis(1));
    assert_eq!(counts.to_vec(), vec![2.0, 1.0, 3.0]);
}

#[test]
fn test_revert_shape_mismatch() {
    let keys = [0, 1, 0, 1, 1];
    let groupby = ParallelGroupBy::new(&keys);
    let (groups, width) = groupby.shape();

    let wrong = Array2::<f64>::zeros((groups, width + 1));
    match groupby.revert(&wrong, "factor") {
        Err(Error::ShapeMismatch {
            label,
            expected,
            actual,
        }) => {
            assert_eq!(label, "factor");
            assert_eq!(expected, vec![groups, width]);
            assert_eq!(actual, vec![groups, width + 1]);
        }
        other => panic!("expected ShapeMismatch, got {:?}", other),
    }

    let pair = ndarray::Array3::<f64>::zeros((groups, width, 2));
    let err = groupby.revert(&pair, "factor").unwrap_err();
    assert!(err.is_multiple_outputs());
    assert!(err.to_string().contains("select one"));
}

#[test]
fn test_integer_values_rejected() {
    let groupby = ParallelGroupBy::new(&[0, 1]);
    let err = groupby.split(&Array1::from(vec![1i32, 2])).unwrap_err();
    assert!(err.to_string().contains("int32"));
}

#[test]
fn test_empty_keys() {
    let keys: Vec<i64> = Vec::new();
    let groupby = ParallelGroupBy::new(&keys);
    assert!(groupby.is_empty());
    assert_eq!(groupby.shape(), (1, 0));
    let grouped = groupby.split(&Array1::<f64>::zeros(0)).unwrap();
    assert_eq!(grouped.shape(), &[1, 0]);
    let reverted = groupby.revert(&grouped, "empty").unwrap();
    assert!(reverted.is_empty());
}
