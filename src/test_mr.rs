use std::cmp::Ordering;
use std::thread;

use crate::mr::{self, Config, Error, IntermediateEmitter, KeyValue, MRApp, OutputEmitter};
use crate::mrapps::wc::WC;
use crate::mrrt::sequential;

/// Emits the pairs carried by each input item verbatim and sums per key.
struct Sum;

impl MRApp for Sum {
    type K1 = usize;
    type V1 = Vec<(&'static str, u32)>;
    type K2 = &'static str;
    type V2 = u32;
    type K3 = &'static str;
    type V3 = u32;

    fn map(&self, _: &usize, pairs: &Self::V1, emit: &mut IntermediateEmitter<'_, &'static str, u32>) {
        for &(k, v) in pairs {
            emit.emit(k, v);
        }
    }

    fn reduce(&self, key: &&'static str, values: &[u32], emit: &mut OutputEmitter<&'static str, u32>) {
        emit.emit(*key, values.iter().sum());
    }
}

fn items(pairs: Vec<Vec<(&'static str, u32)>>) -> Vec<KeyValue<usize, Vec<(&'static str, u32)>>> {
    pairs
        .into_iter()
        .enumerate()
        .map(|(i, p)| KeyValue::new(i, p))
        .collect()
}

#[test]
fn test_groups_and_sums_by_key() {
    let input = items(vec![vec![("a", 1), ("b", 0), ("a", 1)]]);
    let res = mr::run(&Sum, &input, Config::new(1).retain_intermediates()).unwrap();

    let groups = res.intermediates.unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0], KeyValue::new("a", vec![1, 1]));
    assert_eq!(groups[1], KeyValue::new("b", vec![0]));
    assert_eq!(res.output, vec![KeyValue::new("a", 2), KeyValue::new("b", 0)]);
}

#[test]
fn test_intermediates_released_by_default() {
    let input = items(vec![vec![("a", 1)]]);
    let res = mr::run(&Sum, &input, Config::new(2)).unwrap();
    assert!(res.intermediates.is_none());
    assert_eq!(res.output, vec![KeyValue::new("a", 1)]);
}

#[test]
fn test_empty_input() {
    let res = mr::run(&Sum, &[], Config::new(4)).unwrap();
    assert!(res.output.is_empty());
    assert_eq!(res.stats.intermediate_pairs, 0);
    assert_eq!(res.stats.groups, 0);
    assert_eq!(res.stats.peak_pending_pairs, 0);
}

#[test]
fn test_map_that_never_emits() {
    let input = items(vec![vec![], vec![], vec![]]);
    let res = mr::run(&Sum, &input, Config::new(3)).unwrap();
    assert!(res.output.is_empty());
}

#[test]
fn test_zero_threads_rejected() {
    let input = items(vec![vec![("a", 1)]]);
    assert!(matches!(
        mr::run(&Sum, &input, Config::new(0)),
        Err(Error::NoThreads { role: "map" })
    ));
}

#[test]
fn test_at_most_one_pair_in_flight() {
    let keys = ["k0", "k1", "k2", "k3", "k4", "k5", "k6"];
    let input = items(
        (0..200)
            .map(|i| (0..5).map(|j| (keys[(i + j) % keys.len()], 1)).collect())
            .collect(),
    );
    let res = mr::run(&Sum, &input, Config::new(8).with_chunk_size(3)).unwrap();
    assert_eq!(res.stats.peak_pending_pairs, 1);
    assert_eq!(res.stats.intermediate_pairs, 1000);
    assert_eq!(res.stats.groups, keys.len());
    let total: u32 = res.output.iter().map(|kv| kv.value).sum();
    assert_eq!(total, 1000);
}

#[test]
fn test_every_pair_grouped_once() {
    let input = items(
        (0..57)
            .map(|i| vec![("x", i), ("y", i * 2), ("x", 1)])
            .collect(),
    );
    let res = mr::run(
        &Sum,
        &input,
        Config::new(5).with_reduce_threads(2).with_chunk_size(4).retain_intermediates(),
    )
    .unwrap();
    let groups = res.intermediates.unwrap();
    let grouped: usize = groups.iter().map(|g| g.value.len()).sum();
    assert_eq!(grouped, 57 * 3);
    assert_eq!(grouped, res.stats.intermediate_pairs);
    let x: u32 = (0..57).sum::<u32>() + 57;
    let y: u32 = (0..57).map(|i| i * 2).sum();
    assert_eq!(res.output, vec![KeyValue::new("x", x), KeyValue::new("y", y)]);
}

/// Emits one output pair per value, to check output cardinality.
struct Explode;

impl MRApp for Explode {
    type K1 = u32;
    type V1 = ();
    type K2 = u32;
    type V2 = u32;
    type K3 = u32;
    type V3 = u32;

    fn map(&self, n: &u32, _: &(), emit: &mut IntermediateEmitter<'_, u32, u32>) {
        for i in 0..*n {
            emit.emit(n % 3, i);
        }
    }

    fn reduce(&self, key: &u32, values: &[u32], emit: &mut OutputEmitter<u32, u32>) {
        for v in values {
            emit.emit(*key, *v);
        }
    }
}

#[test]
fn test_output_cardinality_matches_emissions() {
    let input: Vec<_> = (1..=20).map(|n| KeyValue::new(n, ())).collect();
    let res = mr::run(&Explode, &input, Config::new(4).with_reduce_threads(3)).unwrap();
    assert_eq!(res.output.len(), (1..=20).sum::<u32>() as usize);
    assert_eq!(res.stats.output_pairs, res.output.len());
    assert!(res.output.windows(2).all(|w| w[0].key <= w[1].key));
}

#[derive(Debug, Clone)]
struct Name {
    text: String,
    origin: usize,
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

struct Names;

impl MRApp for Names {
    type K1 = usize;
    type V1 = &'static str;
    type K2 = Name;
    type V2 = usize;
    type K3 = String;
    type V3 = usize;

    fn map(&self, origin: &usize, text: &&'static str, emit: &mut IntermediateEmitter<'_, Name, usize>) {
        emit.emit(
            Name {
                text: text.to_string(),
                origin: *origin,
            },
            *origin,
        );
    }

    fn reduce(&self, key: &Name, values: &[usize], emit: &mut OutputEmitter<String, usize>) {
        emit.emit(key.text.clone(), values.len());
    }
}

#[test]
fn test_value_equal_keys_share_a_group() {
    let input = vec![
        KeyValue::new(0, "dup"),
        KeyValue::new(1, "dup"),
        KeyValue::new(2, "solo"),
    ];
    // one map thread keeps arrival order deterministic
    let res = mr::run(&Names, &input, Config::new(1).retain_intermediates()).unwrap();
    let groups = res.intermediates.unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key.text, "dup");
    assert_eq!(groups[0].key.origin, 0);
    assert_eq!(groups[0].value, vec![0, 1]);
    assert_eq!(
        res.output,
        vec![KeyValue::new("dup".to_string(), 2), KeyValue::new("solo".to_string(), 1)]
    );
}

struct Faulty;

impl MRApp for Faulty {
    type K1 = u32;
    type V1 = ();
    type K2 = u32;
    type V2 = u32;
    type K3 = u32;
    type V3 = u32;

    fn map(&self, n: &u32, _: &(), emit: &mut IntermediateEmitter<'_, u32, u32>) {
        if *n == 13 {
            panic!("boom on item {}", n);
        }
        emit.emit(*n, *n);
    }

    fn reduce(&self, key: &u32, _: &[u32], emit: &mut OutputEmitter<u32, u32>) {
        emit.emit(*key, 0);
    }
}

#[test]
#[should_panic(expected = "boom on item 13")]
fn test_map_panic_propagates_to_caller() {
    let input: Vec<_> = (0..40).map(|n| KeyValue::new(n, ())).collect();
    let _ = mr::run(&Faulty, &input, Config::new(4).with_chunk_size(2));
}

#[test]
fn test_wc_matches_sequential() {
    let input = WC::input([
        ("a", "It was the best of times, it was the worst of times"),
        ("b", "it was the age of wisdom, it was the age of foolishness"),
        ("c", "it was the epoch of belief"),
    ]);
    let expected = sequential::run(&WC, &input);
    for threads in [1, 2, 7] {
        let res = mr::run(&WC, &input, Config::new(threads).with_chunk_size(1)).unwrap();
        assert_eq!(res.output, expected);
    }
}

#[test]
fn test_independent_runs_in_parallel() {
    let input = items((0..30).map(|i| vec![("a", i), ("b", 1)]).collect());
    let expected = vec![KeyValue::new("a", (0..30).sum()), KeyValue::new("b", 30)];
    thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| mr::run(&Sum, &input, Config::new(3)).unwrap().output))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}
