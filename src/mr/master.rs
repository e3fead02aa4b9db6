use std::fmt;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::{Duration, Instant};

use super::chunk::ChunkDispenser;
use super::shuffle::{self, Handoff};
use super::sync::MapProgress;
use super::worker::{MapWorker, ReduceWorker};
use super::{Config, Error, Group, KeyValue, MRApp};
use crate::util::OrFatal;

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    MapAndShuffleRunning,
    ShuffleDraining,
    ReduceRunning,
    Collecting,
    Done,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::MapAndShuffleRunning => "MapAndShuffleRunning",
            Self::ShuffleDraining => "ShuffleDraining",
            Self::ReduceRunning => "ReduceRunning",
            Self::Collecting => "Collecting",
            Self::Done => "Done",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Pairs emitted by map callbacks, all of which were grouped.
    pub intermediate_pairs: usize,
    /// Distinct intermediate keys.
    pub groups: usize,
    pub output_pairs: usize,
    /// Most emitted-but-ungrouped pairs the shuffle worker ever saw at once.
    pub peak_pending_pairs: usize,
    pub map_shuffle_elapsed: Duration,
    pub reduce_elapsed: Duration,
}

pub struct RunOutput<A: MRApp> {
    /// Output pairs sorted ascending by key; equal keys keep reduce worker order.
    pub output: Vec<KeyValue<A::K3, A::V3>>,
    /// Grouped intermediate pairs in key order, present only when the run
    /// was configured to retain them.
    pub intermediates: Option<Vec<Group<A::K2, A::V2>>>,
    pub stats: RunStats,
}

/// Drives one map/shuffle/reduce run over borrowed input.
///
/// All shared state lives in the stack frame of [`Master::run`] and is handed
/// to the workers by reference, so independent runs never interfere.
pub struct Master<'a, A: MRApp> {
    app: &'a A,
    config: Config,
}

impl<'a, A: MRApp> Master<'a, A> {
    pub fn new(app: &'a A, config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Master { app, config })
    }

    pub fn run(&self, input: &[KeyValue<A::K1, A::V1>]) -> RunOutput<A> {
        let config = &self.config;
        let mut phase = Phase::Init;
        let started = Instant::now();
        log::info!(
            "map reduce started with {} map threads and {} reduce threads over {} items",
            config.map_threads,
            config.reduce_threads,
            input.len()
        );

        let map_chunks = ChunkDispenser::new(input.len(), config.chunk_size);
        let handoff = Handoff::new(config.map_threads);
        let progress = MapProgress::default();
        let map_worker = MapWorker {
            app: self.app,
            input,
            chunks: &map_chunks,
            handoff: &handoff,
            progress: &progress,
        };

        let (shuffled, emitted) = thread::scope(|s| {
            let shuffler = spawn_worker(s, "shuffle".to_string(), || {
                shuffle::shuffle(&handoff, &progress)
            });
            let map_worker = &map_worker;
            let mappers: Vec<_> = (0..config.map_threads)
                .map(|id| spawn_worker(s, format!("map-{}", id), move || map_worker.run(id)))
                .collect();
            advance(&mut phase, Phase::MapAndShuffleRunning);

            progress.wait_drained(config.map_threads, || handoff.pending());
            advance(&mut phase, Phase::ShuffleDraining);
            handoff.stop();

            let shuffled = join_worker(shuffler);
            let emitted: usize = mappers.into_iter().map(join_worker).sum();
            (shuffled, emitted)
        });
        debug_assert_eq!(emitted, shuffled.pairs);

        let map_shuffle_elapsed = started.elapsed();
        log::info!("map and shuffle took {}ns", map_shuffle_elapsed.as_nanos());

        let intermediate_pairs = shuffled.pairs;
        let peak_pending_pairs = shuffled.peak_pending;
        let groups: Vec<Group<A::K2, A::V2>> = shuffled
            .groups
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect();

        advance(&mut phase, Phase::ReduceRunning);
        let reduce_started = Instant::now();
        let reduce_chunks = ChunkDispenser::new(groups.len(), config.chunk_size);
        let reduce_worker = ReduceWorker {
            app: self.app,
            groups: &groups,
            chunks: &reduce_chunks,
        };
        let buffers = thread::scope(|s| {
            let reduce_worker = &reduce_worker;
            let reducers: Vec<_> = (0..config.reduce_threads)
                .map(|id| spawn_worker(s, format!("reduce-{}", id), move || reduce_worker.run()))
                .collect();
            reducers.into_iter().map(join_worker).collect::<Vec<_>>()
        });

        advance(&mut phase, Phase::Collecting);
        let output = collect(buffers);
        let reduce_elapsed = reduce_started.elapsed();
        log::info!("reduce took {}ns", reduce_elapsed.as_nanos());

        let stats = RunStats {
            intermediate_pairs,
            groups: groups.len(),
            output_pairs: output.len(),
            peak_pending_pairs,
            map_shuffle_elapsed,
            reduce_elapsed,
        };
        let intermediates = if config.release_intermediates {
            drop(groups);
            None
        } else {
            Some(groups)
        };

        advance(&mut phase, Phase::Done);
        debug_assert!(phase.is_final());
        log::info!(
            "map reduce finished: {} intermediate pairs in {} groups, {} output pairs",
            stats.intermediate_pairs,
            stats.groups,
            stats.output_pairs
        );
        RunOutput {
            output,
            intermediates,
            stats,
        }
    }
}

fn advance(phase: &mut Phase, next: Phase) {
    log::debug!("phase {} -> {}", phase, next);
    *phase = next;
}

fn spawn_worker<'scope, T, F>(
    scope: &'scope Scope<'scope, '_>,
    name: String,
    f: F,
) -> ScopedJoinHandle<'scope, T>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    let label = name.clone();
    thread::Builder::new()
        .name(name)
        .spawn_scoped(scope, move || {
            log::info!("worker {} created", label);
            let _lifecycle = Lifecycle(label);
            f()
        })
        .or_fatal("spawn worker thread")
}

/// Logs a worker's termination when dropped, including while unwinding.
struct Lifecycle(String);

impl Drop for Lifecycle {
    fn drop(&mut self) {
        log::info!("worker {} terminated", self.0);
    }
}

/// Joins a worker, re-raising a panic from user code on the calling thread.
fn join_worker<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(res) => res,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Concatenates per-worker buffers and stable-sorts them by key.
fn collect<K: Ord, V>(buffers: Vec<Vec<KeyValue<K, V>>>) -> Vec<KeyValue<K, V>> {
    let mut out: Vec<_> = buffers.into_iter().flatten().collect();
    out.sort_by(|a, b| a.key.cmp(&b.key));
    out
}
