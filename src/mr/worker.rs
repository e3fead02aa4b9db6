use super::chunk::ChunkDispenser;
use super::shuffle::Handoff;
use super::sync::{MapProgress, RetireGuard};
use super::{Group, KeyValue, MRApp};

/// Collects output pairs from inside [`MRApp::reduce`].
///
/// Each reduce worker owns its own emitter, so emitting never contends.
pub struct OutputEmitter<K, V> {
    pairs: Vec<KeyValue<K, V>>,
}

impl<K, V> OutputEmitter<K, V> {
    pub(crate) fn new() -> Self {
        OutputEmitter { pairs: Vec::new() }
    }

    pub fn emit(&mut self, key: K, value: V) {
        self.pairs.push(KeyValue { key, value });
    }

    pub fn emitted(&self) -> usize {
        self.pairs.len()
    }

    pub(crate) fn into_pairs(self) -> Vec<KeyValue<K, V>> {
        self.pairs
    }
}

pub(crate) struct MapWorker<'a, A: MRApp> {
    pub(crate) app: &'a A,
    pub(crate) input: &'a [KeyValue<A::K1, A::V1>],
    pub(crate) chunks: &'a ChunkDispenser,
    pub(crate) handoff: &'a Handoff<A::K2, A::V2>,
    pub(crate) progress: &'a MapProgress,
}

impl<A: MRApp> MapWorker<'_, A> {
    /// Maps claimed chunks until the input is exhausted; returns the number of pairs emitted.
    pub(crate) fn run(&self, id: usize) -> usize {
        let _retire = RetireGuard(self.progress);
        let mut emit = self.handoff.emitter(id);
        while let Some(range) = self.chunks.claim() {
            for item in &self.input[range] {
                self.app.map(&item.key, &item.value, &mut emit);
            }
        }
        emit.emitted()
    }
}

pub(crate) struct ReduceWorker<'a, A: MRApp> {
    pub(crate) app: &'a A,
    pub(crate) groups: &'a [Group<A::K2, A::V2>],
    pub(crate) chunks: &'a ChunkDispenser,
}

impl<A: MRApp> ReduceWorker<'_, A> {
    pub(crate) fn run(&self) -> Vec<KeyValue<A::K3, A::V3>> {
        let mut emit = OutputEmitter::new();
        while let Some(range) = self.chunks.claim() {
            for group in &self.groups[range] {
                self.app.reduce(&group.key, &group.value, &mut emit);
            }
        }
        emit.into_pairs()
    }
}
