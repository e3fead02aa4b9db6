use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::KeyValue;
use super::sync::{MapProgress, Semaphore};
use crate::util::lock;

/// Single-slot rendezvous between map workers and the shuffle worker.
///
/// The gate admits one emission at a time and is re-opened only after the
/// shuffle worker has grouped that pair, so at most one emitted pair is ever
/// waiting to be grouped.
pub(crate) struct Handoff<K, V> {
    gate: Semaphore,
    pending: Semaphore,
    buffers: Vec<Mutex<VecDeque<KeyValue<K, V>>>>,
    stopped: AtomicBool,
}

impl<K, V> Handoff<K, V> {
    pub(crate) fn new(workers: usize) -> Self {
        Handoff {
            gate: Semaphore::new("emit gate", 1),
            pending: Semaphore::new("pending pairs", 0),
            buffers: (0..workers).map(|_| Mutex::new(VecDeque::new())).collect(),
            stopped: AtomicBool::new(false),
        }
    }

    pub(crate) fn emitter(&self, worker: usize) -> IntermediateEmitter<'_, K, V> {
        IntermediateEmitter {
            sink: Sink::Handoff {
                handoff: self,
                worker,
            },
            emitted: 0,
        }
    }

    /// Pairs published by emitters and not yet taken by the shuffle worker.
    pub(crate) fn pending(&self) -> usize {
        self.pending.value()
    }

    /// Asks the shuffle worker to exit once it next wakes.
    ///
    /// Only call once no emitter can publish anymore.
    pub(crate) fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.pending.release();
    }

    fn buffered(&self) -> usize {
        self.buffers
            .iter()
            .map(|b| lock(b, "lock emit buffer").len())
            .sum()
    }

    fn take_next(&self) -> Option<KeyValue<K, V>> {
        self.buffers
            .iter()
            .find_map(|b| lock(b, "lock emit buffer").pop_front())
    }
}

/// Publishes intermediate pairs from inside [`super::MRApp::map`].
pub struct IntermediateEmitter<'a, K, V> {
    sink: Sink<'a, K, V>,
    emitted: usize,
}

enum Sink<'a, K, V> {
    Handoff { handoff: &'a Handoff<K, V>, worker: usize },
    Local(&'a mut Vec<KeyValue<K, V>>),
}

impl<'a, K, V> IntermediateEmitter<'a, K, V> {
    /// Emitter appending straight to `pairs`, for runtimes without a shuffle worker.
    pub(crate) fn local(pairs: &'a mut Vec<KeyValue<K, V>>) -> Self {
        IntermediateEmitter {
            sink: Sink::Local(pairs),
            emitted: 0,
        }
    }

    /// Blocks until the shuffle worker has absorbed the previous emission.
    pub fn emit(&mut self, key: K, value: V) {
        match &mut self.sink {
            Sink::Handoff { handoff, worker } => {
                handoff.gate.acquire();
                lock(&handoff.buffers[*worker], "lock emit buffer").push_back(KeyValue { key, value });
                handoff.pending.release();
            }
            Sink::Local(pairs) => pairs.push(KeyValue { key, value }),
        }
        self.emitted += 1;
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

pub(crate) struct Shuffled<K, V> {
    pub(crate) groups: BTreeMap<K, Vec<V>>,
    pub(crate) pairs: usize,
    pub(crate) peak_pending: usize,
}

impl<K: Ord, V> Shuffled<K, V> {
    fn absorb(&mut self, pair: KeyValue<K, V>) {
        // an equal key already in the map keeps its slot; this one is dropped here
        self.groups.entry(pair.key).or_default().push(pair.value);
        self.pairs += 1;
    }
}

/// Body of the shuffle worker: group pairs by key until stopped.
pub(crate) fn shuffle<K: Ord, V>(handoff: &Handoff<K, V>, progress: &MapProgress) -> Shuffled<K, V> {
    let mut shuffled = Shuffled {
        groups: BTreeMap::new(),
        pairs: 0,
        peak_pending: 0,
    };

    loop {
        handoff.pending.acquire();
        if handoff.stopped.load(Ordering::Acquire) {
            break;
        }
        shuffled.peak_pending = shuffled.peak_pending.max(handoff.buffered());
        if let Some(pair) = handoff.take_next() {
            shuffled.absorb(pair);
        }
        handoff.gate.release();
        progress.poke();
    }

    // the pending count drops when the last pair's token is taken, before that
    // pair leaves its buffer, so stop can overtake it
    while let Some(pair) = handoff.take_next() {
        log::debug!("shuffle drained a pair after stop");
        shuffled.absorb(pair);
    }
    shuffled
}
