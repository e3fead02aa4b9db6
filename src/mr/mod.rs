//! In-process map/shuffle/reduce engine.
//!
//! A run fans the input out to map worker threads, funnels every emitted
//! intermediate pair through a single shuffle worker that groups them by key,
//! fans the groups out to reduce worker threads and returns their output
//! sorted by key. See [`Master`] for the phase sequencing.

mod chunk;
mod config;
mod error;
mod master;
mod shuffle;
mod sync;
mod worker;

pub use chunk::ChunkDispenser;
pub use config::{Config, DEFAULT_CHUNK_SIZE};
pub use error::Error;
pub use master::{Master, Phase, RunOutput, RunStats};
pub use shuffle::IntermediateEmitter;
pub use worker::OutputEmitter;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyValue<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> KeyValue<K, V> {
    pub fn new(key: K, value: V) -> Self {
        KeyValue { key, value }
    }
}

/// One grouped key with every value emitted for it, in arrival order.
pub type Group<K, V> = KeyValue<K, Vec<V>>;

/// Map and reduce callbacks over three key/value families.
///
/// Level 1 is the input and needs no ordering. Level 2 keys are grouped by
/// their `Ord`; level 3 keys order the final output. Level 2 pairs are shared
/// read-only between reduce workers, hence `Sync`.
pub trait MRApp: Sync {
    type K1: Sync;
    type V1: Sync;
    type K2: Ord + Send + Sync;
    type V2: Send + Sync;
    type K3: Ord + Send;
    type V3: Send;

    fn map(&self, key: &Self::K1, value: &Self::V1, emit: &mut IntermediateEmitter<'_, Self::K2, Self::V2>);

    fn reduce(&self, key: &Self::K2, values: &[Self::V2], emit: &mut OutputEmitter<Self::K3, Self::V3>);
}

/// Validates `config` and runs `app` over `input`.
pub fn run<A: MRApp>(
    app: &A,
    input: &[KeyValue<A::K1, A::V1>],
    config: Config,
) -> Result<RunOutput<A>, Error> {
    Ok(Master::new(app, config)?.run(input))
}
