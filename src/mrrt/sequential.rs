use std::collections::BTreeMap;

use crate::mr::{IntermediateEmitter, KeyValue, MRApp, OutputEmitter};

/// Runs `app` over `input` on the calling thread.
///
/// Produces the same output as the threaded engine for deterministic apps.
pub fn run<A: MRApp>(app: &A, input: &[KeyValue<A::K1, A::V1>]) -> Vec<KeyValue<A::K3, A::V3>> {
    let mut intermediate = vec![];
    {
        let mut emit = IntermediateEmitter::local(&mut intermediate);
        for item in input {
            app.map(&item.key, &item.value, &mut emit);
        }
    }

    let mut groups: BTreeMap<A::K2, Vec<A::V2>> = BTreeMap::new();
    for kv in intermediate {
        groups.entry(kv.key).or_default().push(kv.value);
    }

    let mut emit = OutputEmitter::new();
    for (key, values) in &groups {
        app.reduce(key, values, &mut emit);
    }
    let mut out = emit.into_pairs();
    out.sort_by(|a, b| a.key.cmp(&b.key));
    out
}
