use crate::mr::{IntermediateEmitter, KeyValue, MRApp, OutputEmitter};

/// Word count: input items are `(file name, contents)`.
pub struct WC;

impl WC {
    pub fn input<N, C>(files: impl IntoIterator<Item = (N, C)>) -> Vec<KeyValue<String, String>>
    where
        N: Into<String>,
        C: Into<String>,
    {
        files
            .into_iter()
            .map(|(name, contents)| KeyValue::new(name.into(), contents.into()))
            .collect()
    }
}

impl MRApp for WC {
    type K1 = String;
    type V1 = String;
    type K2 = String;
    type V2 = u32;
    type K3 = String;
    type V3 = usize;

    fn map(&self, _key: &String, value: &String, emit: &mut IntermediateEmitter<'_, String, u32>) {
        // regular expression is an order of magnitude slower
        let mut buf = String::new();
        for c in value.chars() {
            if c.is_alphabetic() {
                buf.push(c);
            } else if !buf.is_empty() {
                emit.emit(std::mem::take(&mut buf), 1);
            }
        }
        if !buf.is_empty() {
            emit.emit(buf, 1);
        }
    }

    fn reduce(&self, key: &String, values: &[u32], emit: &mut OutputEmitter<String, usize>) {
        emit.emit(key.clone(), values.len());
    }
}
