use std::fs;
use std::path::PathBuf;

use crate::mr::{IntermediateEmitter, KeyValue, MRApp, OutputEmitter};

/// Finds directory entries whose name contains a substring.
///
/// Input items are folders. Every entry of every folder is emitted with 1 when
/// its name matches and 0 otherwise; the reduce step sums per name, so the
/// output holds each name with the number of folders it matched in.
/// `.` and `..` are not listed, so an empty folder emits nothing.
pub struct Search {
    needle: String,
}

impl Search {
    pub fn new(needle: impl Into<String>) -> Self {
        Search {
            needle: needle.into(),
        }
    }

    pub fn input(folders: impl IntoIterator<Item = PathBuf>) -> Vec<KeyValue<PathBuf, ()>> {
        folders.into_iter().map(|f| KeyValue::new(f, ())).collect()
    }
}

impl MRApp for Search {
    type K1 = PathBuf;
    type V1 = ();
    type K2 = String;
    type V2 = u32;
    type K3 = String;
    type V3 = u32;

    fn map(&self, folder: &PathBuf, _: &(), emit: &mut IntermediateEmitter<'_, String, u32>) {
        // unreadable folders contribute nothing
        let Ok(entries) = fs::read_dir(folder) else {
            log::debug!("skipping unreadable folder {}", folder.display());
            return;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let found = name.contains(&self.needle);
            emit.emit(name, found as u32);
        }
    }

    fn reduce(&self, name: &String, values: &[u32], emit: &mut OutputEmitter<String, u32>) {
        emit.emit(name.clone(), values.iter().sum());
    }
}

/// Each name repeated once per match, space separated.
pub fn format_matches(output: &[KeyValue<String, u32>]) -> String {
    output
        .iter()
        .flat_map(|kv| std::iter::repeat_n(kv.key.as_str(), kv.value as usize))
        .collect::<Vec<_>>()
        .join(" ")
}
