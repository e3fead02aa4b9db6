// fail-fast wrappers around synchronization primitives

use std::fmt::Display;
use std::sync::{Mutex, MutexGuard};

/// Reports the failed operation and terminates the process with status 1.
///
/// Used for failures of locks, condition variables and thread creation,
/// none of which the engine can recover from.
pub fn fatal(op: &str, err: &dyn Display) -> ! {
    let msg = failure_message(op, err);
    log::error!("{}", msg);
    eprintln!("{}", msg);
    std::process::exit(1)
}

pub(crate) fn failure_message(op: &str, err: &dyn Display) -> String {
    format!("MapReduce failure: {} failed: {}", op, err)
}

pub(crate) trait OrFatal<T> {
    fn or_fatal(self, op: &str) -> T;
}

impl<T, E: Display> OrFatal<T> for Result<T, E> {
    fn or_fatal(self, op: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) => fatal(op, &e),
        }
    }
}

pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, op: &str) -> MutexGuard<'a, T> {
    mutex.lock().or_fatal(op)
}
