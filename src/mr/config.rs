use super::Error;

/// Number of items a worker claims from a collection at a time.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Parameters of a single engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub map_threads: usize,
    pub reduce_threads: usize,
    pub chunk_size: usize,
    /// Drop the grouped intermediate pairs before returning from a run
    /// instead of handing them back in [`super::RunOutput::intermediates`].
    pub release_intermediates: bool,
}

impl Config {
    /// Same thread count for both phases, default chunk size, intermediates released.
    pub fn new(threads: usize) -> Self {
        Config {
            map_threads: threads,
            reduce_threads: threads,
            chunk_size: DEFAULT_CHUNK_SIZE,
            release_intermediates: true,
        }
    }

    pub fn with_reduce_threads(mut self, threads: usize) -> Self {
        self.reduce_threads = threads;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn retain_intermediates(mut self) -> Self {
        self.release_intermediates = false;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.map_threads == 0 {
            return Err(Error::NoThreads { role: "map" });
        }
        if self.reduce_threads == 0 {
            return Err(Error::NoThreads { role: "reduce" });
        }
        if self.chunk_size == 0 {
            return Err(Error::ZeroChunkSize);
        }
        Ok(())
    }
}
