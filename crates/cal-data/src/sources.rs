//! The shared task stream.
//!
//! [`TaskSource`] owns the input reader behind a single lock and only ever
//! hands out whole batches of decoded grids, so no two callers can receive
//! the same record.
//!
//! Records are whitespace-separated JSON objects. A record may sit on its
//! own line, share a line with others, or span several lines. After a
//! syntax error decoding resumes at the next line.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use cal_types::{CalResult, DataError, GridRecord, HyperparameterGrid};
use parking_lot::Mutex;
use serde_json::{Deserializer, Value};
use tracing::{debug, error, warn};

/// Counters kept by the source while decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub grids_delivered: usize,
    pub records_skipped: usize,
    pub exhausted: bool,
}

struct SourceState<R> {
    reader: R,
    /// Lines read so far.
    line: usize,
    /// Bytes read but not yet decoded into a complete value.
    pending: Vec<u8>,
    /// Line number of the first byte in `pending`.
    pending_line: usize,
    decoded: VecDeque<HyperparameterGrid>,
    stats: SourceStats,
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

impl<R: BufRead> SourceState<R> {
    /// Decode the next valid grid, skipping malformed records. `None` once
    /// the stream is exhausted; exhaustion is permanent.
    fn next_grid(&mut self) -> Option<HyperparameterGrid> {
        loop {
            if let Some(grid) = self.decoded.pop_front() {
                self.stats.grids_delivered += 1;
                return Some(grid);
            }
            if self.stats.exhausted {
                return None;
            }
            self.fill();
        }
    }

    /// Read one more line into `pending` and decode whatever it completes.
    fn fill(&mut self) {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) => {
                if !is_blank(&self.pending) {
                    self.skip(DataError::MalformedRecord {
                        line: self.pending_line,
                        message: "record is not terminated before end of stream".to_string(),
                    });
                }
                self.pending.clear();
                debug!(lines = self.line, "Task stream exhausted");
                self.stats.exhausted = true;
            }
            Ok(_) => {
                self.line += 1;
                self.decode_pending();
            }
            Err(e) => {
                error!(
                    line = self.line + 1,
                    "Task stream read failed, treating as exhausted: {}", e
                );
                self.stats.exhausted = true;
            }
        }
    }

    fn decode_pending(&mut self) {
        let mut values = Vec::new();
        let mut failure = None;
        let mut consumed = 0;

        {
            let mut stream = Deserializer::from_slice(&self.pending).into_iter::<Value>();
            loop {
                let start = consumed
                    + self.pending[consumed..]
                        .iter()
                        .take_while(|b| b.is_ascii_whitespace())
                        .count();
                let line = self.pending_line + newlines(&self.pending[..start]);
                match stream.next() {
                    Some(Ok(value)) => {
                        values.push((line, value));
                        consumed = stream.byte_offset();
                    }
                    // Incomplete value: wait for more lines.
                    Some(Err(e)) if e.is_eof() => break,
                    Some(Err(e)) => {
                        failure = Some(DataError::MalformedRecord {
                            line,
                            message: e.to_string(),
                        });
                        consumed = self.pending.len();
                        break;
                    }
                    None => {
                        consumed = self.pending.len();
                        break;
                    }
                }
            }
        }

        for (line, value) in values {
            let grid = serde_json::from_value::<GridRecord>(value)
                .map_err(|e| DataError::MalformedRecord {
                    line,
                    message: e.to_string(),
                })
                .and_then(|record| HyperparameterGrid::from_record(record, line));
            match grid {
                Ok(grid) => self.decoded.push_back(grid),
                Err(e) => self.skip(e),
            }
        }
        if let Some(e) = failure {
            self.skip(e);
        }

        self.pending_line += newlines(&self.pending[..consumed]);
        self.pending.drain(..consumed);
        if is_blank(&self.pending) {
            self.pending_line += newlines(&self.pending);
            self.pending.clear();
        }
    }

    fn skip(&mut self, e: DataError) {
        warn!("Skipping task record: {}", e);
        self.stats.records_skipped += 1;
    }
}

/// Serialized access to one stream of JSON grid records.
pub struct TaskSource<R> {
    state: Mutex<SourceState<R>>,
}

impl<R: BufRead> TaskSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            state: Mutex::new(SourceState {
                reader,
                line: 0,
                pending: Vec::new(),
                pending_line: 1,
                decoded: VecDeque::new(),
                stats: SourceStats::default(),
            }),
        }
    }

    /// Take up to `batch_size` grids. Shorter than requested near the end of
    /// the stream; empty once it is exhausted, and empty on every call after.
    pub fn next_batch(&self, batch_size: usize) -> Vec<HyperparameterGrid> {
        let mut state = self.state.lock();
        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match state.next_grid() {
                Some(grid) => batch.push(grid),
                None => break,
            }
        }
        batch
    }

    pub fn stats(&self) -> SourceStats {
        self.state.lock().stats
    }
}

impl TaskSource<Box<dyn BufRead + Send>> {
    /// Open a task file, or standard input when `path` is `None`.
    pub fn open(path: Option<&Path>) -> CalResult<Self> {
        let reader: Box<dyn BufRead + Send> = match path {
            Some(path) => {
                let file = File::open(path).map_err(|e| DataError::LoadingFailed {
                    message: format!("Failed to open task file {}: {}", path.display(), e),
                })?;
                Box::new(BufReader::new(file))
            }
            None => Box::new(BufReader::new(io::stdin())),
        };
        Ok(Self::new(reader))
    }
}
