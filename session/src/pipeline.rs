//! Background delta encoding.
//!
//! The per-cell scan is the most expensive per-frame operation, so it runs
//! on a worker thread instead of the simulation tick. Each cycle is two
//! sequential stages: collect the changed cells (chunked across cores), then
//! serialize the collected list into an exact-size buffer. The tick submits
//! snapshots and polls for finished payloads; it never blocks on the worker,
//! so a snapshot submitted at tick T may surface at tick T+k.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use roomsync_shared::{collect_span, encode_records, DeltaRecord};
use thiserror::Error;

/// Below this cell count the chunked scan costs more than it saves.
const PARALLEL_SCAN_MIN_CELLS: usize = 4096;

/// Errors in the background pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The worker thread is gone; scans can no longer be encoded
    #[error("Delta pipeline worker has stopped; the scan was not submitted")]
    WorkerStopped,
}

/// One finished encode cycle.
pub struct EncodedScan {
    /// How many records the payload carries. Zero means nothing changed and
    /// no message should be sent.
    pub record_count: usize,
    pub payload: Vec<u8>,
}

/// The two-stage scan-then-serialize worker.
pub struct DeltaPipeline {
    submit_tx: Option<Sender<Vec<i32>>>,
    result_rx: Receiver<EncodedScan>,
    worker: Option<JoinHandle<()>>,
}

impl DeltaPipeline {
    pub fn spawn() -> Self {
        let (submit_tx, submit_rx) = mpsc::channel::<Vec<i32>>();
        let (result_tx, result_rx) = mpsc::channel::<EncodedScan>();

        let worker = thread::spawn(move || {
            while let Ok(snapshot) = submit_rx.recv() {
                let records = collect_chunked(&snapshot);
                let payload = encode_records(&records);
                let scan = EncodedScan {
                    record_count: records.len(),
                    payload,
                };
                if result_tx.send(scan).is_err() {
                    break;
                }
            }
        });

        Self {
            submit_tx: Some(submit_tx),
            result_rx,
            worker: Some(worker),
        }
    }

    /// Hand a per-frame snapshot to the worker.
    ///
    /// The snapshot is owned by the pipeline from here on; the caller may
    /// clear and refill its live buffer immediately.
    pub fn submit(&self, snapshot: Vec<i32>) -> Result<(), PipelineError> {
        let Some(tx) = &self.submit_tx else {
            return Err(PipelineError::WorkerStopped);
        };
        tx.send(snapshot).map_err(|_| PipelineError::WorkerStopped)
    }

    /// Take the next finished encode, if one is ready. Never blocks.
    pub fn try_poll(&self) -> Option<EncodedScan> {
        self.result_rx.try_recv().ok()
    }

    /// Block until the next finished encode, or `None` once the worker has
    /// stopped. Test and shutdown use; the tick path polls.
    pub fn wait(&self) -> Option<EncodedScan> {
        self.result_rx.recv().ok()
    }
}

impl Drop for DeltaPipeline {
    fn drop(&mut self) {
        // closing the submit channel ends the worker loop
        self.submit_tx = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Stage 1: scan the snapshot for written cells, one chunk per core.
///
/// Chunks are spans of the original buffer in slice order, so concatenating
/// their outputs restores the global ascending-index order.
fn collect_chunked(snapshot: &[i32]) -> Vec<DeltaRecord> {
    let workers = thread::available_parallelism().map_or(1, |n| n.get());

    if workers <= 1 || snapshot.len() < PARALLEL_SCAN_MIN_CELLS {
        let (records, clamped) = collect_span(snapshot, 0);
        warn_clamped(clamped);
        return records;
    }

    let chunk_len = snapshot.len().div_ceil(workers);
    let mut records = Vec::new();
    let mut clamped: usize = 0;

    thread::scope(|scope| {
        let handles: Vec<_> = snapshot
            .chunks(chunk_len)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let index_base = (chunk_index * chunk_len) as u32;
                scope.spawn(move || collect_span(chunk, index_base))
            })
            .collect();

        for handle in handles {
            if let Ok((chunk_records, chunk_clamped)) = handle.join() {
                records.extend(chunk_records);
                clamped += chunk_clamped;
            }
        }
    });

    warn_clamped(clamped);
    records
}

fn warn_clamped(clamped: usize) {
    if clamped > 0 {
        log::warn!("clamped {clamped} cell value(s) to the i16 wire range this scan");
    }
}

// Tests
