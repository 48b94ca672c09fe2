//! Async write pipeline for file sinks
//!
//! Producers enqueue [`WriteJob`]s on a bounded channel; a single named worker
//! thread drains it and performs the physical writes.
//!
//! # Architecture
//!
//! 1. **Producers**: file sinks call [`WritePipeline::submit`] under their stream lock.
//! 2. **Queue**: a bounded `mpsc::sync_channel`; a full queue blocks the producer.
//! 3. **Consumer**: one thread blocks on `recv`, writes, and marks the job done.
//! 4. **Quiescence**: [`WritePipeline::wait_idle`] parks until the pending count hits zero.

use std::fs::File;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};

/// Name of the background writer thread
pub const WORKER_THREAD_NAME: &str = "splitlog-writer";

/// One line waiting to be written to a file handle
#[derive(Debug)]
pub struct WriteJob {
    pub file: Arc<File>,
    pub line: String,
    /// Failure flag of the stream that queued the job
    pub failed: Arc<AtomicBool>,
}

/// Number of jobs enqueued but not yet written
#[derive(Debug, Default)]
struct PendingWrites {
    count: AtomicUsize,
    lock: Mutex<()>,
    drained: Condvar,
}

impl PendingWrites {
    fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn done(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Taking the lock orders this wakeup after any waiter's check.
            let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
            self.drained.notify_all();
        }
    }

    fn wait_zero(&self) {
        let mut guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        while self.count.load(Ordering::SeqCst) != 0 {
            guard = self
                .drained
                .wait(guard)
                .unwrap_or_else(|e| e.into_inner());
        }
    }
}

/// Bounded queue plus the single worker that drains it
pub struct WritePipeline {
    tx: SyncSender<WriteJob>,
    pending: Arc<PendingWrites>,
    _worker: JoinHandle<()>,
}

impl WritePipeline {
    /// Spawn the writer thread with a queue of `capacity` jobs
    pub fn start(capacity: usize) -> Result<Self> {
        let (tx, rx) = mpsc::sync_channel::<WriteJob>(capacity);
        let pending = Arc::new(PendingWrites::default());
        let worker_pending = Arc::clone(&pending);

        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || {
                tracing::debug!("Log writer started (queue capacity {})", capacity);
                while let Ok(job) = rx.recv() {
                    // A stream that failed once stays failed; drop its backlog
                    if !job.failed.load(Ordering::Acquire) {
                        if let Err(e) = (&*job.file).write_all(job.line.as_bytes()) {
                            tracing::error!("Failed to write log line, disabling stream: {}", e);
                            job.failed.store(true, Ordering::Release);
                        }
                    }
                    worker_pending.done();
                }
                tracing::debug!("Log writer stopped");
            })?;

        Ok(Self {
            tx,
            pending,
            _worker: worker,
        })
    }

    /// Enqueue a job, blocking while the queue is full
    ///
    /// The pending count is raised before the send so that a concurrent
    /// [`wait_idle`](Self::wait_idle) can never observe zero while this job is in flight.
    pub fn submit(&self, job: WriteJob) -> Result<()> {
        self.pending.add();
        if self.tx.send(job).is_err() {
            self.pending.done();
            return Err(Error::PipelineClosed);
        }
        Ok(())
    }

    /// Block until every submitted job has been written
    pub fn wait_idle(&self) {
        self.pending.wait_zero();
    }

    /// Jobs submitted but not yet written
    pub fn pending(&self) -> usize {
        self.pending.count.load(Ordering::SeqCst)
    }
}
