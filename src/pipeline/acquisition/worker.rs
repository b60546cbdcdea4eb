//! Shared OCR worker with lazy, single-flight construction.
//!
//! `TextAcquisition` owns one OCR worker for its whole lifetime. The state
//! machine is `Uninitialized → Initializing → Ready`:
//! - the first caller to see `Uninitialized` starts construction on a
//!   detached task and queues itself as the first waiter;
//! - callers arriving during `Initializing` queue a oneshot waiter and suspend;
//! - on completion every waiter is answered in FIFO order with the same worker,
//!   or with the same error, in which case the state returns to
//!   `Uninitialized` so the next call retries.
//!
//! Recognition is serialized through the worker with an async mutex.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::oneshot;

use super::sanitize::clean_ocr_text;
use super::types::{OcrEngine, OcrEngineFactory};
use super::{AcquisitionError, PAGE_SEPARATOR};

type Worker = Arc<dyn OcrEngine>;
type WorkerResult = Result<Worker, AcquisitionError>;

enum WorkerState {
    Uninitialized,
    Initializing { waiters: VecDeque<oneshot::Sender<WorkerResult>> },
    Ready(Worker),
}

struct WorkerSlot {
    state: WorkerState,
    /// Bumped every time construction starts; a construction task only
    /// publishes if the slot is still on its generation.
    generation: u64,
}

/// Observable worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Uninitialized,
    Initializing,
    Ready,
}

/// Injectable handle to the OCR worker. Wrap in `Arc` and share.
pub struct TextAcquisition {
    factory: Arc<dyn OcrEngineFactory>,
    slot: Arc<Mutex<WorkerSlot>>,
    recognition: tokio::sync::Mutex<()>,
}

impl TextAcquisition {
    pub fn new(factory: Arc<dyn OcrEngineFactory>) -> Self {
        Self {
            factory,
            slot: Arc::new(Mutex::new(WorkerSlot {
                state: WorkerState::Uninitialized,
                generation: 0,
            })),
            recognition: tokio::sync::Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.factory.backend()
    }

    pub fn status(&self) -> WorkerStatus {
        match self.slot.lock() {
            Ok(slot) => match slot.state {
                WorkerState::Uninitialized => WorkerStatus::Uninitialized,
                WorkerState::Initializing { .. } => WorkerStatus::Initializing,
                WorkerState::Ready(_) => WorkerStatus::Ready,
            },
            Err(_) => WorkerStatus::Uninitialized,
        }
    }

    /// Get the shared worker, constructing it if nobody has yet.
    pub async fn acquire(&self) -> Result<Arc<dyn OcrEngine>, AcquisitionError> {
        let rx = {
            let mut guard = self.slot.lock().map_err(|_| {
                AcquisitionError::WorkerUnavailable("worker state lock poisoned".into())
            })?;
            let slot = &mut *guard;

            match &mut slot.state {
                WorkerState::Ready(worker) => return Ok(Arc::clone(worker)),
                WorkerState::Initializing { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push_back(tx);
                    tracing::debug!(queued = waiters.len(), "OCR worker initializing, waiting");
                    rx
                }
                WorkerState::Uninitialized => {
                    let (tx, rx) = oneshot::channel();
                    slot.generation += 1;
                    slot.state = WorkerState::Initializing {
                        waiters: VecDeque::from([tx]),
                    };
                    self.spawn_construction(slot.generation);
                    rx
                }
            }
        };

        rx.await.map_err(|_| {
            AcquisitionError::WorkerUnavailable("worker construction was abandoned".into())
        })?
    }

    fn spawn_construction(&self, generation: u64) {
        let factory = Arc::clone(&self.factory);
        let slot = Arc::clone(&self.slot);

        tokio::spawn(async move {
            let started = Instant::now();
            let backend = factory.backend();
            tracing::info!(backend, generation, "Constructing OCR worker");

            let result = tokio::task::spawn_blocking(move || factory.create())
                .await
                .unwrap_or_else(|e| {
                    Err(AcquisitionError::EngineInit(format!(
                        "construction task failed: {e}"
                    )))
                });

            match &result {
                Ok(_) => tracing::info!(
                    backend,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "OCR worker ready"
                ),
                Err(e) => tracing::warn!(
                    backend,
                    error = %e,
                    "OCR worker construction failed"
                ),
            }

            publish(&slot, generation, result.map(Arc::from));
        });
    }

    /// Run OCR over each image and join the cleaned page texts with
    /// [`PAGE_SEPARATOR`].
    pub async fn extract_text(&self, images: Vec<Vec<u8>>) -> Result<String, AcquisitionError> {
        if images.is_empty() {
            return Err(AcquisitionError::NoImages);
        }

        let started = Instant::now();
        let page_count = images.len();
        let total_bytes: usize = images.iter().map(Vec::len).sum();

        let worker = self.acquire().await?;
        let _serialized = self.recognition.lock().await;

        let mut blocks = Vec::with_capacity(page_count);
        for (index, image) in images.into_iter().enumerate() {
            let page_started = Instant::now();
            let bytes = image.len();
            let engine = Arc::clone(&worker);

            let result = tokio::task::spawn_blocking(move || engine.ocr_image(&image))
                .await
                .unwrap_or_else(|e| {
                    Err(AcquisitionError::OcrProcessing(format!("OCR task failed: {e}")))
                });

            let page = match result {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(page = index + 1, error = %e, "OCR failed, resetting worker");
                    self.reset_if_current(&worker);
                    return Err(e);
                }
            };

            tracing::debug!(
                page = index + 1,
                bytes,
                chars = page.text.len(),
                confidence = page.confidence,
                elapsed_ms = page_started.elapsed().as_millis() as u64,
                "OCR page recognized"
            );
            blocks.push(clean_ocr_text(&page.text));
        }

        let text = blocks.join(PAGE_SEPARATOR);
        tracing::info!(
            pages = page_count,
            total_bytes,
            chars = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Text acquisition complete"
        );
        Ok(text)
    }

    /// Drop the worker and return to `Uninitialized`. Callers still waiting
    /// on an in-flight construction are told the worker is unavailable.
    /// Safe to call at any time, including when no worker exists.
    pub fn shutdown(&self) {
        let mut guard = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match std::mem::replace(&mut guard.state, WorkerState::Uninitialized) {
            WorkerState::Ready(_) => {
                drop(guard);
                tracing::info!("OCR worker shut down");
            }
            WorkerState::Initializing { waiters } => {
                drop(guard);
                tracing::info!(waiters = waiters.len(), "OCR worker shut down during construction");
                for waiter in waiters {
                    let _ = waiter.send(Err(AcquisitionError::WorkerUnavailable(
                        "worker shut down during construction".into(),
                    )));
                }
            }
            WorkerState::Uninitialized => {
                tracing::debug!("OCR worker shutdown requested, no worker running");
            }
        }
    }

    fn reset_if_current(&self, worker: &Worker) {
        let mut guard = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let WorkerState::Ready(current) = &guard.state {
            if Arc::ptr_eq(current, worker) {
                guard.state = WorkerState::Uninitialized;
            }
        }
    }
}

/// Install the construction result and answer every waiter in queue order.
fn publish(slot: &Mutex<WorkerSlot>, generation: u64, result: WorkerResult) {
    let mut guard = match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    let is_current = guard.generation == generation
        && matches!(guard.state, WorkerState::Initializing { .. });
    if !is_current {
        tracing::info!(generation, "Discarding OCR worker from superseded construction");
        return;
    }

    let waiters = match std::mem::replace(&mut guard.state, WorkerState::Uninitialized) {
        WorkerState::Initializing { waiters } => waiters,
        _ => VecDeque::new(),
    };
    if let Ok(worker) = &result {
        guard.state = WorkerState::Ready(Arc::clone(worker));
    }
    drop(guard);

    for waiter in waiters {
        let _ = waiter.send(result.clone());
    }
}
