//! Off-path request dispatch with latest-wins semantics.
//!
//! Front ends that must stay responsive submit requests here instead of
//! awaiting the pipeline directly. Each [`ResourceKind`] has one slot: a new
//! request aborts whatever is still pending for that kind, and only the
//! newest request's result is ever delivered.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::analysis::AnalysisReport;
use crate::error::{AnalysisError, ValidationError};
use crate::github::{Account, CommitRecord, Listing, PageRequest, RepositoryRef};
use crate::llm::gemini::CompletionService;
use crate::pipeline::Pipeline;

/// The independent request slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Repositories,
    Commits,
    Analysis,
}

/// A finished request. `generation` is the number returned when it was submitted.
#[derive(Debug)]
pub enum Delivery {
    Repositories {
        generation: u64,
        result: Result<Listing<RepositoryRef>, ValidationError>,
    },
    Commits {
        generation: u64,
        result: Result<Listing<CommitRecord>, ValidationError>,
    },
    Analysis {
        generation: u64,
        result: Result<AnalysisReport, AnalysisError>,
    },
}

impl Delivery {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Delivery::Repositories { .. } => ResourceKind::Repositories,
            Delivery::Commits { .. } => ResourceKind::Commits,
            Delivery::Analysis { .. } => ResourceKind::Analysis,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Delivery::Repositories { generation, .. }
            | Delivery::Commits { generation, .. }
            | Delivery::Analysis { generation, .. } => *generation,
        }
    }
}

#[derive(Default)]
struct Slot {
    generation: u64,
    pending: Option<AbortHandle>,
}

type Slots = Arc<Mutex<HashMap<ResourceKind, Slot>>>;

fn lock(slots: &Slots) -> MutexGuard<'_, HashMap<ResourceKind, Slot>> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs pipeline calls on tokio tasks and delivers results over a channel.
///
/// Must be used from within a tokio runtime.
pub struct RequestDispatcher<S> {
    pipeline: Arc<Pipeline<S>>,
    slots: Slots,
    tx: mpsc::UnboundedSender<Delivery>,
}

impl<S: CompletionService + 'static> RequestDispatcher<S> {
    /// Create a dispatcher and the receiver its results arrive on.
    pub fn new(pipeline: Arc<Pipeline<S>>) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            pipeline,
            slots: Arc::new(Mutex::new(HashMap::new())),
            tx,
        };
        (dispatcher, rx)
    }

    pub fn request_repositories(&self, account: Account, request: PageRequest) -> u64 {
        let pipeline = Arc::clone(&self.pipeline);
        self.submit(ResourceKind::Repositories, move |generation| async move {
            let result = pipeline.list_repositories(&account, request).await;
            Delivery::Repositories { generation, result }
        })
    }

    pub fn request_commits(&self, account: Account, repo: String, request: PageRequest) -> u64 {
        let pipeline = Arc::clone(&self.pipeline);
        self.submit(ResourceKind::Commits, move |generation| async move {
            let result = pipeline.list_commits(&account, &repo, request).await;
            Delivery::Commits { generation, result }
        })
    }

    pub fn request_analysis(&self, batch: Vec<CommitRecord>) -> u64 {
        let pipeline = Arc::clone(&self.pipeline);
        self.submit(ResourceKind::Analysis, move |generation| async move {
            let result = pipeline.analyze_commits(&batch).await;
            Delivery::Analysis { generation, result }
        })
    }

    /// Whether a request of `kind` is still running.
    pub fn is_pending(&self, kind: ResourceKind) -> bool {
        lock(&self.slots)
            .get(&kind)
            .and_then(|slot| slot.pending.as_ref())
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort the pending request of `kind`, if any, without starting a new one.
    pub fn cancel(&self, kind: ResourceKind) {
        let mut slots = lock(&self.slots);
        let slot = slots.entry(kind).or_default();
        slot.generation += 1;
        if let Some(handle) = slot.pending.take() {
            handle.abort();
        }
    }

    fn submit<F, Fut>(&self, kind: ResourceKind, make: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = Delivery> + Send + 'static,
    {
        let mut slots = lock(&self.slots);
        let slot = slots.entry(kind).or_default();
        slot.generation += 1;
        let generation = slot.generation;

        if let Some(previous) = slot.pending.take() {
            debug!(?kind, generation, "superseding pending request");
            previous.abort();
        }

        let work = make(generation);
        let shared = Arc::clone(&self.slots);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let delivery = work.await;
            // Check and send under the lock so a concurrent submit cannot
            // slip in between.
            let slots = lock(&shared);
            if slots.get(&kind).map(|s| s.generation) == Some(generation) {
                let _ = tx.send(delivery);
            } else {
                debug!(?kind, generation, "discarding superseded result");
            }
        });
        slot.pending = Some(handle.abort_handle());

        generation
    }
}

impl<S> Drop for RequestDispatcher<S> {
    fn drop(&mut self) {
        for slot in lock(&self.slots).values_mut() {
            if let Some(handle) = slot.pending.take() {
                handle.abort();
            }
        }
    }
}
