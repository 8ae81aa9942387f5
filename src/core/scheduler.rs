//! Poll loop with at-most-one capture per source.
//!
//! Each candidate source has an atomic in-flight flag, indexed by its position
//! in the fixed source list. A pass walks the list, test-and-sets the flag of
//! every idle source and spawns a task that probes it and, if live, runs the
//! capture pipeline. The flag is owned by an [`InFlightGuard`] moved into the
//! task, so it is released however the task ends.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::core::pipeline::{CaptureOutcome, CapturePipeline};
use crate::core::prober::LivenessProbe;
use crate::core::sources::{CandidateSource, SourceKey};

/// In-flight flags for a fixed list of sources
pub struct InFlightTable {
    flags: Vec<AtomicBool>,
    index: HashMap<SourceKey, usize>,
}

impl InFlightTable {
    pub fn new(sources: &[CandidateSource]) -> Self {
        Self {
            flags: sources.iter().map(|_| AtomicBool::new(false)).collect(),
            index: sources
                .iter()
                .enumerate()
                .map(|(i, s)| (s.key.clone(), i))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn index_of(&self, key: &SourceKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn is_in_flight(&self, index: usize) -> bool {
        self.flags
            .get(index)
            .map(|f| f.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    pub fn in_flight_count(&self) -> usize {
        self.flags.iter().filter(|f| f.load(Ordering::Acquire)).count()
    }

    /// Move `index` from idle to in-flight; `None` if it was already in flight
    pub fn try_acquire(self: &Arc<Self>, index: usize) -> Option<InFlightGuard> {
        let flag = self.flags.get(index)?;
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                table: Arc::clone(self),
                index,
            })
    }
}

/// Marks one source in flight until dropped
pub struct InFlightGuard {
    table: Arc<InFlightTable>,
    index: usize,
}

impl InFlightGuard {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.table.flags[self.index].store(false, Ordering::Release);
    }
}

/// Join handles of launched tasks, keyed by source index
#[derive(Default)]
pub struct TaskRegistry {
    handles: Mutex<HashMap<usize, JoinHandle<CaptureOutcome>>>,
}

impl TaskRegistry {
    fn insert(&self, index: usize, handle: JoinHandle<CaptureOutcome>) {
        self.handles.lock().insert(index, handle);
    }

    /// Remove and return handles of tasks that have already finished
    fn take_finished(&self) -> Vec<(usize, JoinHandle<CaptureOutcome>)> {
        let mut handles = self.handles.lock();
        let done: Vec<usize> = handles
            .iter()
            .filter(|(_, h)| h.is_finished())
            .map(|(i, _)| *i)
            .collect();
        done.into_iter()
            .filter_map(|i| handles.remove(&i).map(|h| (i, h)))
            .collect()
    }

    pub fn outstanding(&self) -> usize {
        self.handles.lock().values().filter(|h| !h.is_finished()).count()
    }

    fn take_all(&self) -> Vec<(usize, JoinHandle<CaptureOutcome>)> {
        self.handles.lock().drain().collect()
    }
}

pub struct Scheduler {
    sources: Arc<[CandidateSource]>,
    in_flight: Arc<InFlightTable>,
    tasks: TaskRegistry,
    prober: Arc<dyn LivenessProbe>,
    pipeline: Arc<CapturePipeline>,
    poll_interval: Duration,
    broadcaster_count: usize,
    panicked: Arc<AtomicUsize>,
}

impl Scheduler {
    pub fn new(
        sources: Vec<CandidateSource>,
        prober: Arc<dyn LivenessProbe>,
        pipeline: Arc<CapturePipeline>,
        poll_interval: Duration,
    ) -> Self {
        let in_flight = Arc::new(InFlightTable::new(&sources));
        let mut names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        let broadcaster_count = names.len();

        Self {
            sources: sources.into(),
            in_flight,
            tasks: TaskRegistry::default(),
            prober,
            pipeline,
            poll_interval,
            broadcaster_count,
            panicked: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn sources(&self) -> &[CandidateSource] {
        &self.sources
    }

    pub fn in_flight(&self) -> &InFlightTable {
        &self.in_flight
    }

    pub fn is_in_flight(&self, key: &SourceKey) -> bool {
        self.in_flight
            .index_of(key)
            .map(|i| self.in_flight.is_in_flight(i))
            .unwrap_or(false)
    }

    /// Number of tasks still running
    pub fn outstanding_tasks(&self) -> usize {
        self.tasks.outstanding()
    }

    /// Tasks seen to have panicked so far
    pub fn panicked_tasks(&self) -> usize {
        self.panicked.load(Ordering::Relaxed)
    }

    /// One pass over every source. Returns how many tasks were launched.
    ///
    /// Must be called from within a tokio runtime. Never waits on a task.
    pub fn poll_once(&self) -> usize {
        self.reap_finished();

        let mut launched = 0;
        for index in 0..self.sources.len() {
            let Some(guard) = self.in_flight.try_acquire(index) else {
                continue;
            };

            let sources = Arc::clone(&self.sources);
            let prober = Arc::clone(&self.prober);
            let pipeline = Arc::clone(&self.pipeline);

            let handle = tokio::spawn(async move {
                let _guard = guard;
                let source = &sources[index];
                let liveness = prober.probe(&source.url).await;
                if !liveness.is_live() {
                    log::trace!("{} not live: {:?}", source.key, liveness);
                    return CaptureOutcome::NotLive;
                }
                pipeline.run(source).await
            });

            self.tasks.insert(index, handle);
            launched += 1;
        }

        let in_flight = self.in_flight.in_flight_count();
        if in_flight > self.broadcaster_count {
            log::debug!("current in-flight cnt = {}", in_flight);
        }

        launched
    }

    /// Collect finished handles so panicked tasks get reported
    fn reap_finished(&self) {
        let finished = self.tasks.take_finished();
        if finished.is_empty() {
            return;
        }

        let sources = Arc::clone(&self.sources);
        let panicked = Arc::clone(&self.panicked);
        tokio::spawn(async move {
            for (index, handle) in finished {
                // already finished, so this resolves immediately
                if let Err(e) = handle.await {
                    report_join_error(&sources[index].key, &e, &panicked);
                }
            }
        });
    }

    /// Poll forever at the configured cadence
    pub async fn run(&self) {
        log::info!(
            "Polling {} sources every {:?}",
            self.sources.len(),
            self.poll_interval
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.poll_once();
        }
    }

    /// Wait for every outstanding task and return the outcomes by source key
    pub async fn drain(&self) -> Vec<(SourceKey, CaptureOutcome)> {
        let mut outcomes = Vec::new();
        for (index, handle) in self.tasks.take_all() {
            let key = self.sources[index].key.clone();
            match handle.await {
                Ok(outcome) => outcomes.push((key, outcome)),
                Err(e) => report_join_error(&key, &e, &self.panicked),
            }
        }
        outcomes
    }
}

fn report_join_error(key: &SourceKey, err: &tokio::task::JoinError, panicked: &AtomicUsize) {
    if err.is_panic() {
        panicked.fetch_add(1, Ordering::Relaxed);
        log::error!("Capture task for {} panicked: {}", key, err);
    } else {
        log::debug!("Capture task for {} cancelled", key);
    }
}
