//! Training-job polling as an explicit state machine
//!
//! One tokio task owns the poll cycle: fetch the job status, publish it,
//! sleep, repeat. Each fetch is awaited before the next tick, so there is
//! never more than one request in flight. A watch channel carries the stop
//! signal, so `stop` cancels the task promptly instead of orphaning a
//! timer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::{JobStatus, Result, TrainingJob};

/// Lifecycle of the poller itself (not of the job it watches).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MonitorState {
    #[default]
    Idle,
    Polling,
    Stopped,
}

/// Where job statuses come from. The production implementation wraps the
/// training API's status endpoint; tests script one.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &str) -> Result<TrainingJob>;
}

/// What the poller has seen so far: the most recent job snapshot, and the
/// error that ended polling when it ended on one. A successful fetch
/// clears a previous error; an error keeps the last good snapshot.
#[derive(Clone, Debug, Default)]
pub struct Observation {
    pub job: Option<TrainingJob>,
    pub error: Option<String>,
}

/// Poller for one training job.
///
/// `start` and `stop` drive the `Idle -> Polling -> Stopped` machine;
/// a terminal job status (completed or failed) or a fetch error stops the
/// machine by itself. `start` must be called from within a tokio runtime.
pub struct JobMonitor {
    source: Arc<dyn JobStatusSource>,
    job_id: String,
    interval: Duration,
    state_tx: Arc<watch::Sender<MonitorState>>,
    state_rx: watch::Receiver<MonitorState>,
    observation_tx: Arc<watch::Sender<Observation>>,
    observation_rx: watch::Receiver<Observation>,
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl JobMonitor {
    pub fn new(
        source: Arc<dyn JobStatusSource>,
        job_id: impl Into<String>,
        interval: Duration,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(MonitorState::Idle);
        let (observation_tx, observation_rx) = watch::channel(Observation::default());
        Self {
            source,
            job_id: job_id.into(),
            interval,
            state_tx: Arc::new(state_tx),
            state_rx,
            observation_tx: Arc::new(observation_tx),
            observation_rx,
            stop_tx: None,
            task: None,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn state(&self) -> MonitorState {
        *self.state_rx.borrow()
    }

    /// Most recent job snapshot, if any fetch has succeeded yet.
    pub fn latest(&self) -> Option<TrainingJob> {
        self.observation_rx.borrow().job.clone()
    }

    /// The error that stopped polling, when it stopped on one.
    pub fn last_error(&self) -> Option<String> {
        self.observation_rx.borrow().error.clone()
    }

    /// Receiver over every published observation, for async consumers.
    pub fn subscribe(&self) -> watch::Receiver<Observation> {
        self.observation_rx.clone()
    }

    /// Begin polling. A no-op while already polling; from `Idle` or
    /// `Stopped` it spawns a fresh poll task. The first fetch happens
    /// immediately, subsequent ones after each interval.
    pub fn start(&mut self) {
        if self.state() == MonitorState::Polling {
            return;
        }
        // A task from an earlier round may still be draining its final
        // fetch; cut it off so two pollers never overlap.
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        self.stop_tx = Some(stop_tx);
        self.state_tx.send_replace(MonitorState::Polling);
        log::debug!("monitor for {} polling every {:?}", self.job_id, self.interval);

        self.task = Some(tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            self.job_id.clone(),
            self.interval,
            Arc::clone(&self.state_tx),
            Arc::clone(&self.observation_tx),
            stop_rx,
        )));
    }

    /// Stop polling. The stop signal wakes the task out of its sleep; a
    /// fetch already in flight finishes and publishes before the task
    /// exits.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        self.state_tx.send_replace(MonitorState::Stopped);
    }
}

impl Drop for JobMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn poll_loop(
    source: Arc<dyn JobStatusSource>,
    job_id: String,
    interval: Duration,
    state_tx: Arc<watch::Sender<MonitorState>>,
    observation_tx: Arc<watch::Sender<Observation>>,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        match source.fetch_status(&job_id).await {
            Ok(job) => {
                let terminal = job.status.is_terminal();
                observation_tx.send_modify(|observation| {
                    observation.job = Some(job);
                    observation.error = None;
                });
                if terminal {
                    log::debug!("job {} reached a terminal status, monitor stopping", job_id);
                    state_tx.send_replace(MonitorState::Stopped);
                    return;
                }
            }
            Err(error) => {
                log::warn!("status fetch for {} failed: {}", job_id, error);
                observation_tx.send_modify(|observation| {
                    observation.error = Some(error.to_string());
                });
                state_tx.send_replace(MonitorState::Stopped);
                return;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = stop_rx.changed() => {
                // Either a stop was requested or the monitor went away.
                if changed.is_err() || *stop_rx.borrow() {
                    return;
                }
            }
        }
    }
}

/// Estimated time until a running job finishes, extrapolated from its
/// progress so far: `elapsed / progress * (100 - progress)`.
///
/// `None` for jobs that are not running, report zero progress, or carry
/// no start timestamp (nothing to extrapolate from).
pub fn estimate_remaining(job: &TrainingJob, now: DateTime<Utc>) -> Option<Duration> {
    if job.status != JobStatus::Running || job.progress == 0 {
        return None;
    }
    let started = job.started_at?;
    let elapsed = (now - started).to_std().ok()?;

    let progress = f64::from(job.progress);
    let remaining = elapsed.as_secs_f64() / progress * (100.0 - progress).max(0.0);
    Some(Duration::from_secs_f64(remaining))
}
