//! Bounded dispatcher
//!
//! Runs a fixed number of jobs against a [`RemoteExecutor`] with at most
//! `concurrency` outstanding at once. Sequential mode awaits each job in
//! index order with a pacing delay between jobs; parallel mode admits jobs
//! greedily into a `JoinSet` and, once full, waits for whichever job
//! finishes first before admitting the next.

use nfstress_config::RunConfig;
use nfstress_core::{ExecStatus, FailureReason, JobResult, JobSpec, RemoteExecutor, RunMode};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::job::{JobFactory, PreparedJob};
use crate::report::ResultSink;

/// Admitted jobs whose executor call has not yet returned, and the highest
/// count seen during the run
#[derive(Debug, Default)]
pub struct ActiveGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ActiveGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Count one job in; the slot counts it out when dropped
    pub fn enter(self: &Arc<Self>) -> ActiveSlot {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        ActiveSlot {
            gauge: Arc::clone(self),
        }
    }
}

/// One occupied slot of an [`ActiveGauge`]
#[derive(Debug)]
pub struct ActiveSlot {
    gauge: Arc<ActiveGauge>,
}

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Results of one dispatch, in completion order
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub results: Vec<JobResult>,
    /// Jobs the run was configured for
    pub planned: usize,
    /// Admission stopped early on cancellation
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Runs jobs under the concurrency ceiling of a [`RunConfig`]
pub struct Dispatcher {
    executor: Arc<dyn RemoteExecutor>,
    config: RunConfig,
    request_timeout: Duration,
    gauge: Arc<ActiveGauge>,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        executor: Arc<dyn RemoteExecutor>,
        config: RunConfig,
        request_timeout: Duration,
    ) -> Self {
        Self {
            executor,
            config,
            request_timeout,
            gauge: Arc::new(ActiveGauge::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop admitting jobs once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn gauge(&self) -> Arc<ActiveGauge> {
        Arc::clone(&self.gauge)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every job, handing each result to `sink` as it completes
    pub async fn run<F>(&self, factory: &mut F, sink: &mut dyn ResultSink) -> DispatchOutcome
    where
        F: JobFactory + ?Sized,
    {
        info!(
            "Dispatching {} jobs (mode={}, concurrency={}, executor={})",
            self.config.total_requests,
            self.config.mode,
            self.config.effective_concurrency(),
            self.executor.name()
        );

        let started = Instant::now();
        let mut results = Vec::with_capacity(self.config.total_requests);
        let cancelled = match self.config.mode {
            RunMode::Sequential => self.run_sequential(factory, sink, &mut results).await,
            RunMode::Parallel => self.run_parallel(factory, sink, &mut results).await,
        };
        let elapsed = started.elapsed();

        if cancelled {
            warn!(
                "Run cancelled after {} of {} jobs",
                results.len(),
                self.config.total_requests
            );
        }
        debug!(
            "Dispatch finished in {:?}, peak concurrency {}",
            elapsed,
            self.gauge.peak()
        );

        DispatchOutcome {
            results,
            planned: self.config.total_requests,
            cancelled,
            elapsed,
        }
    }

    async fn run_sequential<F>(
        &self,
        factory: &mut F,
        sink: &mut dyn ResultSink,
        results: &mut Vec<JobResult>,
    ) -> bool
    where
        F: JobFactory + ?Sized,
    {
        let total = self.config.total_requests;

        for index in 1..=total {
            if self.cancel.is_cancelled() {
                return true;
            }

            let job = factory.prepare(JobSpec::new(index, total));
            let fallback = (job.spec, job.labels.clone());
            let admitted = Instant::now();
            let handle = tokio::spawn(self.job_future(job));

            let result = match handle.await {
                Ok(result) => result,
                Err(e) => aborted(fallback.0, fallback.1, &e, admitted.elapsed()),
            };
            record(sink, results, result);

            if index < total {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.pacing) => {}
                    _ = self.cancel.cancelled() => return true,
                }
            }
        }

        false
    }

    async fn run_parallel<F>(
        &self,
        factory: &mut F,
        sink: &mut dyn ResultSink,
        results: &mut Vec<JobResult>,
    ) -> bool
    where
        F: JobFactory + ?Sized,
    {
        let total = self.config.total_requests;
        let concurrency = self.config.concurrency;
        let mut active: JoinSet<JobResult> = JoinSet::new();
        let mut in_flight: HashMap<tokio::task::Id, (JobSpec, Vec<(String, String)>, Instant)> =
            HashMap::new();
        let mut next = 1;

        loop {
            while next <= total && active.len() < concurrency && !self.cancel.is_cancelled() {
                let job = factory.prepare(JobSpec::new(next, total));
                let bookkeeping = (job.spec, job.labels.clone(), Instant::now());
                let handle = active.spawn(self.job_future(job));
                in_flight.insert(handle.id(), bookkeeping);
                next += 1;
            }

            // Wait for any one job; `None` once everything admitted has drained
            let Some(joined) = active.join_next_with_id().await else {
                break;
            };

            let result = match joined {
                Ok((id, result)) => {
                    in_flight.remove(&id);
                    result
                }
                Err(e) => match in_flight.remove(&e.id()) {
                    Some((spec, labels, admitted)) => {
                        aborted(spec, labels, &e, admitted.elapsed())
                    }
                    None => {
                        warn!("Joined an unknown job task: {}", e);
                        continue;
                    }
                },
            };
            record(sink, results, result);
        }

        next <= total
    }

    fn job_future(&self, job: PreparedJob) -> impl Future<Output = JobResult> + Send + 'static {
        let executor = Arc::clone(&self.executor);
        let timeout = self.request_timeout;
        let slot = self.gauge.enter();

        async move {
            let started = Instant::now();
            let status = executor.execute(&job.context, &job.payload, timeout).await;
            let latency = started.elapsed();
            drop(slot);
            JobResult::new(job.spec, job.labels, status, latency)
        }
    }
}

fn record(sink: &mut dyn ResultSink, results: &mut Vec<JobResult>, result: JobResult) {
    sink.record(&result);
    results.push(result);
}

fn aborted(
    spec: JobSpec,
    labels: Vec<(String, String)>,
    error: &JoinError,
    latency: Duration,
) -> JobResult {
    let reason = if error.is_panic() {
        "job task panicked"
    } else {
        "job task cancelled"
    };
    warn!("Job {} aborted: {}", spec, reason);
    JobResult::new(
        spec,
        labels,
        ExecStatus::Failed(FailureReason::Aborted(reason.to_string())),
        latency,
    )
}
