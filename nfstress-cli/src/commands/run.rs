//! Stress scenario runs

use anyhow::{Context, Result};
use chrono::Utc;
use nfstress_config::{ConfigResult, ExecutorBackend, ExecutorConfig, RunConfig, StressConfig};
use nfstress_core::{
    CandidateSet, DrawOrder, IdentifierSource, LivenessProbe, NfKind, PayloadSynthesizer,
    RemoteExecutor, Scenario, TargetSelector,
};
use nfstress_execution::{
    ConsoleReporter, ContainerExecutor, Dispatcher, DockerProbe, ResultSink, RunSummary,
    ScenarioJobFactory, StaticProbe,
};
use nfstress_http::HttpExecutor;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::ScenarioArgs;

/// Fold command-line flags into the loaded configuration and revalidate it
pub fn apply_overrides(config: &mut StressConfig, args: &ScenarioArgs) -> ConfigResult<()> {
    let run = &args.run;
    if let Some(mode) = run.mode {
        config.run.mode = mode;
    }
    if let Some(concurrency) = run.concurrency {
        config.run.concurrency = concurrency;
    }
    if let Some(pace_ms) = run.pace_ms {
        config.run.pacing = Duration::from_millis(pace_ms);
    }
    if let Some(seed) = run.seed {
        config.run.seed = Some(seed);
    }
    if let Some(format) = run.output {
        config.run.report_format = format;
    }
    if let Some(timeout) = run.timeout {
        config.executor.request_timeout = Duration::from_secs(timeout);
    }
    if let Some(backend) = run.executor {
        config.executor.backend = backend;
    }
    if run.auto_provision {
        config.executor.auto_provision = true;
    }
    if run.http2_prior_knowledge {
        config.executor.http2_prior_knowledge = true;
    }

    let identity = &args.identity;
    if let Some(start) = identity.imsi_start {
        config.identity.imsi_start = start;
    }
    if let Some(end) = identity.imsi_end {
        config.identity.imsi_end = end;
    }
    if let Some(width) = identity.imsi_width {
        config.identity.imsi_width = width;
    }
    if identity.sequential_ids {
        config.run.draw_order = DrawOrder::Sequential;
    }

    config.validate_all()
}

/// Everything about a run that can be decided before touching the deployment
#[derive(Debug, Clone)]
pub struct ScenarioPlan {
    pub scenario: Scenario,
    pub run: RunConfig,
    pub sender_candidates: Vec<String>,
    pub targets: CandidateSet<NfKind>,
    pub requesters: Option<CandidateSet<NfKind>>,
    pub identifiers: Option<IdentifierSource>,
}

impl ScenarioPlan {
    pub fn new(scenario: Scenario, args: &ScenarioArgs, config: &StressConfig) -> Result<Self> {
        let run = RunConfig::new(args.run.num_requests, &config.run)
            .context("Invalid run parameters")?;

        let sender_candidates = if args.senders.is_empty() {
            scenario.default_senders()
        } else {
            args.senders.clone()
        };

        let targets = if args.targets.is_empty() {
            scenario.default_targets()
        } else {
            args.targets.clone()
        };
        let targets = CandidateSet::new("target", targets)?;

        let requesters = if scenario.uses_requester() {
            let kinds = if args.requesters.is_empty() {
                scenario.default_requesters()
            } else {
                args.requesters.clone()
            };
            Some(CandidateSet::new("requester", kinds)?)
        } else {
            if !args.requesters.is_empty() {
                warn!("--requester is ignored by the {} scenario", scenario);
            }
            None
        };

        let identifiers = if scenario.uses_subscriber_ids() {
            let range = config
                .identity
                .identifier_range()
                .context("Invalid IMSI range")?;
            Some(IdentifierSource::new(range, run.draw_order))
        } else {
            None
        };

        Ok(Self {
            scenario,
            run,
            sender_candidates,
            targets,
            requesters,
            identifiers,
        })
    }
}

/// Narrow the sender candidates to the reachable ones
pub async fn resolve_senders(
    probe: &dyn LivenessProbe,
    candidates: &[String],
) -> nfstress_core::Result<CandidateSet<String>> {
    let available = probe.list_available(candidates).await?;

    for missing in candidates.iter().filter(|c| !available.contains(*c)) {
        warn!("Sender {} is not running, skipping it", missing);
    }

    CandidateSet::new("sender", available)
}

/// The liveness probe matching the executor backend
pub fn build_probe(config: &ExecutorConfig) -> Box<dyn LivenessProbe> {
    match config.backend {
        ExecutorBackend::Docker => Box::new(DockerProbe::new(config.docker_binary.clone())),
        ExecutorBackend::Http => Box::new(StaticProbe),
    }
}

pub fn build_executor(config: &ExecutorConfig) -> Result<Arc<dyn RemoteExecutor>> {
    let executor: Arc<dyn RemoteExecutor> = match config.backend {
        ExecutorBackend::Docker => Arc::new(ContainerExecutor::new(config.into())),
        ExecutorBackend::Http => Arc::new(
            HttpExecutor::new(config.into()).context("Failed to build the HTTP client")?,
        ),
    };
    Ok(executor)
}

/// Run one scenario against the deployment described by `config`
pub async fn run_scenario(
    scenario: Scenario,
    args: &ScenarioArgs,
    config: &StressConfig,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    let plan = ScenarioPlan::new(scenario, args, config)?;
    let probe = build_probe(&config.executor);
    let executor = build_executor(&config.executor)?;
    let mut reporter = ConsoleReporter::stdout(plan.run.report_format);

    execute_plan(plan, config, probe.as_ref(), executor, &mut reporter, cancel).await
}

/// Discover senders, then dispatch every job of `plan` into `sink`
pub async fn execute_plan(
    plan: ScenarioPlan,
    config: &StressConfig,
    probe: &dyn LivenessProbe,
    executor: Arc<dyn RemoteExecutor>,
    sink: &mut dyn ResultSink,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    let senders = resolve_senders(probe, &plan.sender_candidates)
        .await
        .context("No reachable execution context")?;

    info!(
        "Running {} x{} from [{}] against [{}]",
        plan.scenario,
        plan.run.total_requests,
        senders,
        plan.targets
    );
    if let Some(source) = &plan.identifiers {
        debug!(
            "IMSI range {}..={} ({} digits)",
            source.range().start(),
            source.range().end(),
            source.range().width()
        );
    }

    let selector = TargetSelector::new(senders, plan.targets, plan.requesters);
    let synthesizer = PayloadSynthesizer::new(
        config.endpoints.to_endpoint_map(),
        config.identity.template_params(),
    );
    let mut factory = ScenarioJobFactory::new(
        plan.scenario,
        selector,
        plan.identifiers,
        synthesizer,
        plan.run.seed,
    );

    let dispatcher = Dispatcher::new(executor, plan.run, config.executor.request_timeout)
        .with_cancellation(cancel);

    let started_at = Utc::now();
    let outcome = dispatcher.run(&mut factory, sink).await;
    let summary = RunSummary::from_outcome(&outcome, started_at);
    sink.finish(&summary);

    info!(
        "{} finished: {} ok, {} fail, {} skip",
        plan.scenario, summary.ok, summary.fail, summary.skip
    );
    Ok(summary)
}
