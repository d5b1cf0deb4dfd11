//! Container-based remote executor
//!
//! Requests are issued with `curl` from inside the sender container via
//! `docker exec`, so they originate on the core's network with the
//! sender's address. Commands go through [`CommandRunner`] so tests can
//! replace the container runtime.

use async_trait::async_trait;
use nfstress_config::ExecutorConfig;
use nfstress_core::{ExecStatus, FailureReason, RemoteExecutor, RequestPayload};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::ExecutionError;

/// curl's exit code for an expired `--max-time`
const CURL_TIMEOUT_EXIT: i32 = 28;

const CURL_CHECK: &str = "command -v curl >/dev/null 2>&1 && echo present || echo missing";

const CURL_INSTALL: &str = "if command -v apt-get >/dev/null 2>&1; then \
     apt-get update -qq && DEBIAN_FRONTEND=noninteractive apt-get install -y -qq curl; \
     elif command -v apk >/dev/null 2>&1; then apk add --no-cache curl; \
     else echo 'no supported package manager' >&2; exit 127; fi";

/// Captured result of one external command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an external program to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, killing it once `timeout` elapses
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutionError>;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutionError> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecutionError::SpawnFailed {
                program: program.to_string(),
                source,
            })?;

        // Dropping the future on timeout kills the child
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ExecutionError::TimeoutError(timeout))?
            .map_err(|source| ExecutionError::SpawnFailed {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Whether a context can issue requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Ready,
    /// curl is missing and could not be provided
    Unavailable(String),
    /// The container runtime could not reach the context at all
    Unreachable(String),
}

/// Configuration for the container executor
#[derive(Debug, Clone)]
pub struct ContainerExecutorConfig {
    pub docker_binary: String,
    pub auto_provision: bool,
    pub http2_prior_knowledge: bool,
    /// Added to the request timeout before the process is killed
    pub timeout_grace: Duration,
    pub check_timeout: Duration,
    pub provision_timeout: Duration,
}

impl Default for ContainerExecutorConfig {
    fn default() -> Self {
        Self {
            docker_binary: "docker".to_string(),
            auto_provision: false,
            http2_prior_knowledge: false,
            timeout_grace: Duration::from_secs(2),
            check_timeout: Duration::from_secs(10),
            provision_timeout: Duration::from_secs(180),
        }
    }
}

impl From<&ExecutorConfig> for ContainerExecutorConfig {
    fn from(config: &ExecutorConfig) -> Self {
        Self {
            docker_binary: config.docker_binary.clone(),
            auto_provision: config.auto_provision,
            http2_prior_knowledge: config.http2_prior_knowledge,
            timeout_grace: config.timeout_grace,
            ..Self::default()
        }
    }
}

/// Executes requests with `docker exec <context> curl ...`
///
/// The first job on a context checks for `curl` (installing it when
/// auto-provisioning is on); the answer is cached for the rest of the run.
/// Concurrent first jobs on the same context share one check.
pub struct ContainerExecutor {
    runner: Arc<dyn CommandRunner>,
    config: ContainerExecutorConfig,
    capabilities: Mutex<HashMap<String, Arc<OnceCell<Capability>>>>,
}

impl ContainerExecutor {
    pub fn new(config: ContainerExecutorConfig) -> Self {
        Self::with_runner(config, Arc::new(TokioCommandRunner))
    }

    pub fn with_runner(config: ContainerExecutorConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            config,
            capabilities: Mutex::new(HashMap::new()),
        }
    }

    /// Cached capability of `context`, probing it on first use
    pub async fn capability(&self, context: &str) -> Capability {
        let cell = {
            let mut capabilities = self.capabilities.lock();
            capabilities
                .entry(context.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        cell.get_or_init(|| self.probe_capability(context))
            .await
            .clone()
    }

    async fn probe_capability(&self, context: &str) -> Capability {
        match self.check_curl(context).await {
            Ok(true) => return Capability::Ready,
            Ok(false) => {}
            Err(reason) => {
                warn!("Execution context {} is unreachable: {}", context, reason);
                return Capability::Unreachable(reason);
            }
        }

        if !self.config.auto_provision {
            warn!(
                "curl is missing in {}; enable auto-provisioning to install it",
                context
            );
            return Capability::Unavailable(format!("curl not found in {}", context));
        }

        info!("Installing curl in {}", context);
        let args = self.exec_args(context, true, &["sh", "-c", CURL_INSTALL]);
        match self
            .runner
            .run(&self.config.docker_binary, &args, self.config.provision_timeout)
            .await
        {
            Ok(output) if output.success() => {}
            Ok(output) => {
                return Capability::Unavailable(format!(
                    "installing curl in {} failed: {}",
                    context,
                    output.stderr.trim()
                ))
            }
            Err(e) => {
                return Capability::Unavailable(format!(
                    "installing curl in {} failed: {}",
                    context, e
                ))
            }
        }

        match self.check_curl(context).await {
            Ok(true) => {
                info!("curl installed in {}", context);
                Capability::Ready
            }
            Ok(false) => {
                Capability::Unavailable(format!("curl still missing in {} after install", context))
            }
            Err(reason) => Capability::Unreachable(reason),
        }
    }

    /// `Ok(present)` when the context answered, `Err` when it did not
    async fn check_curl(&self, context: &str) -> Result<bool, String> {
        let args = self.exec_args(context, false, &["sh", "-c", CURL_CHECK]);
        let output = self
            .runner
            .run(&self.config.docker_binary, &args, self.config.check_timeout)
            .await
            .map_err(|e| e.to_string())?;

        if !output.success() {
            return Err(output.stderr.trim().to_string());
        }
        Ok(output.stdout.trim() == "present")
    }

    fn exec_args(&self, context: &str, as_root: bool, command: &[&str]) -> Vec<String> {
        let mut args = vec!["exec".to_string()];
        if as_root {
            args.push("-u".to_string());
            args.push("0".to_string());
        }
        args.push(context.to_string());
        args.extend(command.iter().map(|s| s.to_string()));
        args
    }

    /// Arguments for the container runtime that issue `payload` from `context`
    pub fn curl_args(&self, context: &str, payload: &RequestPayload, timeout: Duration) -> Vec<String> {
        let mut args: Vec<String> = [
            "exec",
            context,
            "curl",
            "-s",
            "-o",
            "/dev/null",
            "-w",
            "%{http_code}",
            "--max-time",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(format!("{:.3}", timeout.as_secs_f64()));

        if self.config.http2_prior_knowledge {
            args.push("--http2-prior-knowledge".to_string());
        }

        args.push("-X".to_string());
        args.push(payload.method.as_str().to_string());
        for (key, value) in &payload.headers {
            args.push("-H".to_string());
            args.push(format!("{}: {}", key, value));
        }
        if let Some(body) = &payload.body {
            args.push("-d".to_string());
            args.push(body.clone());
        }
        args.push(payload.url.clone());
        args
    }
}

/// Map curl's `-w %{http_code}` output and exit code to a status
pub fn status_from_curl(output: &CommandOutput) -> ExecStatus {
    match output.stdout.trim().parse::<u16>() {
        Ok(code) if code > 0 => ExecStatus::Responded(code),
        Ok(_) if output.exit_code == Some(CURL_TIMEOUT_EXIT) => {
            ExecStatus::Failed(FailureReason::Timeout)
        }
        Ok(_) => ExecStatus::Failed(FailureReason::Connection(format!(
            "no response (curl exit {})",
            output
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string())
        ))),
        Err(_) => {
            let detail = if output.stderr.trim().is_empty() {
                format!("unparsable curl output '{}'", output.stdout.trim())
            } else {
                output.stderr.trim().to_string()
            };
            ExecStatus::Failed(FailureReason::Connection(detail))
        }
    }
}

#[async_trait]
impl RemoteExecutor for ContainerExecutor {
    async fn execute(
        &self,
        context: &str,
        payload: &RequestPayload,
        timeout: Duration,
    ) -> ExecStatus {
        match self.capability(context).await {
            Capability::Ready => {}
            Capability::Unavailable(reason) => {
                return ExecStatus::Failed(FailureReason::ExecutorUnavailable(reason))
            }
            Capability::Unreachable(reason) => {
                return ExecStatus::Failed(FailureReason::Connection(reason))
            }
        }

        let args = self.curl_args(context, payload, timeout);
        let deadline = timeout + self.config.timeout_grace;
        debug!(context, method = %payload.method, url = %payload.url, "docker exec curl");

        match self
            .runner
            .run(&self.config.docker_binary, &args, deadline)
            .await
        {
            Ok(output) => status_from_curl(&output),
            Err(e) if e.is_timeout() => ExecStatus::Failed(FailureReason::Timeout),
            Err(e) => ExecStatus::Failed(FailureReason::Connection(e.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "docker"
    }
}
