//! Liveness probes for sender contexts

use async_trait::async_trait;
use nfstress_core::{CoreError, LivenessProbe};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::process::{CommandRunner, TokioCommandRunner};

/// Lists running containers with `docker ps`
pub struct DockerProbe {
    runner: Arc<dyn CommandRunner>,
    docker_binary: String,
    timeout: Duration,
}

impl DockerProbe {
    pub fn new(docker_binary: impl Into<String>) -> Self {
        Self::with_runner(docker_binary, Arc::new(TokioCommandRunner))
    }

    pub fn with_runner(docker_binary: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            docker_binary: docker_binary.into(),
            timeout: Duration::from_secs(15),
        }
    }

    async fn running_containers(&self) -> nfstress_core::Result<HashSet<String>> {
        let args: Vec<String> = ["ps", "--format", "{{.Names}}"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let output = self
            .runner
            .run(&self.docker_binary, &args, self.timeout)
            .await
            .map_err(|e| CoreError::Discovery(e.to_string()))?;

        if !output.success() {
            return Err(CoreError::Discovery(format!(
                "{} ps failed: {}",
                self.docker_binary,
                output.stderr.trim()
            )));
        }

        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[async_trait]
impl LivenessProbe for DockerProbe {
    async fn list_available(&self, candidates: &[String]) -> nfstress_core::Result<Vec<String>> {
        let running = self.running_containers().await?;
        debug!("{} containers running", running.len());

        Ok(candidates
            .iter()
            .filter(|candidate| running.contains(candidate.as_str()))
            .cloned()
            .collect())
    }
}

/// Treats every candidate as reachable
#[derive(Debug, Clone, Default)]
pub struct StaticProbe;

#[async_trait]
impl LivenessProbe for StaticProbe {
    async fn list_available(&self, candidates: &[String]) -> nfstress_core::Result<Vec<String>> {
        Ok(candidates.to_vec())
    }
}
