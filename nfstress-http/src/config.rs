//! HTTP executor configuration

use nfstress_config::ExecutorConfig;

/// Client-level settings; the per-request timeout comes with each call
#[derive(Debug, Clone)]
pub struct HttpExecutorConfig {
    /// User agent string
    pub user_agent: String,

    /// Speak HTTP/2 without an upgrade (the OAI SBI default on port 8080)
    pub http2_prior_knowledge: bool,

    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpExecutorConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("nfstress/{}", env!("CARGO_PKG_VERSION")),
            http2_prior_knowledge: false,
            pool_max_idle_per_host: 32,
        }
    }
}

impl From<&ExecutorConfig> for HttpExecutorConfig {
    fn from(config: &ExecutorConfig) -> Self {
        Self {
            http2_prior_knowledge: config.http2_prior_knowledge,
            ..Self::default()
        }
    }
}
