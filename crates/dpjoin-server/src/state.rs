//! # Application State
//!
//! Shared state available to every HTTP request handler. It is created once at server
//! startup and shared via `Arc` across concurrent requests.
//!
//! ## Components
//!
//! - **Cost Model**: estimates the cardinality of each join candidate. Shared because
//!   it is stateless.
//! - **Optimizer Config**: bind address and the default search configuration (input
//!   cap, deadline, enumeration policy, strategy) applied to every request.
//!
//! Memo tables are deliberately absent: each request optimizes with its own
//! `JoinOptimizer`, so no search state crosses requests.

use dpjoin_core::cost::{CostModel, DefaultCostModel};
use dpjoin_core::search::SearchConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Server-level optimizer configuration.
pub struct OptimizerConfig {
    /// Socket address the server listens on.
    pub bind_addr: String,
    /// Search settings applied to every request. Requests may pick the enumeration
    /// policy and strategy but never raise `max_relations` or the deadline.
    pub search: SearchConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            search: SearchConfig {
                deadline: Some(Duration::from_millis(5000)),
                ..SearchConfig::default()
            },
        }
    }
}

impl OptimizerConfig {
    /// Defaults overridden by `DPJOIN_ADDR`, `DPJOIN_MAX_RELATIONS`, and
    /// `DPJOIN_DEADLINE_MS`. Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("DPJOIN_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(raw) = lookup("DPJOIN_MAX_RELATIONS") {
            match raw.parse::<usize>() {
                Ok(n) => config.search.max_relations = n,
                Err(e) => warn!("Ignoring DPJOIN_MAX_RELATIONS={:?}: {}", raw, e),
            }
        }
        if let Some(raw) = lookup("DPJOIN_DEADLINE_MS") {
            match raw.parse::<u64>() {
                // 0 disables the deadline.
                Ok(0) => config.search.deadline = None,
                Ok(ms) => config.search.deadline = Some(Duration::from_millis(ms)),
                Err(e) => warn!("Ignoring DPJOIN_DEADLINE_MS={:?}: {}", raw, e),
            }
        }
        config
    }
}

/// Shared application state, accessible by all request handlers via Axum's State extractor.
pub struct AppState {
    /// The cost model used to score join candidates.
    pub cost_model: Arc<dyn CostModel>,
    pub config: OptimizerConfig,
}

impl AppState {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            cost_model: Arc::new(DefaultCostModel),
            config,
        }
    }
}
