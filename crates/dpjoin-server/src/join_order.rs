//! # Join-Order Optimization Endpoint
//!
//! JSON protocol for asking the optimizer for a join order. The client sends its base
//! relations (tuple count and attribute names); the service registers them in a fresh
//! catalog, runs the memoized search, and returns the winning join tree.
//!
//! ## Wire Protocol
//!
//! - Request: `POST /optimize/join-order` with JSON body (`JoinOrderRequest`)
//! - Response: JSON body (`JoinOrderResponse`) with the optimized join tree
//!
//! Relations without a name are labelled `T<id>` with sequential ids, skipping any
//! label a named relation already holds.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use dpjoin_core::catalog::InMemoryCatalog;
use dpjoin_core::error::{OptimizeError, Result};
use dpjoin_core::plan::JoinPlan;
use dpjoin_core::search::{JoinOptimizer, SearchConfig, SearchStats, SearchStrategy};
use dpjoin_core::subset::EnumerationPolicy;

use crate::routes::error_response;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// JSON wire-protocol types
// ---------------------------------------------------------------------------

/// Request body for `POST /optimize/join-order`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinOrderRequest {
    /// Base relations to join. Order does not affect the result.
    pub relations: Vec<RelationInfo>,
    /// Overrides the server's enumeration policy.
    #[serde(default)]
    pub enumeration: Option<EnumerationPolicy>,
    /// Overrides the server's search strategy.
    #[serde(default)]
    pub strategy: Option<SearchStrategy>,
}

/// A base relation in the request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationInfo {
    /// Display name; unique within the request when given.
    #[serde(default)]
    pub name: Option<String>,
    /// Tuple count; must be positive.
    pub tuples: u64,
    /// Attribute names; unique within the relation.
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Response body from the join-order endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinOrderResponse {
    pub tree: JoinTreeNode,
    /// Estimated tuple count of the root.
    pub tuples: u64,
    /// Nested `(a x (b x c))` rendering.
    pub rendered: String,
    /// Number of relation subsets solved.
    pub memo_entries: usize,
    pub stats: SearchStats,
}

/// A node in the optimized join tree.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JoinTreeNode {
    /// A base relation, referenced by its label.
    Leaf { relation: String, tuples: u64 },
    /// A join of two subtrees.
    Join {
        tuples: u64,
        left: Box<JoinTreeNode>,
        right: Box<JoinTreeNode>,
    },
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// POST /optimize/join-order — find the cheapest bushy join tree.
///
/// The search is CPU-bound, so it runs on tokio's blocking pool with a per-request
/// optimizer.
pub async fn optimize_join_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JoinOrderRequest>,
) -> std::result::Result<Json<JoinOrderResponse>, (StatusCode, String)> {
    let catalog = build_catalog(&req).map_err(error_response)?;
    let config = search_config(&req, &state.config.search);
    let cost_model = state.cost_model.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        let mut optimizer = JoinOptimizer::new(cost_model, config);
        let plan = optimizer.optimize_catalog(&catalog)?;
        Ok::<_, OptimizeError>((plan, optimizer.memo().len(), optimizer.stats()))
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Optimization task failed: {}", e),
        )
    })?;

    let (plan, memo_entries, stats) = outcome.map_err(error_response)?;

    Ok(Json(JoinOrderResponse {
        tree: plan_to_tree(&plan),
        tuples: plan.tuples(),
        rendered: plan.to_string(),
        memo_entries,
        stats,
    }))
}

// ---------------------------------------------------------------------------
// Request → catalog
// ---------------------------------------------------------------------------

/// Register every request relation in a fresh catalog, in request order.
fn build_catalog(req: &JoinOrderRequest) -> Result<InMemoryCatalog> {
    if req.relations.is_empty() {
        return Err(OptimizeError::EmptyRelationSet);
    }

    let mut catalog = InMemoryCatalog::new();
    for info in &req.relations {
        let attributes = info.attributes.iter().cloned();
        match &info.name {
            Some(name) => catalog.add_named_relation(name.clone(), info.tuples, attributes)?,
            None => catalog.add_relation(info.tuples, attributes)?,
        };
    }
    Ok(catalog)
}

/// The server's configuration with the request's policy overrides applied.
fn search_config(req: &JoinOrderRequest, defaults: &SearchConfig) -> SearchConfig {
    let mut config = defaults.clone();
    if let Some(enumeration) = req.enumeration {
        config.enumeration = enumeration;
    }
    if let Some(strategy) = req.strategy {
        config.strategy = strategy;
    }
    config
}

// ---------------------------------------------------------------------------
// Plan → response conversion
// ---------------------------------------------------------------------------

fn plan_to_tree(plan: &JoinPlan) -> JoinTreeNode {
    match plan {
        JoinPlan::Leaf(relation) => JoinTreeNode::Leaf {
            relation: relation.label(),
            tuples: relation.tuples(),
        },
        JoinPlan::Join {
            left, right, tuples, ..
        } => JoinTreeNode::Join {
            tuples: *tuples,
            left: Box::new(plan_to_tree(left)),
            right: Box::new(plan_to_tree(right)),
        },
    }
}
