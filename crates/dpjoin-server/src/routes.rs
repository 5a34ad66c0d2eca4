//! # HTTP Route Handlers
//!
//! Service-level endpoints. The join-order endpoint itself lives in
//! [`join_order`](crate::join_order).
//!
//! ## Error Handling
//!
//! Optimizer errors are returned as HTTP status codes with the error message as body:
//! - 400 Bad Request: invalid input (no relations, zero tuples, duplicate names)
//! - 422 Unprocessable Entity: valid input that is too expensive (size cap, deadline)
//! - 500 Internal Server Error: the optimization task itself failed

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dpjoin_core::error::{ErrorKind, OptimizeError};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /config — the search configuration applied to requests.
pub async fn show_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.search.clone())
}

/// Map an optimizer error onto a status code.
pub fn error_response(err: OptimizeError) -> (StatusCode, String) {
    let status = match err.kind() {
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::ResourceExhausted => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpjoin_core::relation::RelationId;

    #[test]
    fn test_error_status_codes() {
        let (status, body) = error_response(OptimizeError::EmptyRelationSet);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "cannot optimize an empty set of relations");

        let (status, _) = error_response(OptimizeError::DuplicateRelation { id: RelationId(1) });
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_response(OptimizeError::TooManyRelations { count: 20, limit: 16 });
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
