use axum::extract::{Query, State};
use axum::Json;
use immocheck_core::ledger;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// GET /api/history — most recent diagnostic entries, newest first.
pub async fn list_history(
    State(app): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let entries = ledger::recent(&app.root, query.limit)?;
        Ok::<_, immocheck_core::ImmoError>(serde_json::json!({ "entries": entries }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
