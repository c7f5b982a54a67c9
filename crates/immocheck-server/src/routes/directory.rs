use axum::extract::{Path, Query, State};
use axum::Json;
use immocheck_core::record::UnitKey;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared body / query shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UnitQuery {
    pub property: String,
    #[serde(default)]
    pub building: Option<String>,
    pub unit: String,
}

impl UnitQuery {
    fn into_key(self) -> UnitKey {
        UnitKey::new(self.property, self.building, self.unit)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/directory — the cached table.
pub async fn list_directory(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let store = app.store();
        let records: Vec<serde_json::Value> = store
            .records()
            .iter()
            .map(|r| {
                serde_json::json!({
                    "property": r.key.property,
                    "building": r.key.building,
                    "unit": r.key.unit,
                    "occupant": r.occupant,
                })
            })
            .collect();
        serde_json::json!({ "records": records })
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    Ok(Json(result))
}

/// POST /api/directory/refresh — explicit whole-table re-read.
pub async fn refresh_directory(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let mut store = app.store();
        store.refresh_or_empty();
        serde_json::json!({ "records": store.records().len() })
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct UpsertBody {
    pub property: String,
    #[serde(default)]
    pub building: Option<String>,
    pub unit: String,
    #[serde(default)]
    pub occupant: String,
}

/// POST /api/directory — insert or update one unit's occupant.
pub async fn upsert_record(
    State(app): State<AppState>,
    Json(body): Json<UpsertBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.property.trim().is_empty() || body.unit.trim().is_empty() {
        return Err(AppError::bad_request("property and unit are required"));
    }

    let result = tokio::task::spawn_blocking(move || {
        let key = UnitKey::new(body.property, body.building, body.unit);
        app.config.validate_key(&key)?;

        let mut store = app.store();
        store.upsert(key.clone(), body.occupant.clone())?;
        Ok::<_, immocheck_core::ImmoError>(serde_json::json!({
            "property": key.property,
            "building": key.building,
            "unit": key.unit,
            "occupant": body.occupant,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/directory/occupant — current occupant for one unit.
pub async fn find_occupant(
    State(app): State<AppState>,
    Query(query): Query<UnitQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let key = query.into_key();
        let store = app.store();
        let occupant = store.find_occupant(&key).map(str::to_string);
        serde_json::json!({ "occupant": occupant })
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    Ok(Json(result))
}

/// DELETE /api/directory/by-name/{name} — legacy deletion by occupant name.
/// Removes the name from every unit it occupies (kept, documented behavior).
pub async fn remove_by_name(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let mut store = app.store();
        let removed = store.remove_by_name(&name)?;
        if removed == 0 {
            return Err(immocheck_core::ImmoError::OccupantNotFound(name));
        }
        Ok(serde_json::json!({ "removed": removed }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/directory — corrected deletion by unit key.
pub async fn remove_by_key(
    State(app): State<AppState>,
    Query(query): Query<UnitQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let key = query.into_key();
        let mut store = app.store();
        let removed = store.remove_by_key(&key)?;
        if removed == 0 {
            return Err(immocheck_core::ImmoError::RecordNotFound(key.to_string()));
        }
        Ok(serde_json::json!({ "removed": removed }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
