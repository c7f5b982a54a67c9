use axum::extract::State;
use axum::Json;
use immocheck_core::letter::{render, LetterInput, LetterKind};
use immocheck_core::record::UnitKey;
use immocheck_core::verdict::Liability;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LetterBody {
    #[serde(default)]
    pub kind: LetterKind,
    pub property: String,
    #[serde(default)]
    pub building: Option<String>,
    pub unit: String,
    /// Defaults to the directory's current occupant for the unit.
    #[serde(default)]
    pub occupant: Option<String>,
    pub issue: String,
    pub liability: Liability,
}

/// POST /api/letter — interpolate a postal letter or email draft.
pub async fn render_letter(
    State(app): State<AppState>,
    Json(body): Json<LetterBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.issue.trim().is_empty() {
        return Err(AppError::bad_request("issue is required"));
    }

    let result = tokio::task::spawn_blocking(move || {
        let key = UnitKey::new(body.property, body.building, body.unit);
        app.config.validate_key(&key)?;

        let occupant = match body.occupant {
            Some(name) => name,
            None => {
                let store = app.store();
                store.find_occupant(&key).unwrap_or_default().to_string()
            }
        };

        let text = render(&LetterInput {
            kind: body.kind,
            occupant,
            key,
            issue: body.issue,
            liability: body.liability,
            date: chrono::Utc::now(),
        });
        Ok::<_, immocheck_core::ImmoError>(serde_json::json!({ "letter": text }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
