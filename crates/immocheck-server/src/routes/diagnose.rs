use axum::extract::State;
use axum::Json;
use gemini_agent::{DiagnoseRequest, GeminiClient, GeminiConfig, InlineImage};
use immocheck_core::config::Config;
use immocheck_core::record::UnitKey;
use immocheck_core::verdict::{diagnosis_prompt, parse_verdict};
use immocheck_core::{ledger, letter};
use serde::Deserialize;
use std::time::Duration;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DiagnoseBody {
    pub property: String,
    #[serde(default)]
    pub building: Option<String>,
    pub unit: String,
    pub note: String,
    /// Photo of the issue, base64-encoded by the form.
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub image_mime: Option<String>,
}

/// POST /api/diagnose — run the note and photo through the model, parse the
/// verdict, append it to the history ledger, and return a drafted letter.
pub async fn diagnose(
    State(app): State<AppState>,
    Json(body): Json<DiagnoseBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.note.trim().is_empty() {
        return Err(AppError::bad_request("note is required"));
    }

    let result = tokio::task::spawn_blocking(move || {
        let key = UnitKey::new(body.property, body.building, body.unit);
        app.config.validate_key(&key)?;

        let occupant = {
            let store = app.store();
            store.find_occupant(&key).unwrap_or_default().to_string()
        };

        let model_cfg = &app.config.model;
        let api_key = Config::secret(&model_cfg.api_key_env)?;
        let client = GeminiClient::new(GeminiConfig {
            api_base: model_cfg.api_base.clone(),
            api_key,
            name_hint: model_cfg.name_hint.clone(),
            fallback: model_cfg.fallback.clone(),
            timeout: Duration::from_secs(model_cfg.timeout_seconds),
        })
        .map_err(anyhow::Error::from)?;

        let prompt = diagnosis_prompt(&body.note);
        let request = match (body.image_base64, body.image_mime) {
            (Some(data), mime) => DiagnoseRequest::with_image(
                prompt,
                InlineImage {
                    mime_type: mime.unwrap_or_else(|| "image/jpeg".to_string()),
                    data,
                },
            ),
            (None, _) => DiagnoseRequest::text(prompt),
        };

        let diagnosis = client.diagnose(&request).map_err(anyhow::Error::from)?;
        let verdict = parse_verdict(&diagnosis.text);

        let entry = ledger::DiagnosticEntry::new(
            key.clone(),
            occupant.clone(),
            body.note.clone(),
            verdict.liability,
            diagnosis.model.clone(),
            verdict.body.clone(),
        );
        ledger::append(&app.root, &entry)?;

        let draft = letter::render(&letter::LetterInput {
            kind: letter::LetterKind::Postal,
            occupant: occupant.clone(),
            key: key.clone(),
            issue: body.note.clone(),
            liability: verdict.liability,
            date: chrono::Utc::now(),
        });

        Ok::<_, anyhow::Error>(serde_json::json!({
            "model": diagnosis.model,
            "liability": verdict.liability,
            "response": verdict.body,
            "occupant": occupant,
            "letter": draft,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
