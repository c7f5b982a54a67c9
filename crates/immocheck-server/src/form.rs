use axum::extract::State;
use axum::response::Html;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET / — the single-page agent form. One embedded HTML file; the page
/// talks to the JSON API with fetch().
pub async fn form_page() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// GET /api/config — the pieces of config the form needs to render itself:
/// site names and their buildings. Secrets never leave the server.
pub async fn form_config(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let properties: Vec<serde_json::Value> = app
        .config
        .properties
        .iter()
        .map(|site| {
            serde_json::json!({
                "name": site.name,
                "buildings": site.buildings,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "project": app.config.project,
        "properties": properties,
        "duplicate_policy": app.config.lookup.duplicate_policy,
    })))
}
