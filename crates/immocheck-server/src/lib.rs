pub mod error;
pub mod form;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post};
use axum::Router;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: &Path) -> immocheck_core::Result<Router> {
    let app_state = state::AppState::new(root)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        // Form page
        .route("/", get(form::form_page))
        .route("/api/config", get(form::form_config))
        // Directory
        .route("/api/directory", get(routes::directory::list_directory))
        .route("/api/directory", post(routes::directory::upsert_record))
        .route("/api/directory", delete(routes::directory::remove_by_key))
        .route(
            "/api/directory/refresh",
            post(routes::directory::refresh_directory),
        )
        .route(
            "/api/directory/occupant",
            get(routes::directory::find_occupant),
        )
        .route(
            "/api/directory/by-name/{name}",
            delete(routes::directory::remove_by_name),
        )
        // Diagnosis
        .route("/api/diagnose", post(routes::diagnose::diagnose))
        // Letters
        .route("/api/letter", post(routes::letter::render_letter))
        // History
        .route("/api/history", get(routes::history::list_history))
        .layer(cors)
        .with_state(app_state))
}

/// Start the ImmoCheck form server.
pub async fn serve(root: &Path, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let app = build_router(root)?;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("ImmoCheck form listening on http://localhost:{port}");

    if open_browser {
        let url = format!("http://localhost:{port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}

/// Start the form server on a pre-bound listener, so the caller can read the
/// actual port first (useful when `port = 0` and the OS picks one).
pub async fn serve_on(
    root: &Path,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root)?;

    tracing::info!("ImmoCheck form listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
