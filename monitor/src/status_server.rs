use std::net::SocketAddr;

use anyhow::Result;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

#[derive(Serialize)]
struct HealthFactorResponse {
    health_factor: Option<String>,
    as_of: String,
}

/// Serves the observer's published value over HTTP.
///
/// `/health` answers "OK" for liveness probes; `/health-factor` returns the
/// most recently published health factor, or null while none has been
/// fetched yet.
pub async fn start_status_server(health_factor: watch::Receiver<Option<String>>) -> Result<()> {
    let receiver = health_factor.clone();
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/health-factor",
            get(move || {
                let receiver = receiver.clone();
                async move {
                    Json(HealthFactorResponse {
                        health_factor: receiver.borrow().clone(),
                        as_of: Utc::now().to_rfc3339(),
                    })
                }
            }),
        );

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    info!("Starting status server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
