// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

use axum::{extract::State, http::StatusCode, Json};

use crate::models::{HealthResponse, ReadyChecks, ReadyResponse};
use crate::state::AppState;

/// Liveness probe handler.
///
/// Always returns the static success payload if the process is running.
/// Does not check dependencies - use readiness for that.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

fn check_records(state: &AppState) -> String {
    match state.records.health_check() {
        Ok(()) => "ok".to_string(),
        Err(_) => "unavailable".to_string(),
    }
}

fn check_media(state: &AppState) -> String {
    if state.media.root().exists() {
        "ok".to_string()
    } else {
        "missing".to_string()
    }
}

/// Check identity-provider key availability (production auth mode only).
async fn check_auth_keys(state: &AppState) -> Option<String> {
    let keys = state.auth.keys.as_ref()?;
    if keys.is_cached().await {
        return Some("ok".to_string());
    }
    match keys.refresh().await {
        Ok(()) => Some("ok".to_string()),
        Err(_) => Some("unavailable".to_string()),
    }
}

/// Readiness probe handler.
///
/// Returns 200 only if all dependencies are available, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let records = check_records(&state);
    let media = check_media(&state);
    let auth_keys = check_auth_keys(&state).await;

    let all_ok = records == "ok"
        && media == "ok"
        && auth_keys.as_deref().map(|s| s == "ok").unwrap_or(true);

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: ReadyChecks {
            service: "ok".to_string(),
            records,
            media,
            auth_keys,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MediaStore, RecordDatabase};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_state(create_media_root: bool) -> (AppState, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let records = RecordDatabase::open(&dir.path().join("records.redb")).unwrap();
        let media_root = dir.path().join("media");
        if create_media_root {
            std::fs::create_dir_all(&media_root).unwrap();
        }
        let media = MediaStore::new(media_root, b"secret", "http://localhost:8080");
        (AppState::new(Arc::new(records), Arc::new(media)), dir)
    }

    #[tokio::test]
    async fn health_is_static_ok() {
        let Json(response) = health().await;
        assert!(response.ok);
    }

    #[tokio::test]
    async fn readiness_passes_with_all_dependencies() {
        let (state, _dir) = test_state(true);
        let (status, Json(response)) = readiness(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.status, "ok");
        assert_eq!(response.checks.records, "ok");
        assert_eq!(response.checks.media, "ok");
        // Dev mode: no key set configured, so no auth check reported.
        assert!(response.checks.auth_keys.is_none());
    }

    #[tokio::test]
    async fn readiness_degrades_without_media_root() {
        let (state, _dir) = test_state(false);
        let (status, Json(response)) = readiness(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.status, "degraded");
        assert_eq!(response.checks.media, "missing");
    }
}
