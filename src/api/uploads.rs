// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Presigned media upload URLs.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    auth::{Auth, OwnerId},
    error::ApiError,
    models::{PresignRequest, PresignResponse},
    state::AppState,
    storage::MediaStoreError,
};

/// Upload URLs stay valid for 60 seconds.
const UPLOAD_URL_TTL_SECS: i64 = 60;

#[utoipa::path(
    post,
    path = "/uploads/presign",
    request_body = PresignRequest,
    tag = "Uploads",
    responses(
        (status = 200, body = PresignResponse),
        (status = 400, description = "Missing or invalid fileName/contentType"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn presign_upload(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<PresignRequest>,
) -> Result<Json<PresignResponse>, ApiError> {
    let file_name = request
        .file_name
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("fileName is required"))?;
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
        return Err(ApiError::bad_request(
            "fileName must not contain path separators",
        ));
    }
    request
        .content_type
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("contentType is required"))?;

    // Key layout: <ownerId>/<millis>-<fileName>. The owner prefix is the
    // verified subject id, never request data.
    let owner = OwnerId::from(&user);
    let key = format!("{owner}/{}-{file_name}", Utc::now().timestamp_millis());

    let url = state
        .media
        .presign_put(&key, UPLOAD_URL_TTL_SECS)
        .map_err(|e| match e {
            MediaStoreError::InvalidKey(_) => ApiError::bad_request(e.to_string()),
            _ => ApiError::internal(e.to_string()),
        })?;

    Ok(Json(PresignResponse { url, key }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, IdTokenClaims};
    use crate::storage::{MediaStore, RecordDatabase};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let records = RecordDatabase::open(&dir.path().join("records.redb")).unwrap();
        let media = MediaStore::new(dir.path().join("media"), b"secret", "http://localhost:8080");
        (AppState::new(Arc::new(records), Arc::new(media)), dir)
    }

    fn test_user(sub: &str) -> AuthenticatedUser {
        let claims: IdTokenClaims = serde_json::from_value(json!({ "sub": sub })).unwrap();
        AuthenticatedUser::from_claims(claims)
    }

    #[tokio::test]
    async fn presign_returns_url_and_owner_prefixed_key() {
        let (state, _dir) = test_state();

        let Json(response) = presign_upload(
            Auth(test_user("user-1")),
            State(state),
            Json(PresignRequest {
                file_name: Some("a.wav".into()),
                content_type: Some("audio/wav".into()),
            }),
        )
        .await
        .expect("presign succeeds");

        assert!(response.key.starts_with("user-1/"));
        assert!(response.key.ends_with("-a.wav"));
        assert!(response.url.contains("/media/user-1/"));
        assert!(response.url.contains("expires="));
        assert!(response.url.contains("sig="));
    }

    #[tokio::test]
    async fn missing_file_name_is_rejected() {
        let (state, _dir) = test_state();

        let err = presign_upload(
            Auth(test_user("user-1")),
            State(state),
            Json(PresignRequest {
                file_name: None,
                content_type: Some("audio/wav".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_rejected() {
        let (state, _dir) = test_state();

        let err = presign_upload(
            Auth(test_user("user-1")),
            State(state),
            Json(PresignRequest {
                file_name: Some("a.wav".into()),
                content_type: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn file_name_with_path_separators_is_rejected() {
        let (state, _dir) = test_state();

        for name in ["../../etc/passwd", "a/b.wav", "a\\b.wav"] {
            let err = presign_upload(
                Auth(test_user("user-1")),
                State(state.clone()),
                Json(PresignRequest {
                    file_name: Some(name.into()),
                    content_type: Some("audio/wav".into()),
                }),
            )
            .await
            .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "name {name:?}");
        }
    }
}
