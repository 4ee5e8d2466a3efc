// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Signed media object endpoints.
//!
//! These back the URLs minted by `/uploads/presign` and `/voice/tts`.
//! Access is authorized by the HMAC signature in the query string, not by a
//! bearer token; the signature binds method, key, and expiry.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::ApiError, state::AppState, storage::MediaStoreError};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SignedLinkQuery {
    /// Unix timestamp the link expires at.
    pub expires: i64,
    /// HMAC signature over method, key, and expiry.
    pub sig: String,
}

fn map_media_error(error: MediaStoreError) -> ApiError {
    match error {
        MediaStoreError::SignatureMismatch | MediaStoreError::LinkExpired => {
            ApiError::new(StatusCode::FORBIDDEN, "invalid or expired link")
        }
        MediaStoreError::InvalidKey(_) => ApiError::bad_request(error.to_string()),
        MediaStoreError::NotFound(_) => ApiError::not_found(error.to_string()),
        MediaStoreError::Io(_) | MediaStoreError::Serde(_) => ApiError::internal(error.to_string()),
    }
}

#[utoipa::path(
    put,
    path = "/media/{key}",
    params(
        ("key" = String, Path, description = "Object key"),
        SignedLinkQuery
    ),
    request_body = Vec<u8>,
    tag = "Media",
    responses(
        (status = 200, description = "Object stored"),
        (status = 403, description = "Invalid or expired link")
    )
)]
pub async fn put_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(link): Query<SignedLinkQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .media
        .verify("PUT", &key, link.expires, &link.sig)
        .map_err(map_media_error)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    state
        .media
        .put(&key, content_type, &body)
        .map_err(map_media_error)?;

    tracing::info!(key = %key, bytes = body.len(), "stored uploaded object");

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[utoipa::path(
    get,
    path = "/media/{key}",
    params(
        ("key" = String, Path, description = "Object key"),
        SignedLinkQuery
    ),
    tag = "Media",
    responses(
        (status = 200, description = "Object bytes with stored content type"),
        (status = 403, description = "Invalid or expired link"),
        (status = 404, description = "Object not found")
    )
)]
pub async fn get_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(link): Query<SignedLinkQuery>,
) -> Result<Response, ApiError> {
    state
        .media
        .verify("GET", &key, link.expires, &link.sig)
        .map_err(map_media_error)?;

    let (data, content_type) = state.media.get(&key).map_err(map_media_error)?;

    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MediaStore, RecordDatabase};
    use axum::body::to_bytes;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let records = RecordDatabase::open(&dir.path().join("records.redb")).unwrap();
        let media = MediaStore::new(dir.path().join("media"), b"secret", "http://localhost:8080");
        (AppState::new(Arc::new(records), Arc::new(media)), dir)
    }

    /// Pull `expires` and `sig` back out of a presigned URL.
    fn parse_link(url: &str) -> SignedLinkQuery {
        let expires = url
            .split("expires=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap()
            .parse()
            .unwrap();
        let sig = url.split("sig=").nth(1).unwrap().to_string();
        SignedLinkQuery { expires, sig }
    }

    #[tokio::test]
    async fn signed_put_then_get_round_trips() {
        let (state, _dir) = test_state();
        let key = "user-1/1700000000-a.wav";

        let put_url = state.media.presign_put(key, 60).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "audio/wav".parse().unwrap());

        put_object(
            State(state.clone()),
            Path(key.to_string()),
            Query(parse_link(&put_url)),
            headers,
            Bytes::from_static(b"wav bytes"),
        )
        .await
        .expect("signed upload succeeds");

        let get_url = state.media.presign_get(key, 60).unwrap();
        let response = get_object(
            State(state),
            Path(key.to_string()),
            Query(parse_link(&get_url)),
        )
        .await
        .expect("signed download succeeds");

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "audio/wav"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"wav bytes");
    }

    #[tokio::test]
    async fn bad_signature_is_forbidden() {
        let (state, _dir) = test_state();

        let err = put_object(
            State(state),
            Path("user-1/a.wav".to_string()),
            Query(SignedLinkQuery {
                expires: i64::MAX,
                sig: "bogus".to_string(),
            }),
            HeaderMap::new(),
            Bytes::from_static(b"x"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn put_link_does_not_authorize_get() {
        let (state, _dir) = test_state();
        let key = "user-1/a.wav";
        state.media.put(key, "audio/wav", b"data").unwrap();

        let put_url = state.media.presign_put(key, 60).unwrap();
        let err = get_object(
            State(state),
            Path(key.to_string()),
            Query(parse_link(&put_url)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn get_of_missing_object_is_not_found() {
        let (state, _dir) = test_state();
        let key = "user-1/missing.wav";

        let get_url = state.media.presign_get(key, 60).unwrap();
        let err = get_object(
            State(state),
            Path(key.to_string()),
            Query(parse_link(&get_url)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
