// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Record create/list endpoints.
//!
//! The owner namespace always comes from the verified token subject; the
//! request body only ever contributes `dataType` and `payload`.

use axum::{extract::State, Json};

use crate::{
    auth::{Auth, OwnerId},
    error::ApiError,
    models::{CreateRecordRequest, CreateRecordResponse, Record},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/records",
    request_body = CreateRecordRequest,
    tag = "Records",
    responses(
        (status = 200, body = CreateRecordResponse),
        (status = 400, description = "Missing dataType or payload"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_record(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateRecordRequest>,
) -> Result<Json<CreateRecordResponse>, ApiError> {
    let data_type = request
        .data_type
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("dataType is required"))?;
    let payload = request
        .payload
        .ok_or_else(|| ApiError::bad_request("payload is required"))?;

    let owner = OwnerId::from(&user);
    let record = state
        .records
        .create(&owner, data_type, payload)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(owner = %owner, record_id = %record.record_id, "created record");

    Ok(Json(CreateRecordResponse {
        ok: true,
        id: record.record_id,
    }))
}

#[utoipa::path(
    get,
    path = "/records",
    tag = "Records",
    responses(
        (status = 200, body = [Record]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_records(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let owner = OwnerId::from(&user);
    let records = state
        .records
        .list(&owner)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(records))
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
    async fn create_then_list_round_trips() {
        let (state, _dir) = test_state();

        let Json(created) = create_record(
            Auth(test_user("abc")),
            State(state.clone()),
            Json(CreateRecordRequest {
                data_type: Some("symptom".into()),
                payload: Some(json!({"note": "sore throat"})),
            }),
        )
        .await
        .expect("create succeeds");

        assert!(created.ok);
        assert!(!created.id.is_empty());

        let Json(records) = list_records(Auth(test_user("abc")), State(state))
            .await
            .expect("list succeeds");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_id, created.id);
        assert_eq!(records[0].data_type, "symptom");
        assert_eq!(records[0].owner_id, "abc");
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_verified_subject() {
        let (state, _dir) = test_state();

        create_record(
            Auth(test_user("abc")),
            State(state.clone()),
            Json(CreateRecordRequest {
                data_type: Some("symptom".into()),
                payload: Some(json!({"note": "headache"})),
            }),
        )
        .await
        .unwrap();

        // A request verified as a different subject sees nothing, regardless
        // of anything it might claim in the request.
        let Json(records) = list_records(Auth(test_user("xyz")), State(state))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn list_without_records_is_empty_not_error() {
        let (state, _dir) = test_state();
        let Json(records) = list_records(Auth(test_user("fresh")), State(state))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn missing_data_type_is_rejected_without_a_write() {
        let (state, _dir) = test_state();

        let err = create_record(
            Auth(test_user("abc")),
            State(state.clone()),
            Json(CreateRecordRequest {
                data_type: None,
                payload: Some(json!({})),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let Json(records) = list_records(Auth(test_user("abc")), State(state))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn missing_payload_is_rejected() {
        let (state, _dir) = test_state();

        let err = create_record(
            Auth(test_user("abc")),
            State(state),
            Json(CreateRecordRequest {
                data_type: Some("symptom".into()),
                payload: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn concurrent_creates_yield_distinct_records() {
        let (state, _dir) = test_state();

        let mut handles = Vec::new();
        for i in 0..8 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                let Json(response) = create_record(
                    Auth(test_user("abc")),
                    State(state),
                    Json(CreateRecordRequest {
                        data_type: Some("entry".into()),
                        payload: Some(json!({ "seq": i })),
                    }),
                )
                .await
                .unwrap();
                response.id
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }

        let Json(records) = list_records(Auth(test_user("abc")), State(state))
            .await
            .unwrap();
        assert_eq!(records.len(), 8);
    }
}
