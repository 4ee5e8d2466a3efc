// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Voice endpoints: assistant pass-through and speech synthesis.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    auth::{Auth, OwnerId},
    error::ApiError,
    models::{RecognizeRequest, TtsRequest, TtsResponse},
    state::AppState,
};

/// Synthesized audio download URLs stay valid for 300 seconds.
const TTS_URL_TTL_SECS: i64 = 300;

#[utoipa::path(
    post,
    path = "/voice/recognize",
    request_body = RecognizeRequest,
    tag = "Voice",
    responses(
        (status = 200, description = "Assistant runtime response, passed through verbatim"),
        (status = 400, description = "Missing text/botId/botAliasId"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Assistant runtime failure")
    )
)]
pub async fn recognize(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<RecognizeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let text = request
        .text
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("text is required"))?;
    let bot_id = request
        .bot_id
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("botId is required"))?;
    let bot_alias_id = request
        .bot_alias_id
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("botAliasId is required"))?;

    let assistant = state
        .assistant
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("assistant runtime is not configured"))?;

    // Session continuity: the assistant session is keyed by the verified
    // subject id.
    let response = assistant
        .recognize_text(&bot_id, &bot_alias_id, &user.user_id, &text)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/voice/tts",
    request_body = TtsRequest,
    tag = "Voice",
    responses(
        (status = 200, body = TtsResponse),
        (status = 400, description = "Missing text"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Synthesis or storage failure")
    )
)]
pub async fn tts(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<TtsRequest>,
) -> Result<Json<TtsResponse>, ApiError> {
    let text = request
        .text
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("text is required"))?;

    let speech = state
        .speech
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("speech synthesis is not configured"))?;

    let audio = speech
        .synthesize(&text)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let owner = OwnerId::from(&user);
    let key = format!("{owner}/tts-{}.mp3", Utc::now().timestamp_millis());

    state
        .media
        .put(&key, "audio/mpeg", &audio)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let url = state
        .media
        .presign_get(&key, TTS_URL_TTL_SECS)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(owner = %owner, key = %key, bytes = audio.len(), "stored synthesized audio");

    Ok(Json(TtsResponse { url }))
}
