// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation. Wire field names are camelCase.
//!
//! ## Model Categories
//!
//! - **Records**: per-user journal entries (the core data model)
//! - **Uploads**: presigned media upload URLs
//! - **Voice**: assistant pass-through and speech synthesis

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Record Models
// =============================================================================

/// A single user-submitted journal record.
///
/// Records are immutable once created. The composite storage key is
/// `(ownerId, recordId)`; the owner id always comes from the verified
/// identity token, never from the request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Verified subject id of the owning user.
    pub owner_id: String,
    /// Server-generated identifier, unique within the owner's namespace.
    pub record_id: String,
    /// Caller-supplied categorical label (e.g. "symptom").
    pub data_type: String,
    /// Caller-supplied structured data, opaque to the store.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    /// Server-assigned creation time, milliseconds since epoch.
    pub created_at: i64,
}

/// Request body for creating a record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    /// Categorical label for the record.
    #[serde(default)]
    pub data_type: Option<String>,
    /// Arbitrary structured payload.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Value>,
}

/// Response for a successful record creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRecordResponse {
    pub ok: bool,
    /// The generated record id.
    pub id: String,
}

// =============================================================================
// Health Models
// =============================================================================

/// Static liveness payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Readiness response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall status ("ok" or "degraded").
    pub status: String,
    /// Individual checks and their results.
    pub checks: ReadyChecks,
}

/// Individual readiness check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Record database availability.
    pub records: String,
    /// Media store root availability.
    pub media: String,
    /// Identity-provider key set status.
    /// Only present when signature verification is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_keys: Option<String>,
}

// =============================================================================
// Upload Models
// =============================================================================

/// Request body for a presigned upload URL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    /// File name for the uploaded object (no path separators).
    #[serde(default)]
    pub file_name: Option<String>,
    /// MIME type the upload will carry.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// A time-limited signed upload URL and the object key it writes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PresignResponse {
    /// Signed PUT URL, valid for 60 seconds.
    pub url: String,
    /// Object key, prefixed with the caller's subject id.
    pub key: String,
}

// =============================================================================
// Voice Models
// =============================================================================

/// Request body for assistant text interaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeRequest {
    /// User utterance to send to the assistant.
    #[serde(default)]
    pub text: Option<String>,
    /// Assistant bot identifier.
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Assistant bot alias identifier.
    #[serde(default)]
    pub bot_alias_id: Option<String>,
}

/// Request body for speech synthesis.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TtsRequest {
    /// Text to synthesize.
    #[serde(default)]
    pub text: Option<String>,
}

/// Response carrying a time-limited URL to the synthesized audio.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TtsResponse {
    /// Signed GET URL, valid for 300 seconds.
    pub url: String,
}
