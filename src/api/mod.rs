// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        CreateRecordRequest, CreateRecordResponse, HealthResponse, PresignRequest,
        PresignResponse, ReadyChecks, ReadyResponse, Record, RecognizeRequest, TtsRequest,
        TtsResponse,
    },
    state::AppState,
};

pub mod health;
pub mod media;
pub mod records;
pub mod uploads;
pub mod voice;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route(
            "/records",
            get(records::list_records).post(records::create_record),
        )
        .route("/uploads/presign", post(uploads::presign_upload))
        .route("/voice/recognize", post(voice::recognize))
        .route("/voice/tts", post(voice::tts))
        .route(
            "/media/{*key}",
            put(media::put_object).get(media::get_object),
        )
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::readiness,
        records::create_record,
        records::list_records,
        uploads::presign_upload,
        voice::recognize,
        voice::tts,
        media::put_object,
        media::get_object
    ),
    components(
        schemas(
            Record,
            CreateRecordRequest,
            CreateRecordResponse,
            HealthResponse,
            ReadyResponse,
            ReadyChecks,
            PresignRequest,
            PresignResponse,
            RecognizeRequest,
            TtsRequest,
            TtsResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Records", description = "Per-user journal records"),
        (name = "Uploads", description = "Presigned media uploads"),
        (name = "Voice", description = "Assistant pass-through and speech synthesis"),
        (name = "Media", description = "Signed media object access")
    )
)]
struct ApiDoc;
