// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

use std::{net::SocketAddr, sync::Arc};

use carelog_server::{
    api::router,
    auth::KeySetCache,
    config::Config,
    providers::{AssistantClient, SpeechClient},
    state::{AppState, AuthConfig},
    storage::{media_root, records_db_path, MediaStore, RecordDatabase},
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env().expect("Invalid configuration");

    std::fs::create_dir_all(&config.data_dir).expect("Failed to create data directory");
    std::fs::create_dir_all(media_root(&config.data_dir))
        .expect("Failed to create media directory");

    let records = RecordDatabase::open(&records_db_path(&config.data_dir))
        .expect("Failed to open record database");
    let media = MediaStore::new(
        media_root(&config.data_dir),
        config.media_signing_secret.as_bytes(),
        config.public_base_url.clone(),
    );

    let auth = match config.auth_issuer.clone() {
        Some(issuer) => AuthConfig {
            keys: Some(KeySetCache::new(issuer.clone())),
            issuer: Some(issuer),
            audience: config.auth_client_id.clone(),
        },
        None => {
            tracing::warn!("AUTH_ISSUER not set - running without signature verification");
            AuthConfig::default()
        }
    };

    let mut state = AppState::new(Arc::new(records), Arc::new(media)).with_auth_config(auth);

    if let Some(ref base_url) = config.assistant_base_url {
        state = state.with_assistant(AssistantClient::new(
            base_url.clone(),
            config.assistant_locale.clone(),
        ));
    }
    if let Some(ref base_url) = config.speech_base_url {
        state = state.with_speech(SpeechClient::new(
            base_url.clone(),
            config.speech_voice.clone(),
        ));
    }

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!("CareLog server listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install shutdown signal handler");
    tracing::info!("shutdown signal received");
}
