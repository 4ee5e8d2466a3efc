// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Long-lived application state.
//!
//! Built once at startup and cloned (cheaply, via `Arc`s) into every
//! request. Nothing here mutates per-request: configuration, store handles,
//! and HTTP clients only.

use std::sync::Arc;

use crate::auth::KeySetCache;
use crate::providers::{AssistantClient, SpeechClient};
use crate::storage::{MediaStore, RecordDatabase};

/// Identity verification configuration.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Provider key set. `None` disables signature verification (dev mode).
    pub keys: Option<KeySetCache>,
    /// Expected issuer claim.
    pub issuer: Option<String>,
    /// Expected audience claim (the app client id).
    pub audience: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RecordDatabase>,
    pub media: Arc<MediaStore>,
    pub auth: AuthConfig,
    /// Assistant runtime client; `None` until configured.
    pub assistant: Option<AssistantClient>,
    /// Speech synthesis client; `None` until configured.
    pub speech: Option<SpeechClient>,
}

impl AppState {
    pub fn new(records: Arc<RecordDatabase>, media: Arc<MediaStore>) -> Self {
        Self {
            records,
            media,
            auth: AuthConfig::default(),
            assistant: None,
            speech: None,
        }
    }

    pub fn with_auth_config(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_assistant(mut self, assistant: AssistantClient) -> Self {
        self.assistant = Some(assistant);
        self
    }

    pub fn with_speech(mut self, speech: SpeechClient) -> Self {
        self.speech = Some(speech);
        self
    }
}
