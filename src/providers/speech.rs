// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Speech-synthesis service client.
//!
//! Synthesis is an opaque external service; the client posts text and gets
//! encoded audio bytes back.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech synthesis is not configured")]
    NotConfigured,

    #[error("speech synthesis request failed: {0}")]
    Request(String),
}

/// Client for the speech-synthesis endpoint.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    base_url: String,
    voice: String,
    http: Client,
}

impl SpeechClient {
    pub fn new(base_url: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            voice: voice.into(),
            http: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Synthesize `text` to MP3 audio bytes.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let url = format!("{}/synthesize", self.base_url.trim_end_matches('/'));

        let payload = json!({
            "text": text,
            "voice": self.voice,
            "format": "mp3",
        });

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Request(format!("HTTP {status}: {body}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    #[allow(dead_code)]
    pub fn voice(&self) -> &str {
        &self.voice
    }
}
