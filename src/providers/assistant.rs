// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Conversational-assistant runtime client.
//!
//! The runtime is an opaque external service; requests carry the caller's
//! verified subject id as the session id and the response JSON is passed
//! through to the API caller verbatim.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("assistant runtime is not configured")]
    NotConfigured,

    #[error("assistant request failed: {0}")]
    Request(String),

    #[error("assistant response was invalid: {0}")]
    InvalidResponse(String),
}

/// Client for the assistant runtime's text endpoint.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    base_url: String,
    locale: String,
    http: Client,
}

impl AssistantClient {
    pub fn new(base_url: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            locale: locale.into(),
            http: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Send one text turn to a bot; returns the runtime's response verbatim.
    pub async fn recognize_text(
        &self,
        bot_id: &str,
        bot_alias_id: &str,
        session_id: &str,
        text: &str,
    ) -> Result<Value, AssistantError> {
        let url = format!(
            "{}/bots/{bot_id}/aliases/{bot_alias_id}/text",
            self.base_url.trim_end_matches('/')
        );

        let payload = json!({
            "sessionId": session_id,
            "localeId": self.locale,
            "text": text,
        });

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AssistantError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Request(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| AssistantError::InvalidResponse(e.to_string()))
    }

    #[allow(dead_code)]
    pub fn locale(&self) -> &str {
        &self.locale
    }
}
