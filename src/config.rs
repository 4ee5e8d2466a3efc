// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and carried
//! in [`Config`] for the lifetime of the process.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for the record database and media objects | `/data` |
//! | `AUTH_ISSUER` | Identity provider issuer URL (JWKS derived from it) | Unset = dev mode |
//! | `AUTH_CLIENT_ID` | Expected `aud` claim of identity tokens | Optional |
//! | `MEDIA_SIGNING_SECRET` | HMAC key for time-limited media URLs | Required |
//! | `PUBLIC_BASE_URL` | Base URL used when minting signed media URLs | `http://localhost:8080` |
//! | `ASSISTANT_BASE_URL` | Conversational-assistant runtime endpoint | Optional |
//! | `ASSISTANT_LOCALE` | Locale sent with assistant sessions | `en_US` |
//! | `SPEECH_BASE_URL` | Speech-synthesis service endpoint | Optional |
//! | `SPEECH_VOICE` | Synthesis voice | `Joanna` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

const DEFAULT_DATA_DIR: &str = "/data";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_ASSISTANT_LOCALE: &str = "en_US";
const DEFAULT_SPEECH_VOICE: &str = "Joanna";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Process-wide configuration, loaded once at boot.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Identity provider issuer URL. `None` disables signature verification
    /// (development mode).
    pub auth_issuer: Option<String>,
    /// Expected `aud` claim. `None` skips audience validation.
    pub auth_client_id: Option<String>,
    pub media_signing_secret: String,
    pub public_base_url: String,
    pub assistant_base_url: Option<String>,
    pub assistant_locale: String,
    pub speech_base_url: Option<String>,
    pub speech_voice: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "8080").parse().unwrap_or(8080),
            data_dir: PathBuf::from(env_or_default(DATA_DIR_ENV, DEFAULT_DATA_DIR)),
            auth_issuer: env_optional("AUTH_ISSUER"),
            auth_client_id: env_optional("AUTH_CLIENT_ID"),
            media_signing_secret: env_required("MEDIA_SIGNING_SECRET")?,
            public_base_url: trim_trailing_slash(env_or_default(
                "PUBLIC_BASE_URL",
                DEFAULT_PUBLIC_BASE_URL,
            )),
            assistant_base_url: env_optional("ASSISTANT_BASE_URL").map(trim_trailing_slash),
            assistant_locale: env_or_default("ASSISTANT_LOCALE", DEFAULT_ASSISTANT_LOCALE),
            speech_base_url: env_optional("SPEECH_BASE_URL").map(trim_trailing_slash),
            speech_voice: env_or_default("SPEECH_VOICE", DEFAULT_SPEECH_VOICE),
        })
    }
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}

fn env_required(name: &'static str) -> Result<String, ConfigError> {
    env_optional(name).ok_or(ConfigError::MissingVar(name))
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_default_falls_back() {
        assert_eq!(
            env_or_default("CARELOG_TEST_UNSET_VAR", "fallback"),
            "fallback"
        );
    }

    #[test]
    fn env_optional_filters_blank_values() {
        std::env::set_var("CARELOG_TEST_BLANK_VAR", "   ");
        assert_eq!(env_optional("CARELOG_TEST_BLANK_VAR"), None);
        std::env::remove_var("CARELOG_TEST_BLANK_VAR");
    }

    #[test]
    fn env_required_reports_missing() {
        let err = env_required("CARELOG_TEST_MISSING_VAR").unwrap_err();
        assert!(err.to_string().contains("CARELOG_TEST_MISSING_VAR"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(
            trim_trailing_slash("https://api.example.com/".to_string()),
            "https://api.example.com"
        );
    }
}
