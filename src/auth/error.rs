// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Authentication errors.
//!
//! Every variant renders the same opaque `401 {"error":"Unauthorized"}`
//! response; the specific failure is only logged. Key-set fetch failures
//! fail closed rather than surfacing a server error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication failure, produced during bearer-token verification.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Authorization header is not `Bearer <token>`
    InvalidAuthHeader,
    /// Token is structurally invalid
    MalformedToken,
    /// Token signature does not verify
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Token issuer does not match configuration
    InvalidIssuer,
    /// Token audience does not match the configured client id
    InvalidAudience,
    /// Token is not marked as an identity token
    WrongTokenUse,
    /// Token is not yet valid
    TokenNotYetValid,
    /// Key set could not be fetched from the identity provider
    KeySetFetch(String),
    /// No key in the key set matches the token's key id
    NoMatchingKey,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "invalid authorization header (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "token is malformed"),
            AuthError::InvalidSignature => write!(f, "token signature is invalid"),
            AuthError::TokenExpired => write!(f, "token has expired"),
            AuthError::InvalidIssuer => write!(f, "token issuer is invalid"),
            AuthError::InvalidAudience => write!(f, "token audience is invalid"),
            AuthError::WrongTokenUse => write!(f, "token is not an identity token"),
            AuthError::TokenNotYetValid => write!(f, "token is not yet valid"),
            AuthError::KeySetFetch(msg) => write!(f, "failed to fetch signing keys: {msg}"),
            AuthError::NoMatchingKey => write!(f, "no matching signing key"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::warn!(reason = %self, "rejected request credential");
        (
            StatusCode::UNAUTHORIZED,
            Json(AuthErrorBody {
                error: "Unauthorized",
            }),
        )
            .into_response()
    }
}
