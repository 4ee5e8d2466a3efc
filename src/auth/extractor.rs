// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! The extractor runs before the handler body; a rejected credential means
//! the handler never executes.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, decode_header, Validation};

use super::{AuthError, AuthenticatedUser, IdTokenClaims};
use crate::state::{AppState, AuthConfig};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Extractor for authenticated users.
///
/// ## Verification Modes
///
/// - **Production mode** (`AUTH_ISSUER` set): full signature verification
///   against the provider's key set, plus issuer/audience/expiry checks.
/// - **Development mode** (no issuer configured): structural decode without
///   signature verification; expiry and claim checks still apply.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?
            .trim();

        let user = verify_token(token, &state.auth).await?;
        Ok(Auth(user))
    }
}

async fn verify_token(token: &str, auth: &AuthConfig) -> Result<AuthenticatedUser, AuthError> {
    let claims = if let Some(ref keys) = auth.keys {
        verify_signed(token, keys, auth).await?
    } else {
        decode_unverified(token, auth)?
    };

    if !claims.is_identity_use() {
        return Err(AuthError::WrongTokenUse);
    }

    Ok(AuthenticatedUser::from_claims(claims))
}

/// Production verification: signature against the provider key set, then
/// issuer, audience, and expiry via the `jsonwebtoken` validation.
async fn verify_signed(
    token: &str,
    keys: &super::KeySetCache,
    auth: &AuthConfig,
) -> Result<IdTokenClaims, AuthError> {
    let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

    let (decoding_key, algorithm) = if let Some(kid) = &header.kid {
        keys.decoding_key(kid).await?
    } else {
        keys.any_decoding_key().await?
    };

    let mut validation = Validation::new(algorithm);
    validation.leeway = CLOCK_SKEW_LEEWAY;

    if let Some(ref issuer) = auth.issuer {
        validation.set_issuer(&[issuer]);
    }

    if let Some(ref audience) = auth.audience {
        validation.set_audience(&[audience]);
    } else {
        validation.validate_aud = false;
    }

    let token_data =
        decode::<IdTokenClaims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
            jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
            _ => AuthError::MalformedToken,
        })?;

    Ok(token_data.claims)
}

/// Development decode (no signature check).
///
/// WARNING: only reachable when no issuer is configured.
fn decode_unverified(token: &str, auth: &AuthConfig) -> Result<IdTokenClaims, AuthError> {
    let token_data = jsonwebtoken::dangerous::insecure_decode::<IdTokenClaims>(token)
        .map_err(|_| AuthError::MalformedToken)?;

    let claims = token_data.claims;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    if claims.exp > 0 && claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
        return Err(AuthError::TokenExpired);
    }

    if let Some(ref audience) = auth.audience {
        if claims.aud.as_deref() != Some(audience.as_str()) {
            return Err(AuthError::InvalidAudience);
        }
    }

    Ok(claims)
}
