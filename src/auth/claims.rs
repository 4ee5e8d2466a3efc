// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Identity token claims and the authenticated user representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Claims carried by an identity token.
///
/// The provider issues OIDC-style identity tokens; `token_use` distinguishes
/// identity tokens from access tokens and must be `"id"` for this API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject - the canonical user identifier.
    pub sub: String,

    /// Expiration timestamp.
    #[serde(default)]
    pub exp: i64,

    /// Issued-at timestamp.
    #[serde(default)]
    pub iat: i64,

    /// Issuer URL.
    #[serde(default)]
    pub iss: String,

    /// Audience (the app client id).
    #[serde(default)]
    pub aud: Option<String>,

    /// Token use marker (`"id"` or `"access"`).
    #[serde(default)]
    pub token_use: Option<String>,

    /// Email address, when the provider includes it.
    #[serde(default)]
    pub email: Option<String>,
}

impl IdTokenClaims {
    /// Whether the token is marked as an identity token.
    ///
    /// Tokens without a `token_use` claim are accepted; providers that emit
    /// the claim must mark it `"id"`.
    pub fn is_identity_use(&self) -> bool {
        match self.token_use.as_deref() {
            Some(use_claim) => use_claim == "id",
            None => true,
        }
    }
}

/// Authenticated user extracted from a verified identity token.
///
/// This is the type handlers receive; the full verified claim set rides
/// along for downstream use.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Canonical user id (the `sub` claim).
    pub user_id: String,
    /// The full verified claim set.
    pub claims: IdTokenClaims,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: IdTokenClaims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            claims,
        }
    }
}

/// A verified owner namespace for store operations.
///
/// The only way to obtain an `OwnerId` is from an [`AuthenticatedUser`], so
/// any store call keyed by `OwnerId` is keyed by a verified subject id.
/// Request-supplied strings cannot reach the store's partition key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&AuthenticatedUser> for OwnerId {
    fn from(user: &AuthenticatedUser) -> Self {
        OwnerId(user.user_id.clone())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
