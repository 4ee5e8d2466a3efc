// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! # Authentication Module
//!
//! Bearer identity-token authentication for the CareLog API.
//!
//! ## Auth Flow
//!
//! 1. Frontend authenticates the user with the hosted identity provider
//! 2. Frontend sends `Authorization: Bearer <identity JWT>`
//! 3. Server:
//!    - Fetches the provider's JWKS via HTTPS (cached with TTL)
//!    - Verifies signature, expiry, issuer, audience, and `token_use`
//!    - Extracts `sub` as the canonical user id
//!
//! ## Security
//!
//! - All non-health endpoints require authentication
//! - Every failure renders an opaque `401 {"error":"Unauthorized"}`
//! - Clock skew tolerance is 60 seconds
//! - Store operations are keyed by [`OwnerId`], which can only be built
//!   from a verified [`AuthenticatedUser`]

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;

pub use claims::{AuthenticatedUser, IdTokenClaims, OwnerId};
pub use error::AuthError;
pub use extractor::Auth;
pub use jwks::KeySetCache;
