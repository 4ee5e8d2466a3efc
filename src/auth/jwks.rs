// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Identity-provider key set (JWKS) fetching and caching.
//!
//! Keys are fetched from `<issuer>/.well-known/jwks.json` over HTTPS and
//! cached with a TTL. When a refresh fails and a stale set is available,
//! the stale set is reused; verification then either succeeds against a
//! still-valid key or fails closed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use super::error::AuthError;

/// Default key set cache TTL (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct CachedKeys {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// Cached identity-provider signing keys.
#[derive(Clone)]
pub struct KeySetCache {
    /// Issuer base URL; the key set lives at its well-known path.
    issuer: String,
    cache_ttl: Duration,
    cache: Arc<RwLock<Option<CachedKeys>>>,
    client: reqwest::Client,
}

impl KeySetCache {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    #[allow(dead_code)]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// URL the key set is fetched from.
    pub fn jwks_url(&self) -> String {
        format!(
            "{}/.well-known/jwks.json",
            self.issuer.trim_end_matches('/')
        )
    }

    /// Resolve the decoding key for a token's `kid`, fetching or refreshing
    /// the key set as needed.
    pub async fn decoding_key(&self, kid: &str) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwks = self.current_keys().await?;
        let jwk = jwks
            .keys
            .iter()
            .find(|k| k.common.key_id.as_deref() == Some(kid))
            .ok_or(AuthError::NoMatchingKey)?;
        to_decoding_key(jwk)
    }

    /// Resolve any usable decoding key (for tokens without a `kid`).
    pub async fn any_decoding_key(&self) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwks = self.current_keys().await?;
        jwks.keys
            .iter()
            .find_map(|jwk| to_decoding_key(jwk).ok())
            .ok_or(AuthError::NoMatchingKey)
    }

    /// Force a refresh of the cached key set.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let jwks = self.fetch().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CachedKeys {
            jwks,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    /// Whether a fresh key set is currently cached.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        matches!(&*cache, Some(entry) if entry.fetched_at.elapsed() < self.cache_ttl)
    }

    async fn current_keys(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        match self.fetch().await {
            Ok(jwks) => {
                let mut cache = self.cache.write().await;
                *cache = Some(CachedKeys {
                    jwks: jwks.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(jwks)
            }
            Err(e) => {
                // Stale keys beat no keys; expired tokens still fail closed.
                let cache = self.cache.read().await;
                if let Some(entry) = &*cache {
                    tracing::warn!(error = %e, "key set refresh failed, reusing stale keys");
                    return Ok(entry.jwks.clone());
                }
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let url = self.jwks_url();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::KeySetFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeySetFetch(format!(
                "HTTP {} from {url}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::KeySetFetch(e.to_string()))
    }
}

/// Convert a JWK to a decoding key. Identity providers in scope sign with
/// the RSA family.
fn to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(|_| AuthError::NoMatchingKey)?;
            let alg = match jwk.common.key_algorithm {
                Some(KeyAlgorithm::RS384) => Algorithm::RS384,
                Some(KeyAlgorithm::RS512) => Algorithm::RS512,
                _ => Algorithm::RS256,
            };
            Ok((key, alg))
        }
        _ => Err(AuthError::NoMatchingKey),
    }
}
