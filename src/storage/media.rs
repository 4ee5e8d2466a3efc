// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Media object store with time-limited signed URLs.
//!
//! Objects live under `<data_dir>/media/<ownerId>/<name>` with a small JSON
//! sidecar carrying the content type. Uploads and downloads go through
//! `/media/{key}` URLs carrying an `expires` timestamp and an HMAC-SHA256
//! signature over `(method, key, expires)`; the signature is minted by the
//! presign endpoints and checked here on every access.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("metadata error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("link expired")]
    LinkExpired,
}

pub type MediaStoreResult<T> = Result<T, MediaStoreError>;

/// Sidecar metadata stored next to each object.
#[derive(Debug, Serialize, Deserialize)]
struct ObjectMeta {
    content_type: String,
}

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Filesystem-backed object store with HMAC presigning.
pub struct MediaStore {
    root: PathBuf,
    secret: Vec<u8>,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, secret: &[u8], public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            secret: secret.to_vec(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an object (atomic write via temp file + rename).
    pub fn put(&self, key: &str, content_type: &str, data: &[u8]) -> MediaStoreResult<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(data)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &path)?;

        let meta = ObjectMeta {
            content_type: content_type.to_string(),
        };
        fs::write(meta_path(&path), serde_json::to_vec(&meta)?)?;
        Ok(())
    }

    /// Read an object back as `(bytes, content_type)`.
    pub fn get(&self, key: &str) -> MediaStoreResult<(Vec<u8>, String)> {
        let path = self.object_path(key)?;
        let mut file =
            File::open(&path).map_err(|_| MediaStoreError::NotFound(key.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let content_type = fs::read(meta_path(&path))
            .ok()
            .and_then(|bytes| serde_json::from_slice::<ObjectMeta>(&bytes).ok())
            .map(|meta| meta.content_type)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Ok((data, content_type))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.object_path(key)
            .map(|path| File::open(path).is_ok())
            .unwrap_or(false)
    }

    /// Mint a signed PUT URL valid for `ttl_secs` seconds.
    pub fn presign_put(&self, key: &str, ttl_secs: i64) -> MediaStoreResult<String> {
        validate_key(key)?;
        let expires = Utc::now().timestamp() + ttl_secs;
        Ok(self.signed_url("PUT", key, expires))
    }

    /// Mint a signed GET URL valid for `ttl_secs` seconds.
    pub fn presign_get(&self, key: &str, ttl_secs: i64) -> MediaStoreResult<String> {
        validate_key(key)?;
        let expires = Utc::now().timestamp() + ttl_secs;
        Ok(self.signed_url("GET", key, expires))
    }

    /// Check a presented signature for `method` + `key` + `expires`.
    pub fn verify(
        &self,
        method: &str,
        key: &str,
        expires: i64,
        signature: &str,
    ) -> MediaStoreResult<()> {
        validate_key(key)?;
        self.verify_at(method, key, expires, signature, Utc::now().timestamp())
    }

    fn verify_at(
        &self,
        method: &str,
        key: &str,
        expires: i64,
        signature: &str,
        now: i64,
    ) -> MediaStoreResult<()> {
        if now > expires {
            return Err(MediaStoreError::LinkExpired);
        }

        let presented = Base64UrlUnpadded::decode_vec(signature)
            .map_err(|_| MediaStoreError::SignatureMismatch)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key size");
        mac.update(signing_message(method, key, expires).as_bytes());
        mac.verify_slice(&presented)
            .map_err(|_| MediaStoreError::SignatureMismatch)
    }

    fn sign(&self, method: &str, key: &str, expires: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key size");
        mac.update(signing_message(method, key, expires).as_bytes());
        Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes())
    }

    fn signed_url(&self, method: &str, key: &str, expires: i64) -> String {
        let signature = self.sign(method, key, expires);
        format!(
            "{}/media/{}?expires={expires}&sig={signature}",
            self.public_base_url,
            encode_key_path(key)
        )
    }

    fn object_path(&self, key: &str) -> MediaStoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

fn signing_message(method: &str, key: &str, expires: i64) -> String {
    format!("{method}\n{key}\n{expires}")
}

fn meta_path(object_path: &Path) -> PathBuf {
    let mut name = object_path.as_os_str().to_os_string();
    name.push(".meta");
    PathBuf::from(name)
}

/// Reject keys that could escape the store root or collide with sidecars.
fn validate_key(key: &str) -> MediaStoreResult<()> {
    if key.is_empty() || key.starts_with('/') || key.ends_with('/') {
        return Err(MediaStoreError::InvalidKey(key.to_string()));
    }
    if key.contains('\\') || key.contains('\0') {
        return Err(MediaStoreError::InvalidKey(key.to_string()));
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(MediaStoreError::InvalidKey(key.to_string()));
        }
    }
    if key.ends_with(".meta") || key.ends_with(".tmp") {
        return Err(MediaStoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Percent-encode a key for use as a URL path, keeping `/` separators.
fn encode_key_path(key: &str) -> String {
    key.split('/')
        .map(|segment| {
            url::form_urlencoded::byte_serialize(segment.as_bytes())
                .collect::<String>()
                .replace('+', "%20")
        })
        .collect::<Vec<_>>()
        .join("/")
}
