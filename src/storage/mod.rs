// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! # Storage Module
//!
//! Two stores live under the data directory:
//!
//! ```text
//! <DATA_DIR>/
//!   records.redb       # embedded record database (redb)
//!   media/
//!     {ownerId}/
//!       {name}         # media object bytes
//!       {name}.meta    # content-type sidecar
//! ```
//!
//! Both are keyed by the verified owner id: the record database through its
//! composite partition key, the media store through the owner prefix the
//! presign endpoints put on every key.

pub mod media;
pub mod records;

pub use media::{MediaStore, MediaStoreError};
pub use records::{RecordDatabase, RecordStoreError};

use std::path::{Path, PathBuf};

/// Record database file under the data directory.
pub fn records_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("records.redb")
}

/// Media object root under the data directory.
pub fn media_root(data_dir: &Path) -> PathBuf {
    data_dir.join("media")
}
