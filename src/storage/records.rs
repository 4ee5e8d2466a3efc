// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CareLog

//! Embedded record database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `records`: composite key (partition|NUL|sort) → serialized Record
//!
//! Partition key is `USER#<ownerId>`, sort key is `REC#<recordId>`. Listing
//! an owner's records is a range scan over the `USER#<ownerId>|NUL|REC#`
//! prefix, so a request can only ever observe keys built from its own
//! verified owner id.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use uuid::Uuid;

use crate::auth::OwnerId;
use crate::models::Record;

/// Single table: composite byte key → serialized Record (JSON bytes).
const RECORDS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("records");

const PARTITION_PREFIX: &str = "USER#";
const SORT_PREFIX: &str = "REC#";

/// Separator between partition and sort key. Subject ids are issued by the
/// identity provider and never contain NUL.
const KEY_SEPARATOR: u8 = 0x00;

#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("record store error: {0}")]
    Redb(#[from] redb::Error),

    #[error("record store database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("record store transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("record store table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("record store storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("record store commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("record id collision: {0}")]
    DuplicateId(String),
}

pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

// =============================================================================
// Key Helpers
// =============================================================================

/// Build the composite key for one record: `USER#<owner>|NUL|REC#<id>`.
fn make_key(owner: &OwnerId, record_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(
        PARTITION_PREFIX.len() + owner.as_str().len() + 1 + SORT_PREFIX.len() + record_id.len(),
    );
    key.extend_from_slice(PARTITION_PREFIX.as_bytes());
    key.extend_from_slice(owner.as_str().as_bytes());
    key.push(KEY_SEPARATOR);
    key.extend_from_slice(SORT_PREFIX.as_bytes());
    key.extend_from_slice(record_id.as_bytes());
    key
}

/// Prefix covering every record key of one owner.
fn make_prefix(owner: &OwnerId) -> Vec<u8> {
    let mut prefix =
        Vec::with_capacity(PARTITION_PREFIX.len() + owner.as_str().len() + 1 + SORT_PREFIX.len());
    prefix.extend_from_slice(PARTITION_PREFIX.as_bytes());
    prefix.extend_from_slice(owner.as_str().as_bytes());
    prefix.push(KEY_SEPARATOR);
    prefix.extend_from_slice(SORT_PREFIX.as_bytes());
    prefix
}

/// Upper bound for an owner's range scan (prefix with 0xFF bytes appended).
fn make_prefix_end(owner: &OwnerId) -> Vec<u8> {
    let mut end = make_prefix(owner);
    end.extend_from_slice(&[0xFF; 20]);
    end
}

// =============================================================================
// RecordDatabase
// =============================================================================

/// Embedded ACID record store.
///
/// Every operation takes an [`OwnerId`], which is only constructible from a
/// verified identity; there is no API accepting a caller-supplied partition
/// key.
pub struct RecordDatabase {
    db: Database,
}

impl RecordDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> RecordStoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so read transactions never fail on a fresh file
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(RECORDS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Create a new record for `owner` and return it.
    ///
    /// The record id is a fresh UUID v4; `created_at` is stamped here. The
    /// write is a single transaction, so no partial write is observable.
    pub fn create(
        &self,
        owner: &OwnerId,
        data_type: String,
        payload: serde_json::Value,
    ) -> RecordStoreResult<Record> {
        let record = Record {
            owner_id: owner.as_str().to_string(),
            record_id: Uuid::new_v4().to_string(),
            data_type,
            payload,
            created_at: Utc::now().timestamp_millis(),
        };

        let key = make_key(owner, &record.record_id);
        let json = serde_json::to_vec(&record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(RECORDS)?;
            // A fresh UUID makes collisions negligible; still refuse to
            // overwrite if one ever happens.
            if table.insert(key.as_slice(), json.as_slice())?.is_some() {
                return Err(RecordStoreError::DuplicateId(record.record_id));
            }
        }
        write_txn.commit()?;

        Ok(record)
    }

    /// List all records of `owner`, in native key order.
    ///
    /// Returns an empty vec for owners with no records.
    pub fn list(&self, owner: &OwnerId) -> RecordStoreResult<Vec<Record>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RECORDS)?;

        let prefix = make_prefix(owner);
        let prefix_end = make_prefix_end(owner);

        let mut records = Vec::new();
        for entry in table.range(prefix.as_slice()..prefix_end.as_slice())? {
            let entry = entry?;
            let record: Record = serde_json::from_slice(entry.1.value())?;
            records.push(record);
        }

        Ok(records)
    }

    /// Cheap availability probe (used by the readiness endpoint).
    pub fn health_check(&self) -> RecordStoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(RECORDS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, IdTokenClaims};
    use serde_json::json;
    use tempfile::TempDir;

    fn owner(id: &str) -> OwnerId {
        let claims: IdTokenClaims = serde_json::from_value(json!({ "sub": id })).unwrap();
        OwnerId::from(&AuthenticatedUser::from_claims(claims))
    }

    fn test_db() -> (RecordDatabase, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = RecordDatabase::open(&dir.path().join("records.redb")).expect("open db");
        (db, dir)
    }

    #[test]
    fn created_record_is_listed_for_its_owner() {
        let (db, _dir) = test_db();
        let abc = owner("abc");

        let created = db
            .create(&abc, "symptom".into(), json!({"note": "sore throat"}))
            .unwrap();

        let listed = db.list(&abc).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].record_id, created.record_id);
        assert_eq!(listed[0].data_type, "symptom");
        assert_eq!(listed[0].payload, json!({"note": "sore throat"}));
        assert_eq!(listed[0].owner_id, "abc");
        assert!(listed[0].created_at > 0);
    }

    #[test]
    fn records_are_invisible_to_other_owners() {
        let (db, _dir) = test_db();
        let abc = owner("abc");
        let xyz = owner("xyz");

        db.create(&abc, "symptom".into(), json!({"note": "headache"}))
            .unwrap();

        assert_eq!(db.list(&abc).unwrap().len(), 1);
        assert!(db.list(&xyz).unwrap().is_empty());
    }

    #[test]
    fn owner_prefix_does_not_bleed_into_longer_ids() {
        let (db, _dir) = test_db();
        let ab = owner("ab");
        let abc = owner("abc");

        db.create(&abc, "note".into(), json!({})).unwrap();

        // "ab" is a string prefix of "abc"; the key separator keeps the
        // partitions disjoint.
        assert!(db.list(&ab).unwrap().is_empty());
        assert_eq!(db.list(&abc).unwrap().len(), 1);
    }

    #[test]
    fn empty_owner_lists_empty_not_error() {
        let (db, _dir) = test_db();
        assert!(db.list(&owner("nobody")).unwrap().is_empty());
    }

    #[test]
    fn repeated_creates_yield_distinct_ids() {
        let (db, _dir) = test_db();
        let abc = owner("abc");

        let mut ids = std::collections::HashSet::new();
        for i in 0..20 {
            let record = db
                .create(&abc, "entry".into(), json!({ "seq": i }))
                .unwrap();
            assert!(ids.insert(record.record_id));
        }

        assert_eq!(db.list(&abc).unwrap().len(), 20);
    }

    #[test]
    fn payload_round_trips_exactly() {
        let (db, _dir) = test_db();
        let abc = owner("abc");

        let payload = json!({
            "nested": {"values": [1, 2, 3]},
            "flag": true,
            "text": "with \"quotes\" and unicode: éü"
        });
        db.create(&abc, "mixed".into(), payload.clone()).unwrap();

        let listed = db.list(&abc).unwrap();
        assert_eq!(listed[0].payload, payload);
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.redb");
        let abc = owner("abc");

        {
            let db = RecordDatabase::open(&path).unwrap();
            db.create(&abc, "symptom".into(), json!({"note": "cough"}))
                .unwrap();
        }

        let db = RecordDatabase::open(&path).unwrap();
        let listed = db.list(&abc).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].data_type, "symptom");
    }

    #[test]
    fn health_check_passes_on_open_db() {
        let (db, _dir) = test_db();
        db.health_check().expect("health check should pass");
    }
}
