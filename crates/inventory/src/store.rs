//! The inventory record store.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use wastetrack_core::{DomainError, RecordId, RecordIdGenerator};

use crate::attributes::MattressAttributes;
use crate::error::InventoryError;
use crate::persistence::{self, CORRUPT_SUFFIX, STORAGE_KEY};
use crate::record::MattressRecord;
use crate::status::{MattressStatus, TransitionPolicy};
use crate::storage::KeyValueStorage;

/// Owns the session's mattress records and mirrors them to storage.
///
/// The collection is ordered newest first. Every mutation rewrites the whole
/// collection under one key. If that write fails the mutation is still kept in
/// memory, the store is marked dirty, and `PersistenceWrite` is returned so the
/// caller can retry with [`InventoryStore::flush`].
///
/// Anything unreadable found at load is copied byte for byte to
/// `<key>.corrupt` first. If that copy fails, writes to the main key are
/// refused for the rest of the session.
#[derive(Debug)]
pub struct InventoryStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    policy: TransitionPolicy,
    records: Vec<MattressRecord>,
    ids: RecordIdGenerator,
    dirty: bool,
    load_failure: Option<InventoryError>,
    write_blocked: Option<String>,
}

impl<S: KeyValueStorage> InventoryStore<S> {
    /// Load the collection stored under [`STORAGE_KEY`].
    pub fn load(storage: S, policy: TransitionPolicy) -> Self {
        Self::load_with_key(storage, STORAGE_KEY, policy)
    }

    /// Load the collection stored under `key`.
    ///
    /// Never fails: absent data yields an empty store. Unreadable data sets
    /// [`load_failure`](Self::load_failure) and keeps whichever records could
    /// still be decoded.
    pub fn load_with_key(storage: S, key: impl Into<String>, policy: TransitionPolicy) -> Self {
        let mut store = Self {
            storage,
            key: key.into(),
            policy,
            records: Vec::new(),
            ids: RecordIdGenerator::new(),
            dirty: false,
            load_failure: None,
            write_blocked: None,
        };

        let blob = match store.storage.get(&store.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!(key = %store.key, "no persisted inventory");
                return store;
            }
            Err(err) => {
                store.fail_load(InventoryError::PersistenceRead(err.to_string()));
                return store;
            }
        };

        match persistence::decode(&blob) {
            Ok(decoded) => {
                if decoded.rejected > 0 {
                    store.fail_load(InventoryError::PersistenceRead(format!(
                        "{} of {} records could not be decoded",
                        decoded.rejected,
                        decoded.rejected + decoded.records.len()
                    )));
                }
                for record in &decoded.records {
                    store.ids.observe(record.id_typed());
                }
                info!(key = %store.key, records = decoded.records.len(), "inventory loaded");
                store.records = decoded.records;
            }
            Err(err) => store.fail_load(InventoryError::PersistenceRead(err.to_string())),
        }

        store
    }

    fn fail_load(&mut self, failure: InventoryError) {
        warn!(key = %self.key, error = %failure, "inventory partly or wholly unreadable");
        self.preserve_unreadable();
        self.load_failure = Some(failure);
    }

    /// Copy the stored value aside so the next write cannot destroy it.
    fn preserve_unreadable(&mut self) {
        let backup_key = format!("{}{CORRUPT_SUFFIX}", self.key);
        match self.storage.copy_raw(&self.key, &backup_key) {
            Ok(true) => warn!(backup_key = %backup_key, "preserved unreadable inventory"),
            Ok(false) => debug!(key = %self.key, "nothing stored to preserve"),
            Err(err) => {
                error!(
                    backup_key = %backup_key,
                    error = %err,
                    "failed to preserve unreadable inventory; writes disabled"
                );
                self.write_blocked = Some(format!(
                    "unreadable data under {:?} could not be backed up ({err}); move it aside and restart",
                    self.key
                ));
            }
        }
    }

    /// Records in newest-first order.
    pub fn records(&self) -> &[MattressRecord] {
        &self.records
    }

    pub fn get(&self, id: &RecordId) -> Option<&MattressRecord> {
        self.records.iter().find(|r| r.id_typed() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Whether in-memory state has changes storage has not accepted yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Why the persisted collection could not be read at startup, if it could not.
    pub fn load_failure(&self) -> Option<&InventoryError> {
        self.load_failure.as_ref()
    }

    /// Why writes to the main key are refused, if they are.
    pub fn write_blocked(&self) -> Option<&str> {
        self.write_blocked.as_deref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Register a mattress whose asset has already been minted.
    pub fn create_record(
        &mut self,
        attributes: MattressAttributes,
        external_asset_reference: impl Into<String>,
    ) -> Result<MattressRecord, InventoryError> {
        self.create_record_at(attributes, external_asset_reference, Utc::now())
    }

    /// [`create_record`](Self::create_record) with an explicit clock reading.
    pub fn create_record_at(
        &mut self,
        attributes: MattressAttributes,
        external_asset_reference: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<MattressRecord, InventoryError> {
        let external_asset_reference = external_asset_reference.into();
        if external_asset_reference.trim().is_empty() {
            return Err(DomainError::validation("external asset reference cannot be empty").into());
        }

        let created_at = now.timestamp_millis();
        let mut id = self.ids.next(created_at);
        while self.get(&id).is_some() {
            id = self.ids.next(created_at);
        }
        let record = MattressRecord::new(id, attributes, external_asset_reference, created_at);

        self.records.insert(0, record.clone());
        info!(
            id = %record.id_typed(),
            asset = %record.external_asset_reference(),
            size = %record.mattress_size(),
            "mattress record created"
        );

        self.persist()?;
        Ok(record)
    }

    /// Move one record to `status`.
    ///
    /// Unknown ids are rejected with `NotFound` and nothing changes. Setting a
    /// record to the status it already has is accepted without a write.
    pub fn update_status(
        &mut self,
        id: &RecordId,
        status: MattressStatus,
    ) -> Result<(), InventoryError> {
        let policy = self.policy;
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id_typed() == id)
            .ok_or_else(|| DomainError::not_found(id))?;

        let from = record.status();
        if from == status {
            debug!(id = %id, status = %status, "status unchanged");
            return Ok(());
        }
        policy.check(from, status)?;

        record.set_status(status);
        info!(id = %id, from = %from, to = %status, "mattress status changed");

        self.persist()
    }

    /// Retry writing the current collection.
    pub fn flush(&mut self) -> Result<(), InventoryError> {
        self.persist()
    }

    fn persist(&mut self) -> Result<(), InventoryError> {
        let result = match &self.write_blocked {
            Some(reason) => Err(InventoryError::PersistenceWrite(reason.clone())),
            None => persistence::encode(&self.records)
                .map_err(|e| InventoryError::PersistenceWrite(e.to_string()))
                .and_then(|blob| {
                    self.storage
                        .set(&self.key, &blob)
                        .map_err(|e| InventoryError::PersistenceWrite(e.to_string()))
                }),
        };

        match &result {
            Ok(()) => {
                self.dirty = false;
                debug!(key = %self.key, records = self.records.len(), "inventory persisted");
            }
            Err(err) => {
                self.dirty = true;
                warn!(key = %self.key, error = %err, "inventory write failed; kept in memory");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{ConditionAssessment, MaterialComposition, MattressSize};
    use crate::storage::{FileStorage, InMemoryStorage, StorageError};
    use chrono::{NaiveDate, TimeZone};
    use std::collections::HashSet;

    fn attrs() -> MattressAttributes {
        MattressAttributes {
            mattress_size: MattressSize::Single,
            material_composition: MaterialComposition::FoamOnly,
            condition_assessment: ConditionAssessment::ReusableGood,
            collection_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        }
    }

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn empty_store() -> InventoryStore<InMemoryStorage> {
        InventoryStore::load(InMemoryStorage::new(), TransitionPolicy::Strict)
    }

    /// Storage whose writes can be switched off.
    #[derive(Debug, Default)]
    struct FlakyStorage {
        inner: InMemoryStorage,
        fail_writes: bool,
    }

    impl KeyValueStorage for FlakyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Write {
                    key: key.to_string(),
                    reason: "quota exceeded".to_string(),
                });
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn load_without_prior_data_is_empty() {
        let store = empty_store();
        assert!(store.records().is_empty());
        assert!(store.load_failure().is_none());
        assert!(!store.is_dirty());
    }

    #[test]
    fn load_with_corrupted_blob_is_empty_and_preserves_the_blob() {
        let storage = InMemoryStorage::new().with_entry(STORAGE_KEY, "{\"version\":1,\"records\":[{");
        let store = InventoryStore::load(storage, TransitionPolicy::Strict);

        assert!(store.records().is_empty());
        assert!(matches!(
            store.load_failure(),
            Some(InventoryError::PersistenceRead(_))
        ));
        assert_eq!(
            store.storage().raw("mattressInventory.corrupt"),
            Some("{\"version\":1,\"records\":[{")
        );
    }

    /// Storage whose main value cannot be read or copied.
    #[derive(Debug, Default)]
    struct UnreadableStorage {
        inner: InMemoryStorage,
    }

    impl KeyValueStorage for UnreadableStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Read {
                key: key.to_string(),
                reason: "permission denied".to_string(),
            })
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value)
        }

        fn copy_raw(&mut self, _key: &str, backup_key: &str) -> Result<bool, StorageError> {
            Err(StorageError::Write {
                key: backup_key.to_string(),
                reason: "read-only volume".to_string(),
            })
        }
    }

    #[test]
    fn undecodable_file_is_backed_up_before_the_next_write() {
        let dir = tempfile::tempdir().unwrap();
        let original = b"[{\"id\":\"MTR-1\",\xff\xfe}]";
        std::fs::write(dir.path().join("mattressInventory.json"), original).unwrap();

        let storage = FileStorage::open(dir.path()).unwrap();
        let mut store = InventoryStore::load(storage, TransitionPolicy::Strict);
        assert!(store.is_empty());
        assert!(matches!(
            store.load_failure(),
            Some(InventoryError::PersistenceRead(_))
        ));
        assert!(store.write_blocked().is_none());

        store.create_record_at(attrs(), "new", at(1)).unwrap();

        let backup = std::fs::read(dir.path().join("mattressInventory.corrupt.json")).unwrap();
        assert_eq!(backup, original);
        let reloaded = InventoryStore::load(FileStorage::open(dir.path()).unwrap(), TransitionPolicy::Strict);
        assert_eq!(reloaded.records()[0].external_asset_reference(), "new");
    }

    #[test]
    fn writes_are_refused_when_unreadable_data_cannot_be_backed_up() {
        let mut store = InventoryStore::load(UnreadableStorage::default(), TransitionPolicy::Strict);
        assert!(store.load_failure().is_some());
        assert!(store.write_blocked().is_some());

        let err = store.create_record_at(attrs(), "minted", at(1)).unwrap_err();
        assert!(err.is_write_failure());
        assert!(store.is_dirty());
        assert_eq!(store.records()[0].external_asset_reference(), "minted");
        assert!(store.storage().inner.raw(STORAGE_KEY).is_none());

        assert!(store.flush().unwrap_err().is_write_failure());
        assert!(store.storage().inner.raw(STORAGE_KEY).is_none());
    }

    #[test]
    fn one_bad_record_keeps_the_rest_and_is_backed_up() {
        let legacy = r#"[{"id":"MTR-2","mattressSize":"Single","materialComposition":"Foam only",
            "conditionAssessment":"Reusable good","collectionDate":"2024-03-01","status":"received",
            "nftAddress":"good","timestamp":2},
            {"id":"MTR-1","mattressSize":"Single","materialComposition":"Foam only",
            "conditionAssessment":"Reusable good","collectionDate":"","status":"received",
            "nftAddress":"bad","timestamp":1}]"#;
        let mut store = InventoryStore::load(
            InMemoryStorage::new().with_entry(STORAGE_KEY, legacy),
            TransitionPolicy::Strict,
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].external_asset_reference(), "good");
        assert!(store.load_failure().is_some());
        assert_eq!(store.storage().raw("mattressInventory.corrupt"), Some(legacy));

        store.create_record_at(attrs(), "new", at(3)).unwrap();

        let reloaded = InventoryStore::load(store.into_storage(), TransitionPolicy::Strict);
        let assets: Vec<&str> = reloaded
            .records()
            .iter()
            .map(|r| r.external_asset_reference())
            .collect();
        assert_eq!(assets, ["new", "good"]);
        assert_eq!(reloaded.storage().raw("mattressInventory.corrupt"), Some(legacy));
    }

    #[test]
    fn extreme_stored_ids_do_not_break_creation() {
        let blob = format!(
            r#"[{{"id":"MTR-{}","mattressSize":"Single","materialComposition":"Foam only",
            "conditionAssessment":"Reusable good","collectionDate":"2024-03-01","status":"received",
            "nftAddress":"far-future","timestamp":1}}]"#,
            i64::MAX
        );
        let mut store = InventoryStore::load(
            InMemoryStorage::new().with_entry(STORAGE_KEY, blob),
            TransitionPolicy::Strict,
        );
        assert_eq!(store.len(), 1);

        let created = store.create_record_at(attrs(), "next", at(1_000)).unwrap();
        assert_eq!(created.id_typed().as_str(), "MTR-1000");
        assert_ne!(created.id_typed(), store.records()[1].id_typed());
    }

    #[test]
    fn create_record_starts_received_and_lists_first() {
        let mut store = empty_store();
        let record = store.create_record(attrs(), "abc123").unwrap();

        assert_eq!(record.status(), MattressStatus::Received);
        assert_eq!(record.external_asset_reference(), "abc123");
        assert_eq!(record.mattress_size(), MattressSize::Single);
        assert_eq!(store.records()[0], record);
        assert!(store.storage().raw(STORAGE_KEY).is_some());
    }

    #[test]
    fn create_record_requires_an_asset_reference() {
        let mut store = empty_store();
        let err = store.create_record(attrs(), "  ").unwrap_err();
        assert!(matches!(err, InventoryError::Domain(DomainError::Validation(_))));
        assert!(store.is_empty());
        assert!(store.storage().raw(STORAGE_KEY).is_none());
    }

    #[test]
    fn back_to_back_creations_are_distinct_and_newest_first() {
        let mut store = empty_store();
        let first = store.create_record_at(attrs(), "a1", at(1_000)).unwrap();
        let second = store.create_record_at(attrs(), "a2", at(1_000)).unwrap();

        assert_ne!(first.id_typed(), second.id_typed());
        let listed: Vec<&str> = store
            .records()
            .iter()
            .map(|r| r.external_asset_reference())
            .collect();
        assert_eq!(listed, ["a2", "a1"]);
    }

    #[test]
    fn ids_are_not_reused_after_reload() {
        let mut store = empty_store();
        let first = store.create_record_at(attrs(), "a1", at(5_000)).unwrap();

        let mut reloaded = InventoryStore::load(store.into_storage(), TransitionPolicy::Strict);
        let second = reloaded.create_record_at(attrs(), "a2", at(4_000)).unwrap();
        assert_ne!(first.id_typed(), second.id_typed());
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn update_status_changes_only_the_target_record() {
        let mut store = empty_store();
        let a = store.create_record_at(attrs(), "a", at(1)).unwrap();
        let b = store.create_record_at(attrs(), "b", at(2)).unwrap();

        store.update_status(a.id_typed(), MattressStatus::Stored).unwrap();

        let updated = store.get(a.id_typed()).unwrap();
        assert_eq!(updated.status(), MattressStatus::Stored);
        assert_eq!(updated.attributes(), a.attributes());
        assert_eq!(updated.external_asset_reference(), a.external_asset_reference());
        assert_eq!(updated.created_at(), a.created_at());
        assert_eq!(store.get(b.id_typed()).unwrap(), &b);
    }

    #[test]
    fn update_status_on_unknown_id_changes_nothing() {
        let mut store = empty_store();
        store.create_record_at(attrs(), "a", at(1)).unwrap();
        let before = store.records().to_vec();
        let persisted_before = store.storage().raw(STORAGE_KEY).map(str::to_string);

        let err = store
            .update_status(&"MTR-999".parse().unwrap(), MattressStatus::Stored)
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.records(), before.as_slice());
        assert_eq!(store.storage().raw(STORAGE_KEY).map(str::to_string), persisted_before);
    }

    #[test]
    fn strict_policy_rejects_leaving_a_terminal_state() {
        let mut store = empty_store();
        let r = store.create_record_at(attrs(), "a", at(1)).unwrap();
        store.update_status(r.id_typed(), MattressStatus::Processing).unwrap();
        store.update_status(r.id_typed(), MattressStatus::Upcycled).unwrap();

        let err = store
            .update_status(r.id_typed(), MattressStatus::Stored)
            .unwrap_err();
        assert!(matches!(
            err,
            InventoryError::Domain(DomainError::InvalidTransition { .. })
        ));
        assert_eq!(store.get(r.id_typed()).unwrap().status(), MattressStatus::Upcycled);
    }

    #[test]
    fn permissive_policy_allows_any_move() {
        let mut store = InventoryStore::load(InMemoryStorage::new(), TransitionPolicy::Permissive);
        let r = store.create_record_at(attrs(), "a", at(1)).unwrap();
        store.update_status(r.id_typed(), MattressStatus::Landfill).unwrap();
        store.update_status(r.id_typed(), MattressStatus::Eol).unwrap();
        assert_eq!(store.get(r.id_typed()).unwrap().status(), MattressStatus::Eol);
    }

    #[test]
    fn write_failure_keeps_the_record_and_flush_recovers() {
        let mut store = InventoryStore::load(FlakyStorage::default(), TransitionPolicy::Strict);
        store.storage.fail_writes = true;

        let err = store.create_record_at(attrs(), "minted", at(7)).unwrap_err();
        assert!(err.is_write_failure());
        assert!(store.is_dirty());
        assert_eq!(store.records()[0].external_asset_reference(), "minted");

        store.storage.fail_writes = false;
        store.flush().unwrap();
        assert!(!store.is_dirty());

        let reloaded = InventoryStore::load(store.into_storage(), TransitionPolicy::Strict);
        assert_eq!(reloaded.records()[0].external_asset_reference(), "minted");
    }

    #[test]
    fn legacy_collection_is_loaded_and_rewritten_versioned() {
        let legacy = r#"[{"id":"MTR-20","mattressSize":"King","materialComposition":"Foam only",
            "conditionAssessment":"Reusable good","collectionDate":"2024-02-02","status":"stored",
            "nftAddress":"old","timestamp":20}]"#;
        let mut store = InventoryStore::load(
            InMemoryStorage::new().with_entry(STORAGE_KEY, legacy),
            TransitionPolicy::Strict,
        );
        assert_eq!(store.len(), 1);

        let id = store.records()[0].id_typed().clone();
        store.update_status(&id, MattressStatus::Processing).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(store.storage().raw(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(written["version"], 1);
        assert_eq!(written["records"][0]["status"], "processing");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_attrs() -> impl Strategy<Value = MattressAttributes> {
            (
                proptest::sample::select(MattressSize::ALL),
                proptest::sample::select(MaterialComposition::ALL),
                proptest::sample::select(ConditionAssessment::ALL),
                0u32..3650,
            )
                .prop_map(|(size, material, condition, day)| MattressAttributes {
                    mattress_size: size,
                    material_composition: material,
                    condition_assessment: condition,
                    collection_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                        + chrono::Days::new(day as u64),
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: N creations yield N unique ids, newest first.
            #[test]
            fn creations_are_unique_and_newest_first(
                inputs in proptest::collection::vec((any_attrs(), "[A-Za-z0-9]{1,44}", 0i64..5), 1..40)
            ) {
                let mut store = empty_store();
                let mut clock = 1_700_000_000_000i64;
                for (attributes, asset, step) in &inputs {
                    clock += step;
                    let record = store.create_record_at(attributes.clone(), asset.clone(), at(clock)).unwrap();
                    prop_assert_eq!(record.status(), MattressStatus::Received);
                    prop_assert_eq!(record.external_asset_reference(), asset.as_str());
                }

                prop_assert_eq!(store.len(), inputs.len());
                let ids: HashSet<_> = store.records().iter().map(|r| r.id_typed().clone()).collect();
                prop_assert_eq!(ids.len(), inputs.len());

                let newest_first: Vec<&str> = store.records().iter().map(|r| r.external_asset_reference()).collect();
                let expected: Vec<&str> = inputs.iter().rev().map(|(_, a, _)| a.as_str()).collect();
                prop_assert_eq!(newest_first, expected);
            }

            /// Property: reloading yields the same records in the same order.
            #[test]
            fn persisted_collection_round_trips(
                inputs in proptest::collection::vec((any_attrs(), "[A-Za-z0-9]{1,44}"), 0..20),
                transitions in proptest::collection::vec(
                    (any::<prop::sample::Index>(), proptest::sample::select(MattressStatus::ALL)),
                    0..20,
                ),
            ) {
                let mut store = InventoryStore::load(InMemoryStorage::new(), TransitionPolicy::Permissive);
                for (i, (attributes, asset)) in inputs.iter().enumerate() {
                    store.create_record_at(attributes.clone(), asset.clone(), at(i as i64)).unwrap();
                }
                if !store.is_empty() {
                    for (index, status) in &transitions {
                        let id = store.records()[index.index(store.len())].id_typed().clone();
                        store.update_status(&id, *status).unwrap();
                    }
                }

                let before = store.records().to_vec();
                let reloaded = InventoryStore::load(store.into_storage(), TransitionPolicy::Permissive);
                prop_assert_eq!(reloaded.records(), before.as_slice());
            }
        }
    }
}
