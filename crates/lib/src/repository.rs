use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::{
    CollectionDraft, CollectionRequest, Error, KeyValueStore, Record, RecordId, Result,
    WasteRequest, WasteRequestDraft,
    id::{generate_id, request_number},
};

const COLLECTION_NUMBER_PREFIX: &str = "SOL";
const WASTE_REQUEST_NUMBER_PREFIX: &str = "REQ";

/// Persists records one per key (`<collection>/<id>`).
///
/// Whole-array values left at the bare collection key by older releases are
/// still read until [`RecordRepository::migrate_legacy`] splits them. Lists
/// are ordered by request date, so neither the id format nor the storage
/// layout affects the order.
#[derive(Clone, Debug)]
pub struct RecordRepository<S> {
    store: S,
}

impl<S: KeyValueStore> RecordRepository<S> {
    pub fn new(store: S) -> Self {
        RecordRepository { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn record_key<R: Record>(id: &RecordId) -> String {
        format!("{}/{}", R::COLLECTION_KEY, id)
    }

    fn record_prefix<R: Record>() -> String {
        format!("{}/", R::COLLECTION_KEY)
    }

    pub fn generate_id(&self) -> RecordId {
        generate_id()
    }

    async fn load_legacy<R: Record>(&self) -> Result<Vec<R>> {
        Ok(self
            .store
            .get_json::<Vec<R>>(R::COLLECTION_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn append<R: Record>(&self, record: &R) -> Result<()> {
        let key = Self::record_key::<R>(record.id());
        self.store.set_json(&key, record).await?;
        debug!("Stored record {}", key);
        Ok(())
    }

    /// Every record of kind `R`, oldest first by request date. Records
    /// submitted at the same instant are ordered by id.
    pub async fn load_all<R: Record>(&self) -> Result<Vec<R>> {
        let keys = self
            .store
            .keys_with_prefix(&Self::record_prefix::<R>())
            .await?;

        let mut indexed = Vec::with_capacity(keys.len());
        for key in keys {
            // The key may vanish between listing and reading.
            if let Some(record) = self.store.get_json::<R>(&key).await? {
                indexed.push(record);
            }
        }

        let indexed_ids: HashSet<RecordId> = indexed.iter().map(|r| r.id().clone()).collect();
        let mut records: Vec<R> = self
            .load_legacy::<R>()
            .await?
            .into_iter()
            .filter(|r| !indexed_ids.contains(r.id()))
            .collect();
        records.extend(indexed);
        records.sort_by(|a, b| {
            a.request_date()
                .cmp(&b.request_date())
                .then_with(|| a.id().cmp(b.id()))
        });
        debug!("Loaded {} records from {}", records.len(), R::COLLECTION_KEY);
        Ok(records)
    }

    /// Like [`RecordRepository::load_all`], but any failure is logged and
    /// reported as an empty list.
    pub async fn load_all_or_empty<R: Record>(&self) -> Vec<R> {
        match self.load_all::<R>().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Could not load {}: {}", R::COLLECTION_KEY, e);
                Vec::new()
            }
        }
    }

    pub async fn find<R: Record>(&self, id: &RecordId) -> Result<Option<R>> {
        if let Some(record) = self
            .store
            .get_json::<R>(&Self::record_key::<R>(id))
            .await?
        {
            return Ok(Some(record));
        }

        Ok(self
            .load_legacy::<R>()
            .await?
            .into_iter()
            .find(|r| r.id() == id))
    }

    /// Marks a pending record as canceled and persists it.
    pub async fn cancel<R: Record>(&self, id: &RecordId) -> Result<R> {
        self.migrate_legacy::<R>().await?;

        let Some(mut record) = self.find::<R>(id).await? else {
            return Err(Error::NotFound(id.to_string()));
        };
        if record.status() != R::PENDING {
            return Err(Error::InvalidTransition {
                id: id.to_string(),
                from: record.status().to_string(),
                to: R::CANCELED.to_string(),
            });
        }

        record.set_status(R::CANCELED);
        self.append(&record).await?;
        info!("Canceled {} {}", R::COLLECTION_KEY, id);
        Ok(record)
    }

    /// Moves a legacy whole-array value into per-record keys and removes it.
    ///
    /// Returns how many records were moved.
    pub async fn migrate_legacy<R: Record>(&self) -> Result<usize> {
        let Some(legacy) = self.store.get_json::<Vec<R>>(R::COLLECTION_KEY).await? else {
            return Ok(0);
        };

        for record in &legacy {
            let key = Self::record_key::<R>(record.id());
            // A per-record entry is newer than its legacy copy.
            if self.store.get(&key).await?.is_none() {
                self.store.set_json(&key, record).await?;
            }
        }
        self.store.remove(R::COLLECTION_KEY).await?;

        info!(
            "Migrated {} legacy records from {}",
            legacy.len(),
            R::COLLECTION_KEY
        );
        Ok(legacy.len())
    }

    pub async fn submit_collection(
        &self,
        draft: CollectionDraft,
        now: DateTime<Utc>,
    ) -> Result<CollectionRequest> {
        let record = draft.into_record(
            self.generate_id(),
            request_number(COLLECTION_NUMBER_PREFIX),
            now,
        )?;
        self.append(&record).await?;
        info!(
            "Submitted collection request {} ({})",
            record.request_number, record.id
        );
        Ok(record)
    }

    pub async fn submit_waste_request(
        &self,
        draft: WasteRequestDraft,
        now: DateTime<Utc>,
    ) -> Result<WasteRequest> {
        let record = draft.into_record(
            self.generate_id(),
            request_number(WASTE_REQUEST_NUMBER_PREFIX),
            now,
        )?;
        self.append(&record).await?;
        info!(
            "Submitted waste request {} ({})",
            record.request_number, record.id
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use super::*;
    use crate::{
        CollectionStatus, MemoryStore, Purpose, Quantity, QuantityUnit, StoreError, WasteType,
        WasteRequestStatus,
    };

    /// Wraps a [`MemoryStore`] and fails every write once armed.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: Arc<AtomicBool>,
    }

    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::write(key, std::io::Error::other("disk full")));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
            self.inner.remove(key).await
        }

        async fn keys_with_prefix(
            &self,
            prefix: &str,
        ) -> std::result::Result<Vec<String>, StoreError> {
            self.inner.keys_with_prefix(prefix).await
        }
    }

    fn draft(waste_type: WasteType, value: f64, unit: QuantityUnit) -> CollectionDraft {
        CollectionDraft {
            waste_type: Some(waste_type),
            quantity: Some(Quantity::new(value, unit)),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_submit_then_load_returns_pending_record_last() {
        let repo = RecordRepository::new(MemoryStore::new());
        let inputs = [
            (WasteType::BiomassAsh, 500.0, QuantityUnit::Kilogram),
            (WasteType::RiceHuskAsh, 2.0, QuantityUnit::Ton),
            (WasteType::WoodAsh, 7.5, QuantityUnit::CubicMeter),
            (WasteType::Other, 1.0, QuantityUnit::Kilogram),
        ];

        for (waste_type, value, unit) in inputs {
            repo.submit_collection(draft(waste_type, value, unit), Utc::now())
                .await
                .unwrap();

            let all = repo.load_all::<CollectionRequest>().await.unwrap();
            let last = all.last().unwrap();
            assert_eq!(last.waste_type, waste_type);
            assert_eq!(last.estimated_quantity, Quantity::new(value, unit).to_string());
            assert_eq!(last.status, CollectionStatus::Pending);
            assert!(last.request_number.starts_with("SOL-"));
        }

        assert_eq!(repo.load_all::<CollectionRequest>().await.unwrap().len(), 4);
        assert!(repo.load_all::<WasteRequest>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_writes_nothing() {
        let repo = RecordRepository::new(MemoryStore::new());
        let result = repo
            .submit_collection(draft(WasteType::MixedAsh, 1.0, QuantityUnit::Kilogram), Utc::now())
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(repo.store().keys_with_prefix("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_prior_state() {
        let store = FlakyStore::default();
        let repo = RecordRepository::new(store.clone());
        let first = repo
            .submit_collection(draft(WasteType::WoodAsh, 3.0, QuantityUnit::Ton), Utc::now())
            .await
            .unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);
        let result = repo
            .submit_collection(draft(WasteType::WoodAsh, 4.0, QuantityUnit::Ton), Utc::now())
            .await;
        assert!(matches!(
            result,
            Err(Error::Store(StoreError::Write { .. }))
        ));

        assert_eq!(repo.load_all::<CollectionRequest>().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_reported_then_tolerated() {
        let repo = RecordRepository::new(MemoryStore::new());
        repo.store()
            .set("collections/0000000000bad", "{\"id\": ")
            .await
            .unwrap();

        let err = repo.load_all::<CollectionRequest>().await.unwrap_err();
        assert!(matches!(err, Error::Store(ref e) if e.is_malformed()));
        assert!(repo.load_all_or_empty::<CollectionRequest>().await.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_array_is_read_and_migrated() {
        let repo = RecordRepository::new(MemoryStore::new());
        let legacy = r#"[{
            "id": "lx2k9a1b2c3",
            "wasteType": "wood_ash",
            "requestedQuantity": "12 m3",
            "purpose": "composting",
            "neededBy": "2025-02-17T14:03:11.512Z",
            "notes": "",
            "status": "approved",
            "requestDate": "2025-02-10T14:03:11.512Z",
            "requestNumber": "REQ-1042",
            "organizationName": "Secretaria Municipal de Agricultura",
            "location": "Av. Principal, 123 - Tangará da Serra, MT"
        }]"#;
        repo.store().set("wasteRequests", legacy).await.unwrap();

        let submitted = repo
            .submit_waste_request(
                WasteRequestDraft {
                    waste_type: Some(WasteType::MixedAsh),
                    quantity: Some(Quantity::new(1.0, QuantityUnit::Ton)),
                    purpose: Some(Purpose::LandRecovery),
                    needed_by: None,
                    notes: Some("Entrega no viveiro".to_string()),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let before: Vec<WasteRequest> = repo.load_all().await.unwrap();
        assert_eq!(before.len(), 2);
        assert_eq!(before[0].request_number, "REQ-1042");
        assert_eq!(before[1], submitted);

        assert_eq!(repo.migrate_legacy::<WasteRequest>().await.unwrap(), 1);
        assert_eq!(repo.store().get("wasteRequests").await.unwrap(), None);
        assert_eq!(repo.migrate_legacy::<WasteRequest>().await.unwrap(), 0);

        let after: Vec<WasteRequest> = repo.load_all().await.unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].request_number, "REQ-1042");
        assert_eq!(after[0].status, WasteRequestStatus::Approved);
        assert_eq!(after[1], submitted);
    }

    #[tokio::test]
    async fn test_order_survives_migration_and_cancel() {
        let repo = RecordRepository::new(MemoryStore::new());
        // Ids written by the mobile app sort after the zero-padded ones.
        let legacy = r#"[{
            "id": "m7abcdefxyz12",
            "requestNumber": "SOL-1042",
            "wasteType": "rice_husk_ash",
            "estimatedQuantity": "500 kg",
            "status": "scheduled",
            "requestDate": "2025-02-10T14:03:11.512Z",
            "scheduledDate": "2025-02-14T11:00:00.000Z",
            "companyName": "Agroindústria Exemplo",
            "location": "Av. Principal, 123 - Tangará da Serra, MT"
        }]"#;
        repo.store().set("collections", legacy).await.unwrap();

        let first = repo
            .submit_collection(draft(WasteType::WoodAsh, 2.0, QuantityUnit::Ton), Utc::now())
            .await
            .unwrap();
        let second = repo
            .submit_collection(draft(WasteType::BiomassAsh, 40.0, QuantityUnit::Kilogram), Utc::now())
            .await
            .unwrap();
        assert!(first.id < RecordId::from("m7abcdefxyz12"));

        let numbers = |records: &[CollectionRequest]| {
            records
                .iter()
                .map(|r| r.request_number.clone())
                .collect::<Vec<_>>()
        };
        let expected = vec![
            "SOL-1042".to_string(),
            first.request_number.clone(),
            second.request_number.clone(),
        ];

        let before = repo.load_all::<CollectionRequest>().await.unwrap();
        assert_eq!(numbers(&before), expected);

        assert_eq!(repo.migrate_legacy::<CollectionRequest>().await.unwrap(), 1);
        let migrated = repo.load_all::<CollectionRequest>().await.unwrap();
        assert_eq!(migrated, before);

        repo.cancel::<CollectionRequest>(&first.id).await.unwrap();
        let after = repo.load_all::<CollectionRequest>().await.unwrap();
        assert_eq!(numbers(&after), expected);
        assert_eq!(after[1].status, CollectionStatus::Canceled);
        assert_eq!(after.last().unwrap(), &second);
    }

    #[tokio::test]
    async fn test_appended_record_is_last_whatever_its_id() {
        let repo = RecordRepository::new(MemoryStore::new());
        let start = Utc::now();

        // Each id sorts before the previous one, as after a clock change.
        for (step, id) in ["zz000000000001", "m7abcdefxyz12", "0000000000aaaa"]
            .into_iter()
            .enumerate()
        {
            let record = draft(WasteType::SugarcaneAsh, 10.0, QuantityUnit::Ton)
                .into_record(
                    RecordId::from(id),
                    format!("SOL-{}", 1100 + step),
                    start + chrono::Duration::minutes(step as i64),
                )
                .unwrap();
            repo.append(&record).await.unwrap();

            let all = repo.load_all::<CollectionRequest>().await.unwrap();
            assert_eq!(all.len(), step + 1);
            assert_eq!(all.last().unwrap(), &record);
        }
    }

    #[tokio::test]
    async fn test_find() {
        let repo = RecordRepository::new(MemoryStore::new());
        let record = repo
            .submit_collection(
                draft(WasteType::SugarcaneAsh, 80.0, QuantityUnit::Kilogram),
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(
            repo.find::<CollectionRequest>(&record.id).await.unwrap(),
            Some(record)
        );
        assert_eq!(
            repo.find::<CollectionRequest>(&RecordId::from("nope"))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_cancel_only_pending() {
        let repo = RecordRepository::new(MemoryStore::new());
        let record = repo
            .submit_collection(draft(WasteType::BiomassAsh, 10.0, QuantityUnit::Ton), Utc::now())
            .await
            .unwrap();

        let canceled = repo.cancel::<CollectionRequest>(&record.id).await.unwrap();
        assert_eq!(canceled.status, CollectionStatus::Canceled);
        assert_eq!(
            repo.find::<CollectionRequest>(&record.id)
                .await
                .unwrap()
                .unwrap()
                .status,
            CollectionStatus::Canceled
        );

        assert!(matches!(
            repo.cancel::<CollectionRequest>(&record.id).await,
            Err(Error::InvalidTransition { .. })
        ));
        assert!(matches!(
            repo.cancel::<CollectionRequest>(&RecordId::from("missing")).await,
            Err(Error::NotFound(_))
        ));
        assert_eq!(repo.load_all::<CollectionRequest>().await.unwrap().len(), 1);
    }
}
