//! Sensor record registry over a [`KvStore`].
//!
//! Layout: `sensor_keys` holds a JSON array of record ids, and each record
//! lives as JSON under `sensor_<id>`. Records are never deleted.

use crate::contract::{KvStore, TxReceiptInfo};
use crate::mock_fhe::{self, ComputeOp, MockFheError};
use crate::record::{generate_record_id, RecordDraft, RecordStatus, SensorRecord, StoredRecord};
use crate::wallet;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Key holding the JSON array of record ids
pub const SENSOR_KEYS_KEY: &str = "sensor_keys";

/// Store key for one record
pub fn record_key(id: &str) -> String {
    format!("sensor_{}", id)
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Please connect wallet first")]
    WalletNotConnected,

    #[error("Please fill required fields: {0}")]
    InvalidDraft(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Only the record owner can review it")]
    NotOwner,

    #[error("Record is already {}", .0.as_str())]
    AlreadyFinal(RecordStatus),

    #[error("Malformed stored data: {0}")]
    Malformed(String),

    #[error("Encoding error: {0}")]
    Encoding(#[from] MockFheError),

    #[error("{0}")]
    Store(#[from] anyhow::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Owner decision on a pending record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewDecision {
    Verify,
    Reject,
}

impl ReviewDecision {
    pub fn target_status(&self) -> RecordStatus {
        match self {
            ReviewDecision::Verify => RecordStatus::Verified,
            ReviewDecision::Reject => RecordStatus::Rejected,
        }
    }

    pub fn compute_op(&self) -> ComputeOp {
        match self {
            ReviewDecision::Verify => ComputeOp::Aggregate,
            ReviewDecision::Reject => ComputeOp::Penalize,
        }
    }

    /// Noun used in banners, e.g. "Verification failed: ..."
    pub fn action_label(&self) -> &'static str {
        match self {
            ReviewDecision::Verify => "Verification",
            ReviewDecision::Reject => "Rejection",
        }
    }
}

/// A confirmed write and the record as it now stands
#[derive(Debug, Clone)]
pub struct RecordWrite {
    pub record: SensorRecord,
    pub receipt: TxReceiptInfo,
}

/// Parse the `sensor_keys` value. Empty or blank means no keys.
pub fn parse_keys(bytes: &[u8]) -> RegistryResult<Vec<String>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| RegistryError::Malformed(format!("sensor_keys is not UTF-8: {}", e)))?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|e| RegistryError::Malformed(format!("sensor_keys: {}", e)))
}

async fn read_keys(store: &dyn KvStore) -> RegistryResult<Vec<String>> {
    let bytes = store.get_data(SENSOR_KEYS_KEY).await?;
    match parse_keys(&bytes) {
        Ok(keys) => Ok(keys),
        Err(e) => {
            warn!("Error parsing sensor keys, treating as empty: {}", e);
            Ok(Vec::new())
        }
    }
}

/// Load every readable record, newest first.
///
/// An unavailable store yields no records. Individual records that are
/// missing or fail to parse are skipped.
pub async fn load_records(store: &dyn KvStore) -> RegistryResult<Vec<SensorRecord>> {
    if !store.is_available().await? {
        info!("Store reports unavailable, no records loaded");
        return Ok(Vec::new());
    }

    let keys = read_keys(store).await?;
    let mut records = Vec::with_capacity(keys.len());
    for key in keys {
        let bytes = match store.get_data(&record_key(&key)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Error loading sensor {}: {}", key, e);
                continue;
            }
        };
        if bytes.is_empty() {
            debug!("Sensor {} has no stored value", key);
            continue;
        }
        match StoredRecord::from_bytes(&bytes) {
            Ok(stored) => records.push(SensorRecord::from_stored(key, stored)),
            Err(e) => warn!("Error parsing sensor data for {}: {}", key, e),
        }
    }

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(records)
}

/// Validate, encode and store a new pending record, then append its id.
///
/// Validation happens before any store access.
pub async fn submit_record(
    store: &dyn KvStore,
    owner: Option<&str>,
    draft: &RecordDraft,
    now: DateTime<Utc>,
) -> RegistryResult<RecordWrite> {
    let owner = owner.ok_or(RegistryError::WalletNotConnected)?;
    draft.validate()?;

    let id = generate_record_id(now.timestamp_millis(), &mut rand::thread_rng());
    let stored = draft.to_stored(owner, now.timestamp().max(0) as u64);

    let receipt = store.set_data(&record_key(&id), stored.to_bytes()?).await?;

    let mut keys = read_keys(store).await?;
    keys.push(id.clone());
    let keys_bytes = serde_json::to_vec(&keys).map_err(|e| RegistryError::Malformed(e.to_string()))?;
    store.set_data(SENSOR_KEYS_KEY, keys_bytes).await?;

    info!("Submitted sensor record {} for {}", id, owner);
    Ok(RecordWrite {
        record: SensorRecord::from_stored(id, stored),
        receipt,
    })
}

/// Apply an owner decision to a pending record, rewriting it in place.
///
/// Nothing is written unless every check passes.
pub async fn review_record(
    store: &dyn KvStore,
    caller: Option<&str>,
    id: &str,
    decision: ReviewDecision,
) -> RegistryResult<RecordWrite> {
    let caller = caller.ok_or(RegistryError::WalletNotConnected)?;

    let key = record_key(id);
    let bytes = store.get_data(&key).await?;
    if bytes.is_empty() {
        return Err(RegistryError::RecordNotFound(id.to_string()));
    }
    let mut stored = StoredRecord::from_bytes(&bytes)?;

    if !wallet::is_owner(Some(caller), &stored.owner) {
        return Err(RegistryError::NotOwner);
    }
    if stored.status.is_final() {
        return Err(RegistryError::AlreadyFinal(stored.status));
    }

    stored.data = mock_fhe::transform(&stored.data, decision.compute_op())?;
    stored.status = decision.target_status();

    let receipt = store.set_data(&key, stored.to_bytes()?).await?;
    info!("Record {} marked {}", id, stored.status.as_str());
    Ok(RecordWrite {
        record: SensorRecord::from_stored(id, stored),
        receipt,
    })
}

pub async fn verify_record(store: &dyn KvStore, caller: Option<&str>, id: &str) -> RegistryResult<RecordWrite> {
    review_record(store, caller, id, ReviewDecision::Verify).await
}

pub async fn reject_record(store: &dyn KvStore, caller: Option<&str>, id: &str) -> RegistryResult<RecordWrite> {
    review_record(store, caller, id, ReviewDecision::Reject).await
}
