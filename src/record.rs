//! Sensor record model and the JSON layout stored under `sensor_<id>`.

use crate::mock_fhe;
use crate::registry::RegistryError;
use crate::wallet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Length of the random suffix in generated record ids
const ID_SUFFIX_LEN: usize = 7;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Kind of reading a sensor reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    #[default]
    SoilCarbon,
    Moisture,
    Temperature,
    PhLevel,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::SoilCarbon,
        DataType::Moisture,
        DataType::Temperature,
        DataType::PhLevel,
    ];

    /// Title-case label for selectors
    pub fn label(&self) -> &'static str {
        match self {
            DataType::SoilCarbon => "Soil Carbon",
            DataType::Moisture => "Moisture",
            DataType::Temperature => "Temperature",
            DataType::PhLevel => "pH Level",
        }
    }

    /// Wire tag with the underscore shown as a space, as listed in rows
    pub fn short_label(&self) -> &'static str {
        match self {
            DataType::SoilCarbon => "soil carbon",
            DataType::Moisture => "moisture",
            DataType::Temperature => "temperature",
            DataType::PhLevel => "ph level",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::SoilCarbon => "soil_carbon",
            DataType::Moisture => "moisture",
            DataType::Temperature => "temperature",
            DataType::PhLevel => "ph_level",
        }
    }
}

/// Review state of a record. Only `Pending` may change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl RecordStatus {
    pub const ALL: [RecordStatus; 3] = [
        RecordStatus::Pending,
        RecordStatus::Verified,
        RecordStatus::Rejected,
    ];

    pub fn is_final(&self) -> bool {
        !matches!(self, RecordStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Verified => "verified",
            RecordStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "Pending",
            RecordStatus::Verified => "Verified",
            RecordStatus::Rejected => "Rejected",
        }
    }
}

/// Exact JSON object written to the contract.
///
/// Fields this version does not know about are kept in `extra` so a
/// review rewrite does not drop them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub data: String,
    pub timestamp: u64,
    pub owner: String,
    pub location: String,
    #[serde(rename = "dataType")]
    pub data_type: DataType,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredRecord {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RegistryError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| RegistryError::Malformed(format!("record is not UTF-8: {}", e)))?;
        serde_json::from_str(text).map_err(|e| RegistryError::Malformed(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, RegistryError> {
        serde_json::to_vec(self).map_err(|e| RegistryError::Malformed(e.to_string()))
    }
}

/// One sensor reading plus metadata, as shown by the dashboard
#[derive(Clone, Debug, PartialEq)]
pub struct SensorRecord {
    pub id: String,
    pub encrypted_data: String,
    pub timestamp: u64,
    pub owner: String,
    pub location: String,
    pub data_type: DataType,
    pub status: RecordStatus,
    pub notes: String,
}

impl SensorRecord {
    pub fn from_stored(id: impl Into<String>, stored: StoredRecord) -> Self {
        Self {
            id: id.into(),
            encrypted_data: stored.data,
            timestamp: stored.timestamp,
            owner: stored.owner,
            location: stored.location,
            data_type: stored.data_type,
            status: stored.status,
            notes: stored.notes,
        }
    }

    /// True when `viewer` owns this record, ignoring address case
    pub fn is_owned_by(&self, viewer: Option<&str>) -> bool {
        wallet::is_owner(viewer, &self.owner)
    }

    /// Whether verify/reject controls are shown to `viewer`
    pub fn can_review(&self, viewer: Option<&str>) -> bool {
        self.status == RecordStatus::Pending && self.is_owned_by(viewer)
    }

    /// Decoded reading, or `None` when the stored value is not decodable
    pub fn plain_value(&self) -> Option<f64> {
        mock_fhe::decode(&self.encrypted_data).ok()
    }
}

/// Values collected by the create-record form
#[derive(Clone, Debug, PartialEq)]
pub struct RecordDraft {
    pub location: String,
    pub data_type: DataType,
    pub value: f64,
    pub notes: String,
}

impl Default for RecordDraft {
    fn default() -> Self {
        Self {
            location: String::new(),
            data_type: DataType::SoilCarbon,
            value: 0.0,
            notes: String::new(),
        }
    }
}

impl RecordDraft {
    /// Location and a non-zero value are required
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.location.trim().is_empty() {
            return Err(RegistryError::InvalidDraft("location is required".to_string()));
        }
        if self.value == 0.0 || !self.value.is_finite() {
            return Err(RegistryError::InvalidDraft("a non-zero reading is required".to_string()));
        }
        Ok(())
    }

    pub fn to_stored(&self, owner: &str, timestamp: u64) -> StoredRecord {
        StoredRecord {
            data: mock_fhe::encode(self.value),
            timestamp,
            owner: owner.to_string(),
            location: self.location.clone(),
            data_type: self.data_type,
            status: RecordStatus::Pending,
            notes: self.notes.clone(),
            extra: Map::new(),
        }
    }
}

/// Generate a record id: `<unix millis>-<7 base36 chars>`
pub fn generate_record_id<R: Rng + ?Sized>(unix_millis: i64, rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}", unix_millis, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const OWNER: &str = "0xAbCdEf0000000000000000000000000000000001";

    fn sample_record(status: RecordStatus) -> SensorRecord {
        SensorRecord {
            id: "1-abc".to_string(),
            encrypted_data: mock_fhe::encode(3.0),
            timestamp: 10,
            owner: OWNER.to_string(),
            location: "North field".to_string(),
            data_type: DataType::Moisture,
            status,
            notes: String::new(),
        }
    }

    // ==================== StoredRecord tests ====================

    #[test]
    fn test_stored_record_field_names() {
        let draft = RecordDraft {
            location: "Plot 7".to_string(),
            data_type: DataType::PhLevel,
            value: 6.5,
            notes: "after rain".to_string(),
        };
        let json: Value = serde_json::to_value(draft.to_stored(OWNER, 1_700_000_000)).unwrap();
        assert_eq!(json["dataType"], "ph_level");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["timestamp"], 1_700_000_000u64);
        assert_eq!(json["owner"], OWNER);
        assert_eq!(json["notes"], "after rain");
        assert!(json["data"].as_str().unwrap().starts_with("FHE-"));
    }

    #[test]
    fn test_stored_record_missing_status_is_pending() {
        let raw = br#"{"data":"FHE-MQ==","timestamp":5,"owner":"0x1","location":"A","dataType":"moisture"}"#;
        let stored = StoredRecord::from_bytes(raw).unwrap();
        assert_eq!(stored.status, RecordStatus::Pending);
        assert_eq!(stored.notes, "");
    }

    #[test]
    fn test_stored_record_keeps_unknown_fields() {
        let raw = br#"{"data":"FHE-MQ==","timestamp":5,"owner":"0x1","location":"A","dataType":"moisture","status":"pending","sensorId":"S-9"}"#;
        let mut stored = StoredRecord::from_bytes(raw).unwrap();
        stored.status = RecordStatus::Verified;
        let json: Value = serde_json::from_slice(&stored.to_bytes().unwrap()).unwrap();
        assert_eq!(json["sensorId"], "S-9");
        assert_eq!(json["status"], "verified");
    }

    #[test]
    fn test_stored_record_unknown_data_type_is_malformed() {
        let raw = br#"{"data":"x","timestamp":5,"owner":"0x1","location":"A","dataType":"wind"}"#;
        assert!(matches!(StoredRecord::from_bytes(raw), Err(RegistryError::Malformed(_))));
    }

    // ==================== SensorRecord tests ====================

    #[test]
    fn test_is_owned_by_ignores_case() {
        let record = sample_record(RecordStatus::Pending);
        assert!(record.is_owned_by(Some(&OWNER.to_lowercase())));
        assert!(!record.is_owned_by(Some("0x0000000000000000000000000000000000000002")));
        assert!(!record.is_owned_by(None));
    }

    #[test]
    fn test_can_review_only_owner_and_pending() {
        let pending = sample_record(RecordStatus::Pending);
        assert!(pending.can_review(Some(OWNER)));
        assert!(!pending.can_review(Some("0x0000000000000000000000000000000000000002")));
        assert!(!pending.can_review(None));

        let verified = sample_record(RecordStatus::Verified);
        assert!(!verified.can_review(Some(OWNER)));
    }

    #[test]
    fn test_plain_value() {
        assert_eq!(sample_record(RecordStatus::Pending).plain_value(), Some(3.0));
    }

    // ==================== RecordDraft tests ====================

    #[test]
    fn test_draft_validate_requires_location() {
        let draft = RecordDraft { value: 1.0, location: "  ".to_string(), ..Default::default() };
        assert!(matches!(draft.validate(), Err(RegistryError::InvalidDraft(_))));
    }

    #[test]
    fn test_draft_validate_requires_value() {
        let draft = RecordDraft { location: "Field".to_string(), ..Default::default() };
        assert!(matches!(draft.validate(), Err(RegistryError::InvalidDraft(_))));
    }

    #[test]
    fn test_draft_validate_ok() {
        let draft = RecordDraft { location: "Field".to_string(), value: -2.5, ..Default::default() };
        assert!(draft.validate().is_ok());
    }

    // ==================== generate_record_id tests ====================

    #[test]
    fn test_generate_record_id_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = generate_record_id(1_700_000_000_123, &mut rng);
        let (millis, suffix) = id.split_once('-').unwrap();
        assert_eq!(millis, "1700000000123");
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_generate_record_id_differs() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = generate_record_id(1, &mut rng);
        let b = generate_record_id(1, &mut rng);
        assert_ne!(a, b);
    }

    // ==================== label tests ====================

    #[test]
    fn test_labels() {
        assert_eq!(DataType::PhLevel.label(), "pH Level");
        assert_eq!(DataType::SoilCarbon.short_label(), "soil carbon");
        assert_eq!(DataType::SoilCarbon.as_str(), "soil_carbon");
        assert!(RecordStatus::Rejected.is_final());
        assert!(!RecordStatus::Pending.is_final());
    }
}
