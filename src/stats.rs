//! Dashboard aggregates and list filtering.

use crate::record::{DataType, RecordStatus, SensorRecord};
use std::collections::HashMap;

/// Environmental score at which the impact meter is full
pub const IMPACT_FULL_SCORE: f64 = 1000.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    pub verified: usize,
    pub pending: usize,
    pub rejected: usize,
    /// Sum of decoded values of verified records
    pub environmental_score: f64,
    pub by_type: HashMap<DataType, usize>,
}

impl DashboardStats {
    pub fn from_records(records: &[SensorRecord]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            match record.status {
                RecordStatus::Pending => stats.pending += 1,
                RecordStatus::Verified => {
                    stats.verified += 1;
                    stats.environmental_score += record.plain_value().unwrap_or(0.0);
                }
                RecordStatus::Rejected => stats.rejected += 1,
            }
            *stats.by_type.entry(record.data_type).or_insert(0) += 1;
        }
        stats
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn type_count(&self, data_type: DataType) -> usize {
        self.by_type.get(&data_type).copied().unwrap_or(0)
    }

    /// Fraction of all records with this type, 0.0 when there are none
    pub fn type_share(&self, data_type: DataType) -> f32 {
        self.type_count(data_type) as f32 / self.total.max(1) as f32
    }

    /// Impact meter fill in `[0, 1]`
    pub fn impact_fill(&self) -> f32 {
        (self.environmental_score / IMPACT_FULL_SCORE).clamp(0.0, 1.0) as f32
    }
}

/// List filter; `None` means "all"
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub data_type: Option<DataType>,
    pub status: Option<RecordStatus>,
}

impl RecordFilter {
    pub fn matches(&self, record: &SensorRecord) -> bool {
        self.data_type.map_or(true, |t| t == record.data_type)
            && self.status.map_or(true, |s| s == record.status)
    }

    pub fn apply<'a>(&self, records: &'a [SensorRecord]) -> Vec<&'a SensorRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    pub fn is_active(&self) -> bool {
        self.data_type.is_some() || self.status.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_fhe;

    fn record(id: &str, data_type: DataType, status: RecordStatus, value: f64) -> SensorRecord {
        SensorRecord {
            id: id.to_string(),
            encrypted_data: mock_fhe::encode(value),
            timestamp: 1,
            owner: "0x1".to_string(),
            location: "Field".to_string(),
            data_type,
            status,
            notes: String::new(),
        }
    }

    fn sample() -> Vec<SensorRecord> {
        vec![
            record("a", DataType::SoilCarbon, RecordStatus::Verified, 120.0),
            record("b", DataType::SoilCarbon, RecordStatus::Pending, 50.0),
            record("c", DataType::Moisture, RecordStatus::Rejected, 8.0),
            record("d", DataType::PhLevel, RecordStatus::Verified, 6.0),
        ]
    }

    // ==================== DashboardStats tests ====================

    #[test]
    fn test_stats_empty() {
        let stats = DashboardStats::from_records(&[]);
        assert!(stats.is_empty());
        assert_eq!(stats.environmental_score, 0.0);
        assert_eq!(stats.type_share(DataType::Moisture), 0.0);
        assert_eq!(stats.impact_fill(), 0.0);
    }

    #[test]
    fn test_stats_counts() {
        let stats = DashboardStats::from_records(&sample());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.verified, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.type_count(DataType::SoilCarbon), 2);
        assert_eq!(stats.type_count(DataType::Temperature), 0);
    }

    #[test]
    fn test_environmental_score_counts_verified_only() {
        let stats = DashboardStats::from_records(&sample());
        assert_eq!(stats.environmental_score, 126.0);
    }

    #[test]
    fn test_undecodable_verified_value_counts_zero() {
        let mut bad = record("x", DataType::Moisture, RecordStatus::Verified, 1.0);
        bad.encrypted_data = "FHE-???".to_string();
        let stats = DashboardStats::from_records(&[bad]);
        assert_eq!(stats.verified, 1);
        assert_eq!(stats.environmental_score, 0.0);
    }

    #[test]
    fn test_type_share() {
        let stats = DashboardStats::from_records(&sample());
        assert_eq!(stats.type_share(DataType::SoilCarbon), 0.5);
        assert_eq!(stats.type_share(DataType::PhLevel), 0.25);
    }

    #[test]
    fn test_impact_fill_caps_at_one() {
        let stats = DashboardStats::from_records(&[record(
            "big",
            DataType::SoilCarbon,
            RecordStatus::Verified,
            5000.0,
        )]);
        assert_eq!(stats.impact_fill(), 1.0);

        let half = DashboardStats::from_records(&[record(
            "half",
            DataType::SoilCarbon,
            RecordStatus::Verified,
            500.0,
        )]);
        assert_eq!(half.impact_fill(), 0.5);
    }

    // ==================== RecordFilter tests ====================

    #[test]
    fn test_default_filter_matches_all() {
        let records = sample();
        let filter = RecordFilter::default();
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&records).len(), 4);
    }

    #[test]
    fn test_filter_by_type() {
        let records = sample();
        let filter = RecordFilter {
            data_type: Some(DataType::SoilCarbon),
            status: None,
        };
        let ids: Vec<_> = filter.apply(&records).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_filter_by_type_and_status() {
        let records = sample();
        let filter = RecordFilter {
            data_type: Some(DataType::SoilCarbon),
            status: Some(RecordStatus::Pending),
        };
        let ids: Vec<_> = filter.apply(&records).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert!(filter.is_active());
    }
}
