//! CSV export of the record list.

use crate::record::SensorRecord;
use crate::utils::format_datetime;
use anyhow::Result;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 8] = [
    "id",
    "timestamp",
    "date",
    "owner",
    "location",
    "data_type",
    "status",
    "encrypted_data",
];

/// Write records as CSV. Values stay encoded; decrypting is a separate step.
pub fn write_records_csv<W: Write>(writer: W, records: &[&SensorRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for record in records {
        let timestamp = record.timestamp.to_string();
        let date = format_datetime(record.timestamp);
        csv_writer.write_record([
            record.id.as_str(),
            timestamp.as_str(),
            date.as_str(),
            record.owner.as_str(),
            record.location.as_str(),
            record.data_type.as_str(),
            record.status.as_str(),
            record.encrypted_data.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_records_csv(path: &Path, records: &[&SensorRecord]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_records_csv(file, records)?;
    tracing::info!("Exported {} records to {:?}", records.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_fhe;
    use crate::record::{DataType, RecordStatus};

    #[test]
    fn test_write_records_csv() {
        let record = SensorRecord {
            id: "1700000000000-abc1234".to_string(),
            encrypted_data: mock_fhe::encode(42.0),
            timestamp: 1_700_000_000,
            owner: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string(),
            location: "North field, plot 3".to_string(),
            data_type: DataType::SoilCarbon,
            status: RecordStatus::Verified,
            notes: String::new(),
        };

        let mut out = Vec::new();
        write_records_csv(&mut out, &[&record]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,timestamp,date,owner,location,data_type,status,encrypted_data"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("1700000000000-abc1234,1700000000,2023-11-14 22:13 UTC,"));
        // comma in the location forces quoting
        assert!(row.contains("\"North field, plot 3\""));
        assert!(row.ends_with(",soil_carbon,verified,FHE-NDI="));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_empty_list_has_header_only() {
        let mut out = Vec::new();
        write_records_csv(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
