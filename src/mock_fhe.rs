//! Placeholder "FHE" value encoding.
//!
//! This is NOT encryption. Values are base64 text behind an `FHE-` tag so the
//! dashboard can show an opaque-looking string, and anyone can reverse it.
//! The scalar operations stand in for homomorphic computation in the demo.

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

/// Tag prepended to every encoded value
pub const ENCODING_PREFIX: &str = "FHE-";

/// Scale applied when a reading is verified
pub const AGGREGATE_MULTIPLIER: f64 = 1.2;

/// Scale applied when a reading is rejected
pub const PENALIZE_MULTIPLIER: f64 = 0.8;

/// Maximum characters shown by [`preview`] before the ellipsis
const PREVIEW_LEN: usize = 50;

#[derive(Debug, Error, PartialEq)]
pub enum MockFheError {
    #[error("Invalid encoded value '{0}'")]
    InvalidEncoding(String),
}

/// Scalar operation applied by [`transform`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputeOp {
    Aggregate,
    Penalize,
    Identity,
}

impl ComputeOp {
    pub fn multiplier(&self) -> f64 {
        match self {
            ComputeOp::Aggregate => AGGREGATE_MULTIPLIER,
            ComputeOp::Penalize => PENALIZE_MULTIPLIER,
            ComputeOp::Identity => 1.0,
        }
    }
}

/// Encode a reading as `FHE-<base64 of its decimal text>`
pub fn encode(value: f64) -> String {
    let text = value.to_string();
    format!("{}{}", ENCODING_PREFIX, general_purpose::STANDARD.encode(text))
}

/// Reverse [`encode`]. Untagged input is read as a plain decimal.
pub fn decode(encoded: &str) -> Result<f64, MockFheError> {
    let invalid = || MockFheError::InvalidEncoding(encoded.to_string());

    let text = match encoded.strip_prefix(ENCODING_PREFIX) {
        Some(payload) => {
            let bytes = general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|_| invalid())?;
            String::from_utf8(bytes).map_err(|_| invalid())?
        }
        None => encoded.to_string(),
    };

    text.trim().parse::<f64>().map_err(|_| invalid())
}

/// Decode, scale by the operation's multiplier, and re-encode
pub fn transform(encoded: &str, op: ComputeOp) -> Result<String, MockFheError> {
    let value = decode(encoded)?;
    Ok(encode(value * op.multiplier()))
}

/// Truncated encoding shown in the create form
pub fn preview(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "No value entered".to_string();
    }
    let encoded = encode(value);
    let head: String = encoded.chars().take(PREVIEW_LEN).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {} to be close to {}",
            actual,
            expected
        );
    }

    // ==================== encode / decode tests ====================

    #[test]
    fn test_encode_has_prefix() {
        let encoded = encode(42.0);
        assert!(encoded.starts_with(ENCODING_PREFIX));
        // "42" in base64
        assert_eq!(encoded, "FHE-NDI=");
    }

    #[test]
    fn test_decode_reverses_encode() {
        for value in [0.0, 1.0, -3.5, 12.34, 0.1 + 0.2, 1e-7, 123456789.125, f64::MAX] {
            assert_eq!(decode(&encode(value)).unwrap(), value);
        }
    }

    #[test]
    fn test_decode_plain_decimal() {
        assert_eq!(decode("17.5").unwrap(), 17.5);
    }

    #[test]
    fn test_decode_invalid_base64() {
        let result = decode("FHE-***");
        assert_eq!(result, Err(MockFheError::InvalidEncoding("FHE-***".to_string())));
    }

    #[test]
    fn test_decode_non_numeric_payload() {
        // "abc" in base64
        assert!(decode("FHE-YWJj").is_err());
        assert!(decode("hello").is_err());
    }

    // ==================== transform tests ====================

    #[test]
    fn test_transform_aggregate() {
        let out = transform(&encode(100.0), ComputeOp::Aggregate).unwrap();
        assert_close(decode(&out).unwrap(), 120.0);
    }

    #[test]
    fn test_transform_penalize() {
        let out = transform(&encode(100.0), ComputeOp::Penalize).unwrap();
        assert_close(decode(&out).unwrap(), 80.0);
    }

    #[test]
    fn test_transform_identity_keeps_value() {
        let encoded = encode(7.25);
        assert_eq!(transform(&encoded, ComputeOp::Identity).unwrap(), encoded);
    }

    #[test]
    fn test_transform_aggregate_compounds() {
        let mut encoded = encode(100.0);
        for _ in 0..3 {
            encoded = transform(&encoded, ComputeOp::Aggregate).unwrap();
        }
        assert_close(decode(&encoded).unwrap(), 100.0 * 1.2 * 1.2 * 1.2);
    }

    #[test]
    fn test_transform_penalize_compounds() {
        let once = transform(&encode(50.0), ComputeOp::Penalize).unwrap();
        let twice = transform(&once, ComputeOp::Penalize).unwrap();
        assert_ne!(once, twice);
        assert_close(decode(&twice).unwrap(), 50.0 * 0.8 * 0.8);
    }

    #[test]
    fn test_transform_rejects_garbage() {
        assert!(transform("FHE-%%", ComputeOp::Aggregate).is_err());
    }

    // ==================== preview tests ====================

    #[test]
    fn test_preview_zero() {
        assert_eq!(preview(0.0), "No value entered");
    }

    #[test]
    fn test_preview_truncates() {
        let p = preview(123456789012345678901234567890.0);
        assert!(p.ends_with("..."));
        assert!(p.chars().count() <= PREVIEW_LEN + 3);
        assert!(p.starts_with(ENCODING_PREFIX));
    }
}
