use chrono::{DateTime, Utc};

/// Banner text used when the signer declined the request
pub const USER_REJECTED_MESSAGE: &str = "Transaction rejected by user";

/// Fragments that mean the user declined, from wallets and Ledger status words
const REJECTION_MARKERS: &[&str] = &[
    "user rejected transaction",
    "user rejected",
    "user denied",
    "denied by the user",
    "0x6985",
];

/// Shorten a hex address to `0x1234...abcd`
pub fn short_address(address: &str) -> String {
    if address.len() < 12 || !address.is_ascii() {
        return address.to_string();
    }
    let tail_start = if address.len() >= 42 { 38 } else { address.len() - 4 };
    format!("{}...{}", &address[..6], &address[tail_start..])
}

pub fn is_user_rejection(message: &str) -> bool {
    let lower = message.to_lowercase();
    if REJECTION_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return true;
    }
    lower.contains("ledger") && (lower.contains("denied") || lower.contains("rejected"))
}

/// Message shown when `action` fails, e.g. "Submission failed: ..."
pub fn friendly_error(action: &str, message: &str) -> String {
    if is_user_rejection(message) {
        USER_REJECTED_MESSAGE.to_string()
    } else {
        format!("{} failed: {}", action, message)
    }
}

/// Calendar date of a unix timestamp (seconds)
pub fn format_date(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

pub fn format_datetime(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
