//! Key encoding for persisted job records.
//!
//! A record key is `prefix ~ job-type ~ timestamp`. The separator is
//! forbidden inside job-type names and timestamps are fixed-width, so a
//! forward scan over the namespace range yields every record for one queue
//! instance in enqueue order.

use super::error::QueueError;

pub(crate) const SEPARATOR: char = '~';

/// Join prefix, job type, and timestamp into a record key.
pub(crate) fn encode_key(prefix: &str, job_type: &str, timestamp: &str) -> String {
    format!("{prefix}{SEPARATOR}{job_type}{SEPARATOR}{timestamp}")
}

/// Decode a record key into its job type and timestamp.
///
/// The prefix itself may contain the separator (the default `~queue` does),
/// so decoding takes the last two segments rather than splitting by position.
pub(crate) fn decode_key(key: &str) -> Result<(String, String), QueueError> {
    let mut segments = key.rsplitn(3, SEPARATOR);
    let timestamp = segments.next();
    let job_type = segments.next();
    let head = segments.next();
    match (head, job_type, timestamp) {
        (Some(_), Some(job_type), Some(timestamp))
            if !job_type.is_empty() && !timestamp.is_empty() =>
        {
            Ok((job_type.to_string(), timestamp.to_string()))
        }
        _ => Err(QueueError::MalformedKey(key.to_string())),
    }
}

/// Half-open scan bounds covering every record key under `prefix`.
///
/// Every valid key starts with `prefix~`, and `~` sorts above every character
/// permitted in a job-type name, so `[prefix~, prefix~~)` covers exactly this
/// namespace without touching a sibling prefix like `prefix2`.
pub(crate) fn scan_range(prefix: &str) -> (String, String) {
    (
        format!("{prefix}{SEPARATOR}"),
        format!("{prefix}{SEPARATOR}{SEPARATOR}"),
    )
}

/// Reject job-type names the codec cannot round-trip.
pub(crate) fn validate_job_type(job_type: &str) -> Result<(), QueueError> {
    if job_type.is_empty() || job_type.contains(SEPARATOR) {
        return Err(QueueError::InvalidJobType(job_type.to_string()));
    }
    Ok(())
}
