//! Document ID generation.
//!
//! The remote store assigns opaque string IDs to documents. We use UUID v7,
//! which is time-sortable and generated without coordination, so locally
//! created documents keep a stable chronological order even before the server
//! timestamp resolves.

use uuid::Uuid;

/// Generate a new document ID.
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

/// Extract the approximate creation timestamp from a v7 document ID.
///
/// Returns `None` for IDs minted elsewhere (e.g. auth-provider UIDs).
pub fn extract_timestamp(id: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let uuid = Uuid::parse_str(id).ok()?;
    if uuid.get_version_num() != 7 {
        return None;
    }

    let bytes = uuid.as_bytes();
    // UUID v7: first 48 bits are a millisecond timestamp
    let ms = ((bytes[0] as u64) << 40)
        | ((bytes[1] as u64) << 32)
        | ((bytes[2] as u64) << 24)
        | ((bytes[3] as u64) << 16)
        | ((bytes[4] as u64) << 8)
        | (bytes[5] as u64);

    chrono::DateTime::from_timestamp_millis(ms as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_id();
        let id2 = generate_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_ids_are_time_sortable() {
        let id1 = generate_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = generate_id();
        assert!(id1 < id2);
    }

    #[test]
    fn test_extract_timestamp() {
        let before = chrono::Utc::now();
        let id = generate_id();
        let after = chrono::Utc::now();

        let extracted = extract_timestamp(&id).expect("should extract timestamp");
        assert!(extracted >= before - chrono::Duration::milliseconds(1));
        assert!(extracted <= after + chrono::Duration::milliseconds(1));
    }

    #[test]
    fn test_foreign_ids_have_no_timestamp() {
        assert!(extract_timestamp("auth-uid-12345").is_none());
    }
}
