use serde::{Deserialize, Serialize};

use crate::constants::BYTES_PER_GB;

/// Capacity reported by the quota endpoint, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSpace {
    pub total_space: u64,
    pub used_space: u64,
}

impl DiskSpace {
    /// Free space, never negative even if the provider over-reports usage
    pub fn free_space(&self) -> u64 {
        self.total_space.saturating_sub(self.used_space)
    }

    pub fn has_room_for(&self, size: u64) -> bool {
        self.free_space() >= size
    }
}

pub fn as_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

/// Pre-signed upload target returned by the upload-link endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UploadLink {
    pub href: String,
    #[serde(default)]
    pub method: Option<String>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub remote_path: String,
    pub size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_space_and_room() {
        let space = DiskSpace {
            total_space: 1000,
            used_space: 900,
        };
        assert_eq!(space.free_space(), 100);
        assert!(space.has_room_for(50));
        assert!(space.has_room_for(100));
        assert!(!space.has_room_for(150));
    }

    #[test]
    fn test_over_reported_usage_saturates() {
        let space = DiskSpace {
            total_space: 10,
            used_space: 20,
        };
        assert_eq!(space.free_space(), 0);
        assert!(space.has_room_for(0));
    }

    #[test]
    fn test_quota_payload_ignores_extra_fields() {
        let space: DiskSpace = serde_json::from_str(
            r#"{"total_space": 1000, "used_space": 900, "trash_size": 5, "is_paid": false}"#,
        )
        .unwrap();
        assert_eq!(space.free_space(), 100);
    }

    #[test]
    fn test_gb_conversion() {
        assert!((as_gb(1024 * 1024 * 1024) - 1.0).abs() < f64::EPSILON);
    }
}
