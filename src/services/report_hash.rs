//! Deterministic integrity digest over inspection and evidence data.
//!
//! The digest is order-independent: inspections, their evidence hashes and
//! the filter context are all canonicalized by sorting before hashing, so two
//! datasets with the same content always produce the same SHA-256 regardless
//! of retrieval order. The digest is embedded in rendered reports and
//! recomputed by the public verification endpoint; any drift in the
//! underlying data changes it.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::models::{Inspection, Photo};

/// Sentinel stored when a digest could not be produced. Reports carrying it
/// are flagged unverifiable instead of blocking generation.
pub const DIGEST_UNAVAILABLE: &str = "unavailable";

const FILTER_SEPARATOR: &str = "\n--filters--\n";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One inspection's contribution to the manifest.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub id: i64,
    pub code: String,
    pub container_number: String,
    pub status: String,
    pub inspected_at: DateTime<Utc>,
    /// Evidence content hashes; empty strings stand in for photos whose
    /// hash was never computed.
    pub evidence_hashes: Vec<String>,
}

impl ManifestEntry {
    pub fn from_inspection(inspection: &Inspection, photos: &[Photo]) -> Self {
        Self {
            id: inspection.id,
            code: inspection.code.clone(),
            container_number: inspection.container_number.clone(),
            status: inspection.status.as_str().to_string(),
            inspected_at: inspection.inspected_at,
            evidence_hashes: photos
                .iter()
                .map(|p| p.content_hash.clone().unwrap_or_default())
                .collect(),
        }
    }

    fn manifest_line(&self) -> String {
        let mut hashes = self.evidence_hashes.clone();
        hashes.sort();
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.id,
            self.code,
            self.container_number,
            self.status,
            self.inspected_at.format(TIMESTAMP_FORMAT),
            hashes.join(",")
        )
    }
}

/// Canonical manifest: one sorted line per inspection, newline-joined.
pub fn build_manifest(entries: &[ManifestEntry]) -> String {
    let mut lines: Vec<String> = entries.iter().map(ManifestEntry::manifest_line).collect();
    lines.sort();
    lines.join("\n")
}

/// Filters as sorted `key=value` pairs joined with `&`. The BTreeMap makes
/// the ordering independent of how the caller assembled the map.
pub fn filter_string(filters: &BTreeMap<String, String>) -> String {
    filters
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Lowercase hex SHA-256 over the canonical manifest plus filter context.
pub fn compute_digest(entries: &[ManifestEntry], filters: &BTreeMap<String, String>) -> String {
    let payload = format!(
        "{}{}{}",
        build_manifest(entries),
        FILTER_SEPARATOR,
        filter_string(filters)
    );
    sha256_hex(payload.as_bytes())
}

/// Lowercase hex SHA-256 of arbitrary bytes (also used for photo uploads and
/// the secondary file-level report hash).
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(
        id: i64,
        code: &str,
        container: &str,
        status: &str,
        hashes: &[&str],
    ) -> ManifestEntry {
        ManifestEntry {
            id,
            code: code.to_string(),
            container_number: container.to_string(),
            status: status.to_string(),
            inspected_at: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            evidence_hashes: hashes.iter().map(|h| h.to_string()).collect(),
        }
    }

    #[test]
    fn test_manifest_line_example() {
        let e = entry(1, "INS_1000", "ABCD1234567", "pending", &["bb", "aa"]);
        assert_eq!(
            build_manifest(&[e]),
            "1|INS_1000|ABCD1234567|pending|2025-01-01T10:00:00|aa,bb"
        );
    }

    #[test]
    fn test_evidence_order_does_not_matter() {
        let a = entry(1, "INS_1000", "ABCD1234567", "pending", &["aa", "bb"]);
        let b = entry(1, "INS_1000", "ABCD1234567", "pending", &["bb", "aa"]);
        assert_eq!(build_manifest(&[a]), build_manifest(&[b]));
    }

    #[test]
    fn test_inspection_order_does_not_matter() {
        let first = entry(1, "INS_1000", "AAAA1111111", "pending", &["aa"]);
        let second = entry(2, "INS_2000", "BBBB2222222", "approved", &["bb"]);
        let filters = BTreeMap::new();

        let forward = compute_digest(&[first.clone(), second.clone()], &filters);
        let reversed = compute_digest(&[second, first], &filters);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_filter_map_order_does_not_matter() {
        let entries = vec![entry(1, "INS_1000", "AAAA1111111", "pending", &[])];

        let mut forward = BTreeMap::new();
        forward.insert("facility".to_string(), "3".to_string());
        forward.insert("status".to_string(), "pending".to_string());

        let mut reversed = BTreeMap::new();
        reversed.insert("status".to_string(), "pending".to_string());
        reversed.insert("facility".to_string(), "3".to_string());

        assert_eq!(
            compute_digest(&entries, &forward),
            compute_digest(&entries, &reversed)
        );
        assert_eq!(filter_string(&forward), "facility=3&status=pending");
    }

    #[test]
    fn test_every_field_is_sensitive() {
        let base = entry(1, "INS_1000", "ABCD1234567", "pending", &["aa"]);
        let filters = BTreeMap::new();
        let base_digest = compute_digest(&[base.clone()], &filters);

        let variants = vec![
            entry(2, "INS_1000", "ABCD1234567", "pending", &["aa"]),
            entry(1, "INS_1001", "ABCD1234567", "pending", &["aa"]),
            entry(1, "INS_1000", "ABCD7654321", "pending", &["aa"]),
            entry(1, "INS_1000", "ABCD1234567", "approved", &["aa"]),
            entry(1, "INS_1000", "ABCD1234567", "pending", &["ab"]),
            entry(1, "INS_1000", "ABCD1234567", "pending", &["aa", "bb"]),
        ];
        for variant in variants {
            assert_ne!(base_digest, compute_digest(&[variant], &filters));
        }

        let mut shifted = base;
        shifted.inspected_at = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 1).unwrap();
        assert_ne!(base_digest, compute_digest(&[shifted], &filters));
    }

    #[test]
    fn test_empty_evidence_hashes_cleanly() {
        let e = entry(1, "INS_1000", "ABCD1234567", "pending", &[]);
        assert_eq!(
            build_manifest(&[e.clone()]),
            "1|INS_1000|ABCD1234567|pending|2025-01-01T10:00:00|"
        );

        let digest = compute_digest(&[e], &BTreeMap::new());
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let digest = compute_digest(
            &[entry(1, "INS_1000", "ABCD1234567", "pending", &["aa"])],
            &BTreeMap::new(),
        );
        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_digest_is_stable_across_calls() {
        let entries = vec![
            entry(1, "INS_1000", "AAAA1111111", "pending", &["cc", "aa"]),
            entry(2, "INS_2000", "BBBB2222222", "rejected", &[]),
        ];
        let filters = BTreeMap::new();
        assert_eq!(
            compute_digest(&entries, &filters),
            compute_digest(&entries, &filters)
        );
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        // SHA-256 of the empty string
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
