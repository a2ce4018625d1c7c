//! # Record Loaders
//!
//! Reads the JSON exports the storage layer hands over: analysis records
//! for reports, raw species counts for validation, and pool memberships
//! for the beekeeper filter.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  records.json ──► load_records ──► Vec<AnalysisRecord> ──► build_report │
//! │                                                                         │
//! │  counts.json ───► load_counts ───► Vec<SpeciesCount> ────► validate     │
//! │                                                                         │
//! │  pools.json ────► load_memberships ─► pools_for_beekeeper ─► filter     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use palyno_core::{AnalysisRecord, BeekeeperId, DrumId, PoolId, SpeciesCount};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LabError, LabResult};

/// Links a pool to the drum and beekeeper it was sampled from.
///
/// A pool may hold drums from several beekeepers, so one pool can appear
/// in many memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMembership {
    pub pool_id: PoolId,
    pub drum_id: DrumId,
    pub beekeeper_id: BeekeeperId,
}

/// Pools containing at least one drum from `beekeeper_id`.
pub fn pools_for_beekeeper(
    memberships: &[PoolMembership],
    beekeeper_id: BeekeeperId,
) -> BTreeSet<PoolId> {
    memberships
        .iter()
        .filter(|m| m.beekeeper_id == beekeeper_id)
        .map(|m| m.pool_id)
        .collect()
}

/// Loads analysis records from a JSON array.
pub fn load_records(path: &Path) -> LabResult<Vec<AnalysisRecord>> {
    let records: Vec<AnalysisRecord> = load_json(path)?;
    debug!(?path, count = records.len(), "Loaded analysis records");
    Ok(records)
}

/// Loads species counts from a JSON array.
pub fn load_counts(path: &Path) -> LabResult<Vec<SpeciesCount>> {
    let counts: Vec<SpeciesCount> = load_json(path)?;
    debug!(?path, count = counts.len(), "Loaded species counts");
    Ok(counts)
}

/// Loads pool memberships from a JSON array.
pub fn load_memberships(path: &Path) -> LabResult<Vec<PoolMembership>> {
    let memberships: Vec<PoolMembership> = load_json(path)?;
    debug!(?path, count = memberships.len(), "Loaded pool memberships");
    Ok(memberships)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> LabResult<T> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| LabError::Json {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_records() {
        let file = write_temp(
            r#"[
                {"pool_id": 1, "species_id": 2, "grain_count": 40, "analyst_id": 7,
                 "analysis_date": "2024-03-01", "common_name": "Ulmo",
                 "scientific_name": "Eucryphia cordifolia", "family": "Cunoniaceae"},
                {"pool_id": 1, "species_id": 3, "grain_count": 60, "special_tag": "clumped",
                 "analyst_id": 7, "analysis_date": "2024-03-01", "common_name": "Clover",
                 "scientific_name": "Trifolium repens"}
            ]"#,
        );

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].special_tag.as_deref(), Some("clumped"));
        assert_eq!(records[1].family, None);
    }

    #[test]
    fn test_load_counts() {
        let file = write_temp(
            r#"[{"species_id": 1, "common_name": "Quillay",
                 "scientific_name": "Quillaja saponaria", "grain_count": 150}]"#,
        );

        let counts = load_counts(file.path()).unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].grain_count, 150);
    }

    #[test]
    fn test_malformed_json_names_the_file() {
        let file = write_temp("[{\"species_id\": }]");

        let err = load_counts(file.path()).unwrap_err();
        assert!(matches!(err, LabError::Json { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LabError::Io(_)));
    }

    #[test]
    fn test_pools_for_beekeeper() {
        let memberships = vec![
            PoolMembership { pool_id: 1, drum_id: 10, beekeeper_id: 5 },
            PoolMembership { pool_id: 1, drum_id: 11, beekeeper_id: 5 },
            PoolMembership { pool_id: 2, drum_id: 12, beekeeper_id: 6 },
            PoolMembership { pool_id: 3, drum_id: 13, beekeeper_id: 5 },
        ];

        let pools = pools_for_beekeeper(&memberships, 5);
        assert_eq!(pools.into_iter().collect::<Vec<_>>(), vec![1, 3]);
        assert!(pools_for_beekeeper(&memberships, 99).is_empty());
    }
}
