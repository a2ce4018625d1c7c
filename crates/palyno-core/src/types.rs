//! # Domain Types
//!
//! Core domain types used throughout Palyno.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Species      │   │  SpeciesCount   │   │  AnalysisRow    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  species_id     │──►│  species_id     │──►│  pool_id        │       │
//! │  │  common_name    │   │  names (copy)   │   │  species_id     │       │
//! │  │  scientific     │   │  grain_count    │   │  grain_count    │       │
//! │  │  family         │   │  special_tag    │   │  special_tag    │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │   UI selection          session-owned                 │ storage        │
//! │                                                        ▼                │
//! │                                              ┌─────────────────┐       │
//! │                                              │ AnalysisRecord  │       │
//! │                                              │  row + pool and │       │
//! │                                              │  species joins  │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `SpeciesCount` copies the names of the species at selection time, so
//! results computed from a session never reach back into master data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::format::tag_label;

// =============================================================================
// Identifiers
// =============================================================================

/// Species primary key in the external master data.
pub type SpeciesId = i64;

/// Pool primary key. A pool groups drums analysed together.
pub type PoolId = i64;

/// Analyst primary key.
pub type AnalystId = i64;

/// Beekeeper primary key.
pub type BeekeeperId = i64;

/// Sample drum primary key.
pub type DrumId = i64;

// =============================================================================
// Species
// =============================================================================

/// A plant species as selected in the UI for counting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Species {
    pub species_id: SpeciesId,
    pub common_name: String,
    pub scientific_name: String,
    /// Botanical family, when master data has one.
    #[serde(default)]
    pub family: Option<String>,
}

impl Species {
    /// Creates a species selection without a family.
    pub fn new(
        species_id: SpeciesId,
        common_name: impl Into<String>,
        scientific_name: impl Into<String>,
    ) -> Self {
        Species {
            species_id,
            common_name: common_name.into(),
            scientific_name: scientific_name.into(),
            family: None,
        }
    }
}

// =============================================================================
// Species Count
// =============================================================================

/// Grain count for one species inside a counting session.
///
/// ## Invariants
/// - Inside a session `grain_count` is never negative.
/// - `special_tag` is `None` for "no tag"; blank text never gets stored.
///
/// Counts arriving from outside a session (e.g. a JSON file) are not
/// checked here; the validation engine reports negative entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SpeciesCount {
    pub species_id: SpeciesId,
    pub common_name: String,
    pub scientific_name: String,
    pub grain_count: i64,
    #[serde(default)]
    pub special_tag: Option<String>,
}

impl SpeciesCount {
    /// Creates an entry with zero grains and no tag.
    pub fn from_species(species: &Species) -> Self {
        SpeciesCount {
            species_id: species.species_id,
            common_name: species.common_name.clone(),
            scientific_name: species.scientific_name.clone(),
            grain_count: 0,
            special_tag: None,
        }
    }

    /// Creates an entry with a given count. Mostly useful for tests and
    /// for counts loaded from outside a session.
    pub fn with_count(
        species_id: SpeciesId,
        common_name: impl Into<String>,
        scientific_name: impl Into<String>,
        grain_count: i64,
    ) -> Self {
        SpeciesCount {
            species_id,
            common_name: common_name.into(),
            scientific_name: scientific_name.into(),
            grain_count,
            special_tag: None,
        }
    }

    /// Returns the tag as shown to the analyst.
    pub fn tag_label(&self) -> &str {
        tag_label(self.special_tag.as_deref())
    }
}

// =============================================================================
// Analysis Row
// =============================================================================

/// One row handed to the storage layer for bulk insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnalysisRow {
    pub pool_id: PoolId,
    pub species_id: SpeciesId,
    pub grain_count: i64,
    pub special_tag: Option<String>,
}

// =============================================================================
// Analysis Record
// =============================================================================

/// A persisted analysis row already joined with its pool and species.
///
/// Read-only input to the reporting engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AnalysisRecord {
    pub pool_id: PoolId,
    pub species_id: SpeciesId,
    pub grain_count: i64,
    #[serde(default)]
    pub special_tag: Option<String>,

    /// Analyst who counted the pool (pool metadata).
    pub analyst_id: AnalystId,

    /// Date the pool was analysed (pool metadata).
    #[ts(as = "String")]
    pub analysis_date: NaiveDate,

    pub common_name: String,
    pub scientific_name: String,
    #[serde(default)]
    pub family: Option<String>,
}

impl From<&AnalysisRecord> for SpeciesCount {
    fn from(record: &AnalysisRecord) -> Self {
        SpeciesCount {
            species_id: record.species_id,
            common_name: record.common_name.clone(),
            scientific_name: record.scientific_name.clone(),
            grain_count: record.grain_count,
            special_tag: record.special_tag.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
