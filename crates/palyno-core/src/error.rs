//! # Error Types
//!
//! Domain-specific error types for palyno-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  palyno-core errors (this file)                                        │
//! │  ├── CoreError        - Session and contract failures                  │
//! │  └── ValidationError  - Business rule findings (one per rule)          │
//! │                                                                         │
//! │  palyno-lab errors (separate crate)                                    │
//! │  └── LabError         - Config, file and registry failures             │
//! │                                                                         │
//! │  Flow: ValidationError → ValidationOutcome (data, never thrown)        │
//! │        CoreError → LabError → CLI (anyhow)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Findings vs. Failures
//! A `ValidationError` is rendered into the `errors` or `warnings` list of a
//! [`ValidationOutcome`](crate::validation::ValidationOutcome). Validation
//! itself never fails. `CoreError` is reserved for calls the core cannot
//! honor at all, such as counting a species that was never selected.

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::SpeciesId;

// =============================================================================
// Core Error
// =============================================================================

/// Failures raised by session transitions and report construction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A transition referenced a species that is not part of the session.
    ///
    /// ## When This Occurs
    /// - The UI sends an increment for a species it never added
    /// - The species was removed from the selection in the meantime
    #[error("Species {0} is not part of this counting session")]
    SpeciesNotInSession(SpeciesId),

    /// A direct count entry was negative.
    #[error("Grain count for species {species_id} cannot be negative (got {count})")]
    NegativeGrainCount { species_id: SpeciesId, count: i64 },

    /// Finalize was called but no species has a grain counted.
    #[error("At least one pollen grain must be counted before saving")]
    NothingCounted,

    /// Finalize was called on a session that does not pass validation.
    ///
    /// Carries the blocking messages so the caller can show them.
    #[error("Analysis failed validation: {}", .errors.join("; "))]
    ValidationFailed { errors: Vec<String> },

    /// Date range bounds are reversed.
    #[error("Date range start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// A report window reaches back past the earliest representable date.
    #[error("A window of {days} days before {end} is out of range")]
    DateWindowOutOfRange { end: NaiveDate, days: u32 },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Business rule findings.
///
/// Each variant maps to exactly one rule of the validation engine; its
/// `Display` text is what the analyst reads.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Fewer grains were counted than the configured minimum sample size.
    #[error("Total grain count must be at least {min} (counted: {total})")]
    InsufficientGrains { total: i64, min: i64 },

    /// No species were selected for the analysis.
    #[error("At least one species must be selected")]
    NoSpeciesSelected,

    /// An entry carries a negative count.
    #[error("Grain count for species {position} ({name}) cannot be negative")]
    NegativeCount { position: usize, name: String },

    /// An entry exceeds the per-species soft ceiling.
    #[error("Grain count for species {position} ({name}) is very high ({count})")]
    ExcessiveCount {
        position: usize,
        name: String,
        count: i64,
    },

    /// Rounded percentages drifted away from 100.
    #[error("Percentages do not sum to 100% (sum: {sum:.1}%)")]
    PercentageDrift { sum: f64 },

    /// More species were selected than recommended.
    #[error("{count} species selected, more than the recommended {max}")]
    TooManySpecies { count: usize, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
