//! # palyno-core: Pure Palynology Logic
//!
//! This crate turns raw pollen grain counts into percentage composition,
//! diversity metrics and filtered reports. It contains all business logic
//! as pure functions and in-memory state with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Palyno Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Presentation (external: forms, charts)              │   │
//! │  │   Select species ──► Count grains ──► Save ──► Reports          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              palyno-lab / palyno-cli (boundary)                 │   │
//! │  │      config, JSON loaders, session registry, commands           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ palyno-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────┐       │   │
//! │  │  │composition│ │validation │ │  session  │ │  report   │       │   │
//! │  │  │ percents  │ │ errors &  │ │ counting  │ │ filters & │       │   │
//! │  │  │ Shannon   │ │ warnings  │ │ state     │ │ rollups   │       │   │
//! │  │  └───────────┘ └───────────┘ └───────────┘ └───────────┘       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Storage (external) supplies AnalysisRecords and receives AnalysisRows │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Species, SpeciesCount, AnalysisRecord, ...)
//! - [`composition`] - Percentages, pool statistics, Shannon diversity
//! - [`validation`] - Business rules yielding errors and warnings
//! - [`session`] - Counting session state machine
//! - [`report`] - Record filtering and report rollups
//! - [`format`] - Display helpers
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Same input = same output, inputs are never mutated
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Findings Are Data**: Business rule violations come back in a
//!    `ValidationOutcome`, never as `Err`
//! 4. **Degenerate Input Is Defined**: empty lists and zero totals give
//!    zero percentages and zero diversity
//!
//! ## Example Usage
//!
//! ```rust
//! use palyno_core::session::CountingSession;
//! use palyno_core::types::Species;
//! use palyno_core::validation::ValidationConfig;
//!
//! let mut session = CountingSession::new(42);
//! session.add_species(&Species::new(1, "Eucalyptus", "Eucalyptus globulus"));
//! session.add_species(&Species::new(2, "Clover", "Trifolium repens"));
//! session.set_count(1, 120).unwrap();
//! session.set_count(2, 80).unwrap();
//!
//! let rows = session.finalize(&ValidationConfig::default()).unwrap();
//! assert_eq!(rows.len(), 2);
//! assert!(session.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod composition;
pub mod error;
pub mod format;
pub mod report;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use composition::{compute_percentages, compute_statistics, CompositionResult, PoolStatistics};
pub use error::{CoreError, CoreResult, ValidationError};
pub use report::{build_report, filter_records, DateRange, PalynologyReport, ReportFilter};
pub use session::CountingSession;
pub use types::*;
pub use validation::{validate, MinGrainsStrictness, ValidationConfig, ValidationOutcome};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Label shown for a species without a special tag.
pub const NO_TAG_LABEL: &str = "no tag";

/// Species above this percentage are listed as important in statistics.
pub const IMPORTANT_SPECIES_THRESHOLD_PCT: f64 = 10.0;

/// Allowed distance between the sum of rounded percentages and 100.
pub const PERCENTAGE_SUM_TOLERANCE: f64 = 0.1;

/// Recommended minimum sample size for an analysis.
pub const DEFAULT_MIN_TOTAL_GRAINS: i64 = 100;

/// Per-species count above which a warning is raised.
///
/// ## Business Reason
/// Catches typing slips such as 10000 instead of 100.
pub const DEFAULT_MAX_GRAINS_PER_SPECIES: i64 = 10_000;

/// Species per analysis above which a warning is raised.
pub const DEFAULT_MAX_SPECIES: usize = 50;
