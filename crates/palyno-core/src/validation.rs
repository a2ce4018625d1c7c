//! # Validation Module
//!
//! Business rules that gate saving a counted analysis.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Rules                                   │
//! │                                                                         │
//! │  Rule                                   Finding                         │
//! │  ───────────────────────────────────    ──────────────────────────────  │
//! │  total < min_total_grains               error (or warning, see below)  │
//! │  no species selected                    error                           │
//! │  entry grain_count < 0                  error                           │
//! │  entry grain_count > max_per_species    warning                         │
//! │  species count > max_species            warning                         │
//! │  |Σ percentage - 100| > 0.1             warning (only when total > 0)  │
//! │                                                                         │
//! │  Every rule runs; nothing short-circuits.                              │
//! │  is_valid ⇔ errors.is_empty()                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Minimum Sample Size Strictness
//! Some labs treat the minimum grain count as a hard requirement, others as
//! a recommendation. [`MinGrainsStrictness`] picks which list the finding
//! lands in; it defaults to a blocking error.
//!
//! ## Usage
//! ```rust
//! use palyno_core::types::SpeciesCount;
//! use palyno_core::validation::{validate, ValidationConfig};
//!
//! let counts = vec![SpeciesCount::with_count(1, "Clover", "Trifolium repens", 50)];
//! let outcome = validate(&counts, &ValidationConfig::default());
//!
//! assert!(!outcome.is_valid);
//! assert_eq!(outcome.errors.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::composition::{compute_percentages, total_grains};
use crate::error::ValidationError;
use crate::types::SpeciesCount;
use crate::{
    DEFAULT_MAX_GRAINS_PER_SPECIES, DEFAULT_MAX_SPECIES, DEFAULT_MIN_TOTAL_GRAINS,
    PERCENTAGE_SUM_TOLERANCE,
};

// =============================================================================
// Configuration
// =============================================================================

/// Whether an undersized sample blocks saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MinGrainsStrictness {
    /// Below-minimum totals are errors.
    #[default]
    Error,
    /// Below-minimum totals are advisory warnings.
    Warning,
}

impl std::fmt::Display for MinGrainsStrictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MinGrainsStrictness::Error => write!(f, "error"),
            MinGrainsStrictness::Warning => write!(f, "warning"),
        }
    }
}

impl std::str::FromStr for MinGrainsStrictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" | "strict" => Ok(MinGrainsStrictness::Error),
            "warning" | "warn" | "advisory" => Ok(MinGrainsStrictness::Warning),
            other => Err(format!("unknown strictness: {}", other)),
        }
    }
}

/// Thresholds supplied by the lab configuration.
///
/// The core treats them as opaque values; defaults mirror common lab
/// practice (100 grains minimum, 10 000 per species, 50 species).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_total_grains: i64,
    pub max_grains_per_species: i64,
    pub max_species: usize,
    pub min_grains_strictness: MinGrainsStrictness,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            min_total_grains: DEFAULT_MIN_TOTAL_GRAINS,
            max_grains_per_species: DEFAULT_MAX_GRAINS_PER_SPECIES,
            max_species: DEFAULT_MAX_SPECIES,
            min_grains_strictness: MinGrainsStrictness::Error,
        }
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of validating a set of counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub total_grains: i64,
}

impl ValidationOutcome {
    fn new(total_grains: i64) -> Self {
        ValidationOutcome {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            total_grains,
        }
    }

    fn error(&mut self, finding: ValidationError) {
        self.errors.push(finding.to_string());
        self.is_valid = false;
    }

    fn warning(&mut self, finding: ValidationError) {
        self.warnings.push(finding.to_string());
    }

    /// True when the outcome carries warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Applies every business rule to `counts`.
///
/// Total and deterministic: it never fails and never short-circuits.
pub fn validate(counts: &[SpeciesCount], config: &ValidationConfig) -> ValidationOutcome {
    let total = total_grains(counts);
    let mut outcome = ValidationOutcome::new(total);

    if total < config.min_total_grains {
        let finding = ValidationError::InsufficientGrains {
            total,
            min: config.min_total_grains,
        };
        match config.min_grains_strictness {
            MinGrainsStrictness::Error => outcome.error(finding),
            MinGrainsStrictness::Warning => outcome.warning(finding),
        }
    }

    if counts.is_empty() {
        outcome.error(ValidationError::NoSpeciesSelected);
    }

    if counts.len() > config.max_species {
        outcome.warning(ValidationError::TooManySpecies {
            count: counts.len(),
            max: config.max_species,
        });
    }

    for (i, count) in counts.iter().enumerate() {
        if count.grain_count < 0 {
            outcome.error(ValidationError::NegativeCount {
                position: i + 1,
                name: count.common_name.clone(),
            });
        } else if count.grain_count > config.max_grains_per_species {
            outcome.warning(ValidationError::ExcessiveCount {
                position: i + 1,
                name: count.common_name.clone(),
                count: count.grain_count,
            });
        }
    }

    if total > 0 {
        let sum: f64 = compute_percentages(counts)
            .iter()
            .map(|r| r.percentage)
            .sum();
        if (sum - 100.0).abs() > PERCENTAGE_SUM_TOLERANCE {
            outcome.warning(ValidationError::PercentageDrift { sum });
        }
    }

    outcome
}

// =============================================================================
// Unit Tests
// =============================================================================
