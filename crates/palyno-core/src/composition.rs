//! # Composition Module
//!
//! Turns grain counts into percentage composition and pool statistics.
//!
//! ## Why Rounded Percentages Drift
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE ROUNDING PROBLEM                                                   │
//! │                                                                         │
//! │  counts:  1 / 1 / 1           total = 3                                │
//! │  exact:   33.333… × 3         = 100.000                                │
//! │  rounded: 33.33 × 3           =  99.99   ← drift of 0.01               │
//! │                                                                         │
//! │  Each entry is rounded to 2 decimals on its own, so the sum can        │
//! │  wander from 100. The validation engine warns when the drift exceeds   │
//! │  PERCENTAGE_SUM_TOLERANCE; nothing here renormalizes.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use palyno_core::composition::{compute_percentages, compute_statistics};
//! use palyno_core::types::SpeciesCount;
//!
//! let counts = vec![
//!     SpeciesCount::with_count(1, "Eucalyptus", "Eucalyptus globulus", 120),
//!     SpeciesCount::with_count(2, "Clover", "Trifolium repens", 80),
//! ];
//!
//! let results = compute_percentages(&counts);
//! assert_eq!(results[0].percentage, 60.0);
//!
//! let stats = compute_statistics(&results);
//! assert_eq!(stats.shannon_diversity, 0.971);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{SpeciesCount, SpeciesId};
use crate::IMPORTANT_SPECIES_THRESHOLD_PCT;

// =============================================================================
// Composition Result
// =============================================================================

/// Percentage share of one species within a set of counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompositionResult {
    pub species_id: SpeciesId,
    pub common_name: String,
    pub scientific_name: String,
    pub special_tag: Option<String>,
    pub grain_count: i64,
    /// Share of `total_grains`, in [0, 100], rounded to 2 decimals.
    pub percentage: f64,
    /// Sum over the whole input, repeated on every entry.
    pub total_grains: i64,
}

// =============================================================================
// Pool Statistics
// =============================================================================

/// Summary statistics of one analysis (usually one pool).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PoolStatistics {
    pub total_grains: i64,
    pub total_species: usize,
    /// Highest percentage; the first one wins a tie.
    pub dominant_species: Option<CompositionResult>,
    /// Entries strictly above 10%.
    pub species_above_threshold: Vec<CompositionResult>,
    /// Shannon entropy in bits, rounded to 3 decimals.
    pub shannon_diversity: f64,
    pub percentage_sum: f64,
    pub average_percentage: f64,
}

// =============================================================================
// Calculations
// =============================================================================

/// Rounds `value` to `decimals` decimal places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Sum of grain counts.
pub fn total_grains(counts: &[SpeciesCount]) -> i64 {
    counts.iter().map(|c| c.grain_count).sum()
}

/// Computes the percentage share of every entry.
///
/// Output preserves input order. With a zero total every percentage is 0
/// and `total_grains` is 0.
pub fn compute_percentages(counts: &[SpeciesCount]) -> Vec<CompositionResult> {
    let total = total_grains(counts);

    counts
        .iter()
        .map(|count| {
            let percentage = if total > 0 {
                round_to(count.grain_count as f64 / total as f64 * 100.0, 2)
            } else {
                0.0
            };

            CompositionResult {
                species_id: count.species_id,
                common_name: count.common_name.clone(),
                scientific_name: count.scientific_name.clone(),
                special_tag: count.special_tag.clone(),
                grain_count: count.grain_count,
                percentage,
                total_grains: total,
            }
        })
        .collect()
}

/// Shannon entropy `-Σ p·log2(p)` of raw counts, unrounded.
///
/// Zero counts are skipped. Returns 0 for an empty or all-zero input.
pub fn shannon_entropy(counts: impl IntoIterator<Item = i64> + Clone) -> f64 {
    let total: i64 = counts.clone().into_iter().sum();
    if total <= 0 {
        return 0.0;
    }

    let mut h = 0.0;
    for c in counts {
        if c > 0 {
            let p = c as f64 / total as f64;
            h -= p * p.log2();
        }
    }
    // A single species gives -1·log2(1) = -0.0
    h.max(0.0)
}

/// Computes summary statistics over composition results.
///
/// An empty input yields `PoolStatistics::default()`.
pub fn compute_statistics(results: &[CompositionResult]) -> PoolStatistics {
    if results.is_empty() {
        return PoolStatistics::default();
    }

    let total_grains: i64 = results.iter().map(|r| r.grain_count).sum();
    let total_species = results.len();

    // Stable argmax: only a strictly greater percentage replaces the leader
    let mut dominant = &results[0];
    for result in &results[1..] {
        if result.percentage > dominant.percentage {
            dominant = result;
        }
    }

    let species_above_threshold = results
        .iter()
        .filter(|r| r.percentage > IMPORTANT_SPECIES_THRESHOLD_PCT)
        .cloned()
        .collect();

    let shannon = shannon_entropy(results.iter().map(|r| r.grain_count));
    let percentage_sum: f64 = results.iter().map(|r| r.percentage).sum();

    PoolStatistics {
        total_grains,
        total_species,
        dominant_species: Some(dominant.clone()),
        species_above_threshold,
        shannon_diversity: round_to(shannon, 3),
        percentage_sum,
        average_percentage: round_to(percentage_sum / total_species as f64, 2),
    }
}

/// Convenience: percentages then statistics in one call.
pub fn analyse(counts: &[SpeciesCount]) -> (Vec<CompositionResult>, PoolStatistics) {
    let results = compute_percentages(counts);
    let stats = compute_statistics(&results);
    (results, stats)
}

// =============================================================================
// Unit Tests
// =============================================================================
