//! # Counting Session
//!
//! In-memory state of one analysis in progress: one pool, one analyst,
//! one entry per selected species.
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Counting Session Transitions                         │
//! │                                                                         │
//! │  Analyst Action           Transition              State Change          │
//! │  ──────────────           ──────────              ────────────          │
//! │                                                                         │
//! │  Select species ─────────► add_species() ───────► entry (0 grains)     │
//! │                                                                         │
//! │  Click ➕ ───────────────► increment() ─────────► grain_count += 1     │
//! │                                                                         │
//! │  Click ➖ ───────────────► decrement() ─────────► max(0, count - 1)    │
//! │                                                                         │
//! │  Type a tag ─────────────► set_tag() ───────────► tag (blank = none)   │
//! │                                                                         │
//! │  Save ───────────────────► finalize() ──────────► rows out, clear()    │
//! │                                                                         │
//! │  NOTE: No transition can make grain_count negative. Upper bounds are   │
//! │        a validation warning, never a cap.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! A session is a plain value. Several analysts counting at the same time
//! each get their own instance keyed by pool id; nothing is shared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::composition::{compute_percentages, CompositionResult};
use crate::error::{CoreError, CoreResult};
use crate::types::{AnalysisRow, PoolId, Species, SpeciesCount, SpeciesId};
use crate::validation::{validate, ValidationConfig, ValidationOutcome};

/// Counting state for one pool.
///
/// ## Invariants
/// - Entries are unique by `species_id` and keep selection order
/// - Every `grain_count` is >= 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountingSession {
    id: Uuid,
    pool_id: PoolId,
    entries: Vec<SpeciesCount>,
    started_at: DateTime<Utc>,
}

impl CountingSession {
    /// Creates an empty session for a pool.
    pub fn new(pool_id: PoolId) -> Self {
        CountingSession {
            id: Uuid::new_v4(),
            pool_id,
            entries: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// When the session was created or last cleared.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Adds a species with zero grains.
    ///
    /// Re-adding a species already in the session leaves its count alone.
    /// Returns `true` when a new entry was created.
    pub fn add_species(&mut self, species: &Species) -> bool {
        if self.position(species.species_id).is_some() {
            return false;
        }

        self.entries.push(SpeciesCount::from_species(species));
        debug!(
            pool_id = self.pool_id,
            species_id = species.species_id,
            "Species added to counting session"
        );
        true
    }

    /// Removes a species and its count from the session.
    pub fn remove_species(&mut self, species_id: SpeciesId) -> CoreResult<SpeciesCount> {
        let index = self
            .position(species_id)
            .ok_or(CoreError::SpeciesNotInSession(species_id))?;
        Ok(self.entries.remove(index))
    }

    /// Counts one more grain. Returns the new count.
    pub fn increment(&mut self, species_id: SpeciesId) -> CoreResult<i64> {
        let entry = self.entry_mut(species_id)?;
        entry.grain_count += 1;
        Ok(entry.grain_count)
    }

    /// Takes one grain back, stopping at zero. Returns the new count.
    pub fn decrement(&mut self, species_id: SpeciesId) -> CoreResult<i64> {
        let entry = self.entry_mut(species_id)?;
        entry.grain_count = (entry.grain_count - 1).max(0);
        Ok(entry.grain_count)
    }

    /// Sets a count directly (typed entry instead of clicks).
    ///
    /// A negative value is rejected and the count is left unchanged.
    pub fn set_count(&mut self, species_id: SpeciesId, count: i64) -> CoreResult<()> {
        if count < 0 {
            return Err(CoreError::NegativeGrainCount { species_id, count });
        }
        self.entry_mut(species_id)?.grain_count = count;
        Ok(())
    }

    /// Overwrites the special tag. Blank text means "no tag".
    pub fn set_tag(&mut self, species_id: SpeciesId, text: &str) -> CoreResult<()> {
        let trimmed = text.trim();
        self.entry_mut(species_id)?.special_tag = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        Ok(())
    }

    /// Drops every entry and restarts the session clock.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.started_at = Utc::now();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All entries in selection order.
    pub fn counts(&self) -> &[SpeciesCount] {
        &self.entries
    }

    pub fn get(&self, species_id: SpeciesId) -> Option<&SpeciesCount> {
        self.entries.iter().find(|e| e.species_id == species_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn species_count(&self) -> usize {
        self.entries.len()
    }

    pub fn total_grains(&self) -> i64 {
        self.entries.iter().map(|e| e.grain_count).sum()
    }

    /// Entries with at least one grain.
    pub fn counted_species(&self) -> Vec<SpeciesCount> {
        self.entries
            .iter()
            .filter(|e| e.grain_count > 0)
            .cloned()
            .collect()
    }

    /// Live composition of the counted species.
    pub fn composition(&self) -> Vec<CompositionResult> {
        compute_percentages(&self.counted_species())
    }

    /// Runs the validation engine over every selected species.
    pub fn validate(&self, config: &ValidationConfig) -> ValidationOutcome {
        validate(&self.entries, config)
    }

    /// Rows for bulk insertion: entries with grain_count > 0.
    pub fn persistable_rows(&self) -> Vec<AnalysisRow> {
        self.entries
            .iter()
            .filter(|e| e.grain_count > 0)
            .map(|e| AnalysisRow {
                pool_id: self.pool_id,
                species_id: e.species_id,
                grain_count: e.grain_count,
                special_tag: e.special_tag.clone(),
            })
            .collect()
    }

    /// Validates, emits the rows to store, and clears the session.
    ///
    /// On any failure the session is left untouched so the analyst can
    /// keep counting.
    pub fn finalize(&mut self, config: &ValidationConfig) -> CoreResult<Vec<AnalysisRow>> {
        let outcome = self.validate(config);
        if !outcome.is_valid {
            return Err(CoreError::ValidationFailed {
                errors: outcome.errors,
            });
        }

        let rows = self.persistable_rows();
        if rows.is_empty() {
            return Err(CoreError::NothingCounted);
        }

        info!(
            pool_id = self.pool_id,
            session_id = %self.id,
            rows = rows.len(),
            total_grains = outcome.total_grains,
            warnings = outcome.warnings.len(),
            "Counting session finalized"
        );
        self.clear();
        Ok(rows)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn position(&self, species_id: SpeciesId) -> Option<usize> {
        self.entries.iter().position(|e| e.species_id == species_id)
    }

    fn entry_mut(&mut self, species_id: SpeciesId) -> CoreResult<&mut SpeciesCount> {
        self.entries
            .iter_mut()
            .find(|e| e.species_id == species_id)
            .ok_or(CoreError::SpeciesNotInSession(species_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MinGrainsStrictness;

    fn eucalyptus() -> Species {
        Species::new(1, "Eucalyptus", "Eucalyptus globulus")
    }

    fn clover() -> Species {
        Species::new(2, "Clover", "Trifolium repens")
    }

    fn session_with(counts: &[(Species, i64)]) -> CountingSession {
        let mut session = CountingSession::new(10);
        for (species, n) in counts {
            session.add_species(species);
            session.set_count(species.species_id, *n).unwrap();
        }
        session
    }

    #[test]
    fn test_add_species_is_idempotent() {
        let mut session = CountingSession::new(10);

        assert!(session.add_species(&eucalyptus()));
        session.increment(1).unwrap();
        session.increment(1).unwrap();

        assert!(!session.add_species(&eucalyptus()));
        assert_eq!(session.species_count(), 1);
        assert_eq!(session.get(1).unwrap().grain_count, 2);
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut session = session_with(&[(eucalyptus(), 0)]);

        assert_eq!(session.increment(1).unwrap(), 1);
        assert_eq!(session.increment(1).unwrap(), 2);
        assert_eq!(session.decrement(1).unwrap(), 1);
    }

    #[test]
    fn test_decrement_stops_at_zero() {
        let mut session = session_with(&[(eucalyptus(), 0)]);

        assert_eq!(session.decrement(1).unwrap(), 0);
        assert_eq!(session.decrement(1).unwrap(), 0);
        assert_eq!(session.get(1).unwrap().grain_count, 0);
    }

    #[test]
    fn test_unknown_species_is_rejected() {
        let mut session = CountingSession::new(10);

        assert!(matches!(
            session.increment(99),
            Err(CoreError::SpeciesNotInSession(99))
        ));
        assert!(session.set_tag(99, "x").is_err());
        assert!(session.remove_species(99).is_err());
    }

    #[test]
    fn test_remove_species_drops_entry() {
        let ulmo = Species::new(3, "Ulmo", "Eucryphia cordifolia");
        let mut session = session_with(&[(eucalyptus(), 40), (clover(), 25), (ulmo, 15)]);

        let removed = session.remove_species(2).unwrap();
        assert_eq!(removed.species_id, 2);
        assert_eq!(removed.grain_count, 25);

        assert_eq!(session.species_count(), 2);
        assert_eq!(session.total_grains(), 55);
        let order: Vec<SpeciesId> = session.counts().iter().map(|e| e.species_id).collect();
        assert_eq!(order, vec![1, 3]);

        assert!(matches!(
            session.increment(2),
            Err(CoreError::SpeciesNotInSession(2))
        ));
    }

    #[test]
    fn test_set_count_rejects_negative() {
        let mut session = session_with(&[(eucalyptus(), 5)]);

        assert!(matches!(
            session.set_count(1, -4),
            Err(CoreError::NegativeGrainCount { .. })
        ));
        assert_eq!(session.get(1).unwrap().grain_count, 5);
    }

    #[test]
    fn test_blank_tag_means_no_tag() {
        let mut session = session_with(&[(eucalyptus(), 0)]);

        session.set_tag(1, "  clumped ").unwrap();
        assert_eq!(session.get(1).unwrap().special_tag.as_deref(), Some("clumped"));

        session.set_tag(1, "   ").unwrap();
        assert_eq!(session.get(1).unwrap().special_tag, None);
        assert_eq!(session.get(1).unwrap().tag_label(), "no tag");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = session_with(&[(eucalyptus(), 30), (clover(), 20)]);

        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.total_grains(), 0);

        // A new selection starts from zero, not from stale counts
        session.add_species(&eucalyptus());
        assert_eq!(session.get(1).unwrap().grain_count, 0);
    }

    #[test]
    fn test_composition_skips_uncounted() {
        let session = session_with(&[(eucalyptus(), 120), (clover(), 0)]);

        let composition = session.composition();
        assert_eq!(composition.len(), 1);
        assert_eq!(composition[0].percentage, 100.0);
    }

    #[test]
    fn test_persistable_rows_only_counted() {
        let mut session = session_with(&[(eucalyptus(), 120), (clover(), 0)]);
        session.set_tag(1, "dominant").unwrap();

        let rows = session.persistable_rows();
        assert_eq!(
            rows,
            vec![AnalysisRow {
                pool_id: 10,
                species_id: 1,
                grain_count: 120,
                special_tag: Some("dominant".to_string()),
            }]
        );
    }

    #[test]
    fn test_finalize_emits_rows_and_clears() {
        let mut session = session_with(&[(eucalyptus(), 120), (clover(), 80)]);

        let rows = session.finalize(&ValidationConfig::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(session.is_empty());
    }

    #[test]
    fn test_finalize_failure_keeps_counts() {
        let mut session = session_with(&[(eucalyptus(), 30), (clover(), 20)]);

        let err = session.finalize(&ValidationConfig::default()).unwrap_err();
        match err {
            CoreError::ValidationFailed { errors } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("50"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(session.total_grains(), 50);
    }

    #[test]
    fn test_finalize_needs_a_grain() {
        let config = ValidationConfig {
            min_grains_strictness: MinGrainsStrictness::Warning,
            ..ValidationConfig::default()
        };
        let mut session = session_with(&[(eucalyptus(), 0)]);

        assert!(matches!(
            session.finalize(&config),
            Err(CoreError::NothingCounted)
        ));
        assert_eq!(session.species_count(), 1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = CountingSession::new(1);
        let mut second = CountingSession::new(2);
        first.add_species(&eucalyptus());
        second.add_species(&eucalyptus());

        first.increment(1).unwrap();

        assert_eq!(first.total_grains(), 1);
        assert_eq!(second.total_grains(), 0);
        assert_ne!(first.id(), second.id());
    }
}
