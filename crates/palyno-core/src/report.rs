//! # Reporting Module
//!
//! Filters stored analysis records and rolls them up for reports.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Report Pipeline                                    │
//! │                                                                         │
//! │  storage layer ──► [AnalysisRecord] (joined with pool + species)       │
//! │                          │                                              │
//! │                          ▼                                              │
//! │                   filter_records ◄── ReportFilter                      │
//! │                          │           date range (inclusive)            │
//! │                          │           analyst id                        │
//! │                          │           pool id                           │
//! │                          │           beekeeper pools (precomputed)     │
//! │                          ▼                                              │
//! │       ┌──────────┬───────┴──────┬──────────────┬────────────────┐      │
//! │       ▼          ▼              ▼              ▼                ▼      │
//! │   summarize  top_species  per_pool_breakdown grains_by_date species_   │
//! │                               │                               frequency│
//! │                               ▼                                         │
//! │                    compute_percentages → compute_statistics            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Beekeeper Filter
//! Records do not know which beekeeper owns the drums in their pool. The
//! pool → drum → beekeeper join happens outside the core; callers pass the
//! resulting set of pool ids in [`ReportFilter::with_beekeeper_pools`].
//!
//! Every function here borrows its input and returns new values, so a
//! snapshot of records can be shared by concurrent readers.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::composition::{analyse, PoolStatistics};
use crate::error::{CoreError, CoreResult};
use crate::format::species_label;
use crate::types::{AnalysisRecord, AnalystId, PoolId, SpeciesCount};

// =============================================================================
// Filters
// =============================================================================

/// Inclusive range of analysis dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting reversed bounds.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// From `days` days before `today` through `today`, both inclusive,
    /// so the range covers `days + 1` dates.
    pub fn last_days(today: NaiveDate, days: u32) -> CoreResult<Self> {
        let start = today
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or(CoreError::DateWindowOutOfRange { end: today, days })?;
        Ok(DateRange { start, end: today })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Optional constraints on the four report dimensions, combined with AND.
///
/// `None` on a dimension means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportFilter {
    pub date_range: Option<DateRange>,
    pub analyst_id: Option<AnalystId>,
    pub pool_id: Option<PoolId>,
    /// Pools holding at least one drum of the selected beekeeper.
    pub beekeeper_pools: Option<BTreeSet<PoolId>>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_analyst(mut self, analyst_id: AnalystId) -> Self {
        self.analyst_id = Some(analyst_id);
        self
    }

    pub fn with_pool(mut self, pool_id: PoolId) -> Self {
        self.pool_id = Some(pool_id);
        self
    }

    /// Restricts to the given pools (result of the beekeeper join).
    ///
    /// An empty set matches nothing: the beekeeper has no pooled drums.
    pub fn with_beekeeper_pools(mut self, pools: impl IntoIterator<Item = PoolId>) -> Self {
        self.beekeeper_pools = Some(pools.into_iter().collect());
        self
    }

    /// True when no dimension is constrained.
    pub fn is_unconstrained(&self) -> bool {
        self.date_range.is_none()
            && self.analyst_id.is_none()
            && self.pool_id.is_none()
            && self.beekeeper_pools.is_none()
    }

    pub fn matches(&self, record: &AnalysisRecord) -> bool {
        if let Some(range) = &self.date_range {
            if !range.contains(record.analysis_date) {
                return false;
            }
        }
        if let Some(analyst_id) = self.analyst_id {
            if record.analyst_id != analyst_id {
                return false;
            }
        }
        if let Some(pool_id) = self.pool_id {
            if record.pool_id != pool_id {
                return false;
            }
        }
        if let Some(pools) = &self.beekeeper_pools {
            if !pools.contains(&record.pool_id) {
                return false;
            }
        }
        true
    }
}

/// Returns the records matching `filter`, in input order.
pub fn filter_records(records: &[AnalysisRecord], filter: &ReportFilter) -> Vec<AnalysisRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}

// =============================================================================
// Rollups
// =============================================================================

/// Headline numbers of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportSummary {
    /// Distinct pools.
    pub total_pools: usize,
    /// Distinct species ids.
    pub total_species: usize,
    pub total_grains: i64,
    pub average_grains_per_pool: f64,
}

pub fn summarize(records: &[AnalysisRecord]) -> ReportSummary {
    let pools: BTreeSet<_> = records.iter().map(|r| r.pool_id).collect();
    let species: BTreeSet<_> = records.iter().map(|r| r.species_id).collect();
    let total_grains: i64 = records.iter().map(|r| r.grain_count).sum();

    let average_grains_per_pool = if pools.is_empty() {
        0.0
    } else {
        total_grains as f64 / pools.len() as f64
    };

    ReportSummary {
        total_pools: pools.len(),
        total_species: species.len(),
        total_grains,
        average_grains_per_pool,
    }
}

/// Grains summed over one species identity (common + scientific name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SpeciesTotal {
    pub common_name: String,
    pub scientific_name: String,
    /// `"Common (Scientific)"`, ready for a chart axis.
    pub label: String,
    pub total_grains: i64,
}

/// Groups records by species identity, keeping first-encounter order.
fn group_by_species<'a>(
    records: &'a [AnalysisRecord],
) -> Vec<((&'a str, &'a str), Vec<&'a AnalysisRecord>)> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<((&str, &str), Vec<&AnalysisRecord>)> = Vec::new();

    for record in records {
        let key = (record.common_name.as_str(), record.scientific_name.as_str());
        match index.get(&key) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(key, groups.len());
                groups.push((key, vec![record]));
            }
        }
    }

    groups
}

/// The `n` species with the most grains, ties in first-encounter order.
pub fn top_species(records: &[AnalysisRecord], n: usize) -> Vec<SpeciesTotal> {
    if n == 0 {
        return Vec::new();
    }

    let mut totals: Vec<SpeciesTotal> = group_by_species(records)
        .into_iter()
        .map(|((common, scientific), group)| SpeciesTotal {
            common_name: common.to_string(),
            scientific_name: scientific.to_string(),
            label: species_label(common, scientific),
            total_grains: group.iter().map(|r| r.grain_count).sum(),
        })
        .collect();

    // sort_by is stable, so equal totals keep first-encounter order
    totals.sort_by(|a, b| b.total_grains.cmp(&a.total_grains));
    totals.truncate(n);
    totals
}

/// Composition statistics for every pool present in `records`.
pub fn per_pool_breakdown(records: &[AnalysisRecord]) -> BTreeMap<PoolId, PoolStatistics> {
    let mut by_pool: BTreeMap<PoolId, Vec<SpeciesCount>> = BTreeMap::new();
    for record in records {
        by_pool
            .entry(record.pool_id)
            .or_default()
            .push(SpeciesCount::from(record));
    }

    by_pool
        .into_iter()
        .map(|(pool_id, counts)| (pool_id, analyse(&counts).1))
        .collect()
}

/// Grains per analysis date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateTotal {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_grains: i64,
}

/// Σ grains per analysis date, oldest first.
pub fn grains_by_date(records: &[AnalysisRecord]) -> Vec<DateTotal> {
    let mut totals: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.analysis_date).or_insert(0) += record.grain_count;
    }

    totals
        .into_iter()
        .map(|(date, total_grains)| DateTotal { date, total_grains })
        .collect()
}

/// How often a species shows up across analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SpeciesFrequency {
    pub common_name: String,
    pub scientific_name: String,
    pub family: Option<String>,
    /// Number of analysis records naming the species.
    pub analyses: usize,
    pub total_grains: i64,
}

/// Species ordered by number of analyses, then by grains.
pub fn species_frequency(records: &[AnalysisRecord]) -> Vec<SpeciesFrequency> {
    let mut frequencies: Vec<SpeciesFrequency> = group_by_species(records)
        .into_iter()
        .map(|((common, scientific), group)| SpeciesFrequency {
            common_name: common.to_string(),
            scientific_name: scientific.to_string(),
            family: group.iter().find_map(|r| r.family.clone()),
            analyses: group.len(),
            total_grains: group.iter().map(|r| r.grain_count).sum(),
        })
        .collect();

    frequencies.sort_by(|a, b| {
        b.analyses
            .cmp(&a.analyses)
            .then(b.total_grains.cmp(&a.total_grains))
    });
    frequencies
}

// =============================================================================
// Full Report
// =============================================================================

/// Statistics of one pool plus the pool metadata the records carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PoolBreakdown {
    pub pool_id: PoolId,
    pub analyst_id: AnalystId,
    #[ts(as = "String")]
    pub analysis_date: NaiveDate,
    pub statistics: PoolStatistics,
}

/// Everything a report screen shows, computed from one filtered snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PalynologyReport {
    pub filter: ReportFilter,
    pub summary: ReportSummary,
    pub top_species: Vec<SpeciesTotal>,
    pub pools: Vec<PoolBreakdown>,
    pub grains_by_date: Vec<DateTotal>,
    pub species_frequency: Vec<SpeciesFrequency>,
}

impl PalynologyReport {
    /// True when the filter matched no records.
    pub fn is_empty(&self) -> bool {
        self.summary.total_pools == 0
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Filters `records` and computes every rollup over the result.
pub fn build_report(
    records: &[AnalysisRecord],
    filter: &ReportFilter,
    top_n: usize,
) -> PalynologyReport {
    let filtered = filter_records(records, filter);
    debug!(
        input = records.len(),
        matched = filtered.len(),
        "Report records filtered"
    );

    let pools = per_pool_breakdown(&filtered)
        .into_iter()
        .filter_map(|(pool_id, statistics)| {
            filtered
                .iter()
                .find(|r| r.pool_id == pool_id)
                .map(|first| PoolBreakdown {
                    pool_id,
                    analyst_id: first.analyst_id,
                    analysis_date: first.analysis_date,
                    statistics,
                })
        })
        .collect();

    PalynologyReport {
        filter: filter.clone(),
        summary: summarize(&filtered),
        top_species: top_species(&filtered, top_n),
        pools,
        grains_by_date: grains_by_date(&filtered),
        species_frequency: species_frequency(&filtered),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn record(pool_id: i64, species_id: i64, grains: i64, analyst_id: i64, day: u32) -> AnalysisRecord {
        let (common, scientific) = match species_id {
            1 => ("Eucalyptus", "Eucalyptus globulus"),
            2 => ("Clover", "Trifolium repens"),
            3 => ("Ulmo", "Eucryphia cordifolia"),
            _ => ("Quillay", "Quillaja saponaria"),
        };
        AnalysisRecord {
            pool_id,
            species_id,
            grain_count: grains,
            special_tag: None,
            analyst_id,
            analysis_date: date(day),
            common_name: common.to_string(),
            scientific_name: scientific.to_string(),
            family: None,
        }
    }

    fn sample() -> Vec<AnalysisRecord> {
        vec![
            record(1, 1, 120, 7, 1),
            record(1, 2, 80, 7, 1),
            record(2, 2, 150, 8, 5),
            record(2, 3, 50, 8, 5),
            record(3, 1, 60, 7, 10),
            record(3, 4, 40, 7, 10),
        ]
    }

    #[test]
    fn test_no_filter_returns_input() {
        let records = sample();
        let filter = ReportFilter::new();

        assert!(filter.is_unconstrained());
        assert_eq!(filter_records(&records, &filter), records);
    }

    #[test]
    fn test_date_range_is_inclusive_and_idempotent() {
        let records = sample();
        let filter = ReportFilter::new().with_date_range(DateRange::new(date(1), date(5)).unwrap());

        let once = filter_records(&records, &filter);
        assert_eq!(once.len(), 4);

        let twice = filter_records(&once, &filter);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        assert!(matches!(
            DateRange::new(date(9), date(2)),
            Err(CoreError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_last_days_window() {
        let range = DateRange::last_days(date(31), 30).unwrap();
        assert_eq!(range.start, date(1));
        assert!(range.contains(date(31)));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }

    #[test]
    fn test_last_days_past_earliest_date_is_error() {
        assert!(matches!(
            DateRange::last_days(date(31), u32::MAX),
            Err(CoreError::DateWindowOutOfRange { days: u32::MAX, .. })
        ));
    }

    #[test]
    fn test_filters_compose_with_and() {
        let records = sample();
        let filter = ReportFilter::new().with_analyst(7).with_pool(3);

        let matched = filter_records(&records, &filter);
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|r| r.pool_id == 3 && r.analyst_id == 7));
    }

    #[test]
    fn test_beekeeper_pools_filter() {
        let records = sample();

        let matched = filter_records(&records, &ReportFilter::new().with_beekeeper_pools([2, 3]));
        assert_eq!(matched.len(), 4);

        let none = filter_records(&records, &ReportFilter::new().with_beekeeper_pools(Vec::<PoolId>::new()));
        assert!(none.is_empty());
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&sample());

        assert_eq!(summary.total_pools, 3);
        assert_eq!(summary.total_species, 4);
        assert_eq!(summary.total_grains, 500);
        assert!((summary.average_grains_per_pool - 500.0 / 3.0).abs() < 1e-9);

        assert_eq!(summarize(&[]), ReportSummary::default());
    }

    #[test]
    fn test_top_species() {
        let top = top_species(&sample(), 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].common_name, "Clover");
        assert_eq!(top[0].total_grains, 230);
        assert_eq!(top[1].label, "Eucalyptus (Eucalyptus globulus)");
        assert_eq!(top[1].total_grains, 180);
    }

    #[test]
    fn test_top_species_zero_is_empty() {
        assert!(top_species(&sample(), 0).is_empty());
    }

    #[test]
    fn test_top_species_ties_keep_first_encounter() {
        let records = vec![record(1, 3, 10, 7, 1), record(1, 1, 10, 7, 1), record(1, 2, 10, 7, 1)];
        let names: Vec<_> = top_species(&records, 3)
            .into_iter()
            .map(|t| t.common_name)
            .collect();
        assert_eq!(names, vec!["Ulmo", "Eucalyptus", "Clover"]);
    }

    #[test]
    fn test_per_pool_breakdown() {
        let breakdown = per_pool_breakdown(&sample());

        assert_eq!(breakdown.len(), 3);
        let pool_one = &breakdown[&1];
        assert_eq!(pool_one.total_grains, 200);
        assert_eq!(pool_one.dominant_species.as_ref().unwrap().species_id, 1);
        assert!((pool_one.shannon_diversity - 0.971).abs() < 1e-9);

        let pool_two = &breakdown[&2];
        assert_eq!(pool_two.dominant_species.as_ref().unwrap().percentage, 75.0);
    }

    #[test]
    fn test_grains_by_date() {
        let series = grains_by_date(&sample());
        let totals: Vec<_> = series.iter().map(|d| (d.date, d.total_grains)).collect();
        assert_eq!(totals, vec![(date(1), 200), (date(5), 200), (date(10), 100)]);
    }

    #[test]
    fn test_species_frequency_order() {
        let frequency = species_frequency(&sample());

        // Eucalyptus and Clover both appear twice; Clover has more grains
        assert_eq!(frequency[0].common_name, "Clover");
        assert_eq!(frequency[0].analyses, 2);
        assert_eq!(frequency[1].common_name, "Eucalyptus");
        assert_eq!(frequency[2].analyses, 1);
    }

    #[test]
    fn test_build_report() {
        let records = sample();
        let filter = ReportFilter::new().with_analyst(7);

        let report = build_report(&records, &filter, 10);
        assert_eq!(report.summary.total_pools, 2);
        assert_eq!(report.pools.len(), 2);
        assert_eq!(report.pools[1].analysis_date, date(10));
        assert_eq!(report.grains_by_date.len(), 2);
        assert!(!report.is_empty());

        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\"total_grains\": 300"));
    }

    #[test]
    fn test_build_report_without_matches() {
        let report = build_report(&sample(), &ReportFilter::new().with_pool(99), 10);

        assert!(report.is_empty());
        assert!(report.top_species.is_empty());
        assert!(report.pools.is_empty());
    }
}
