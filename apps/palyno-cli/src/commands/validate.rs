//! `palyno validate`: check counts against the lab rules before saving.

use anyhow::Context;
use palyno_core::composition::analyse;
use palyno_core::{validate, CompositionResult, PoolStatistics, ValidationConfig, ValidationOutcome};
use palyno_lab::load_counts;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::ValidateArgs;

/// Printed result of `palyno validate`.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub outcome: ValidationOutcome,
    pub composition: Vec<CompositionResult>,
    pub statistics: PoolStatistics,
}

pub fn handle(args: &ValidateArgs, config: &ValidationConfig) -> anyhow::Result<ValidationReport> {
    let counts = load_counts(&args.counts)
        .with_context(|| format!("failed to load counts from {}", args.counts.display()))?;

    let outcome = validate(&counts, config);
    let (composition, statistics) = analyse(&counts);

    if outcome.is_valid {
        info!(
            total_grains = outcome.total_grains,
            warnings = outcome.warnings.len(),
            "Counts are valid"
        );
    } else {
        warn!(errors = outcome.errors.len(), "Counts failed validation");
    }

    Ok(ValidationReport {
        outcome,
        composition,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn counts_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn valid_counts() {
        let file = counts_file(
            r#"[{"species_id": 1, "common_name": "Ulmo", "scientific_name": "Eucryphia cordifolia", "grain_count": 75},
                {"species_id": 2, "common_name": "Clover", "scientific_name": "Trifolium repens", "grain_count": 25}]"#,
        );

        let report = handle(
            &ValidateArgs { counts: file.path().to_path_buf() },
            &ValidationConfig::default(),
        )
        .unwrap();

        assert!(report.outcome.is_valid);
        assert_eq!(report.composition[0].percentage, 75.0);
        assert_eq!(report.statistics.total_grains, 100);
    }

    #[test]
    fn too_few_grains_is_invalid() {
        let file = counts_file(
            r#"[{"species_id": 1, "common_name": "Ulmo", "scientific_name": "Eucryphia cordifolia", "grain_count": 30}]"#,
        );

        let report = handle(
            &ValidateArgs { counts: file.path().to_path_buf() },
            &ValidationConfig::default(),
        )
        .unwrap();

        assert!(!report.outcome.is_valid);
        assert_eq!(report.outcome.errors.len(), 1);
    }
}
