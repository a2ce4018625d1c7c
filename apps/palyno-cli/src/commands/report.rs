//! `palyno report`: filter exported records and print the report as JSON.

use anyhow::Context;
use chrono::NaiveDate;
use palyno_core::{build_report, DateRange, PalynologyReport, ReportFilter};
use palyno_lab::{load_memberships, load_records, pools_for_beekeeper, LabConfig, ReportSettings};
use tracing::{info, warn};

use crate::cli::ReportArgs;

pub fn handle(args: &ReportArgs, config: &LabConfig, today: NaiveDate) -> anyhow::Result<String> {
    let records = load_records(&args.records)
        .with_context(|| format!("failed to load records from {}", args.records.display()))?;

    let filter = build_filter(args, &config.report, today)?;
    let top_n = args.top.unwrap_or(config.report.top_n);

    let report = build_report(&records, &filter, top_n);
    log_report(&report);

    report.to_json_pretty().context("failed to render report")
}

/// Turns CLI arguments into a report filter.
///
/// With no dates the configured window ending today is used. A lone
/// `--from` runs to today and a lone `--to` reaches back one window.
pub fn build_filter(
    args: &ReportArgs,
    settings: &ReportSettings,
    today: NaiveDate,
) -> anyhow::Result<ReportFilter> {
    let range = match (args.from, args.to) {
        (None, None) => settings.default_range(today)?,
        (Some(from), None) => DateRange::new(from, today)?,
        (None, Some(to)) => DateRange::last_days(to, settings.default_window_days)?,
        (Some(from), Some(to)) => DateRange::new(from, to)?,
    };

    let mut filter = ReportFilter::new().with_date_range(range);

    if let Some(analyst_id) = args.analyst {
        filter = filter.with_analyst(analyst_id);
    }
    if let Some(pool_id) = args.pool {
        filter = filter.with_pool(pool_id);
    }
    if let Some(beekeeper_id) = args.beekeeper {
        let path = args
            .memberships
            .as_ref()
            .context("--beekeeper needs --memberships")?;
        let memberships = load_memberships(path)
            .with_context(|| format!("failed to load memberships from {}", path.display()))?;
        filter = filter.with_beekeeper_pools(pools_for_beekeeper(&memberships, beekeeper_id));
    }

    Ok(filter)
}

fn log_report(report: &PalynologyReport) {
    if report.is_empty() {
        warn!("No analyses match the report filter");
    } else {
        info!(
            pools = report.summary.total_pools,
            total_grains = report.summary.total_grains,
            "Report built"
        );
    }
}
