//! # Sales Performance Metrics
//!
//! A library for turning flat per-branch, per-channel sales records into a
//! hierarchical performance summary measured against monthly targets.
//!
//! ## Core Concepts
//!
//! - **Sales Records**: One observation of sales, orders and a target contribution for a branch and channel on a day
//! - **Filters**: Independent predicates (date range, month, branches, channels, weekdays) combined with AND
//! - **Catalog**: The fixed, ordered branch and channel enumerations every summary is laid out by
//! - **Target Overrides**: Explicit monthly branch targets that replace the bottom-up sum of record targets
//! - **Summary**: Channel metrics rolled up into branch metrics, rolled up into overall totals
//!
//! Every ratio is zero-guarded: achievement is 0 when the target is 0 and the
//! average order value is 0 when there are no orders. An empty record set
//! produces no summary at all.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sales_performance_metrics::*;
//!
//! let config = DashboardConfig::new(&["A"], &["X", "Y"]);
//! let records = vec![
//!     SalesRecord::new("2024-03-01", "A", "X", 100.0, 2, 50.0),
//!     SalesRecord::new("2024-03-02", "A", "Y", 50.0, 1, 0.0),
//! ];
//! let filters = FilterState::new().with_month("2024-03");
//! let overrides = TargetOverrides::from([("A".to_string(), 1000.0)]);
//!
//! let summary = build_summary(&config, &records, &filters, &overrides).unwrap();
//! assert_eq!(summary.branch("A").unwrap().achievement_percentage, 15.0);
//! ```

pub mod admin;
pub mod aggregator;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ingestion;
pub mod report;
pub mod schema;
pub mod store;
pub mod targets;
pub mod utils;

pub use admin::AdminSession;
pub use aggregator::{aggregate, MetricsAggregator};
pub use engine::{DashboardEngine, DashboardView};
pub use error::{DashboardError, Result};
pub use filter::{filter_records, DateRange, FilterState};
pub use ingestion::*;
pub use report::{summary_rows, summary_to_csv, RowLevel, SummaryRow};
pub use schema::*;
pub use store::{replace_records, InMemoryRecordStore, RecordStore};
pub use targets::{resolve_targets, InMemoryTargetStore, TargetStore};
pub use utils::*;

use log::{debug, info};

/// Filters `records` and aggregates the survivors in one pure call.
///
/// `overrides` should only carry targets for `filters.selected_month`; pass an
/// empty map when no month is selected.
pub fn build_summary(
    config: &DashboardConfig,
    records: &[SalesRecord],
    filters: &FilterState,
    overrides: &TargetOverrides,
) -> Option<DashboardSummary> {
    info!(
        "Building summary for {} records across {} branches and {} channels",
        records.len(),
        config.branches.len(),
        config.channels.len()
    );

    let filtered = filter_records(records, filters);
    debug!("{} records remain after filtering", filtered.len());

    aggregate(&filtered, overrides, config)
}
