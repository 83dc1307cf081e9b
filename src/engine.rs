use crate::aggregator::MetricsAggregator;
use crate::error::Result;
use crate::filter::{filter_records, FilterState};
use crate::schema::{DashboardConfig, DashboardSummary, SalesRecord, TargetOverrides};
use crate::store::RecordStore;
use crate::targets::{resolve_targets, TargetStore};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// What renderers and exporters receive: the filtered records and their summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub filtered_records: Vec<SalesRecord>,
    pub summary: Option<DashboardSummary>,
}

// Inputs of the last computation, compared by value on the next call
#[derive(Debug, Clone, PartialEq)]
struct ComputationKey {
    records: Vec<SalesRecord>,
    filters: FilterState,
    overrides: TargetOverrides,
}

/// Runs filter → target resolution → aggregation and memoizes the last result.
///
/// The pipeline is a pure function of `(records, filters, overrides)`, so an
/// unchanged triple returns the cached view without recomputing.
pub struct DashboardEngine {
    config: DashboardConfig,
    cache: Option<(ComputationKey, DashboardView)>,
    recomputations: usize,
}

impl DashboardEngine {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: None,
            recomputations: 0,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// How many times the pipeline actually ran (cache misses).
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Filters `records` and aggregates them with the given overrides.
    pub fn summarize(
        &mut self,
        records: &[SalesRecord],
        filters: &FilterState,
        overrides: &TargetOverrides,
    ) -> &DashboardView {
        let hit = matches!(
            &self.cache,
            Some((key, _)) if key.records == records
                && &key.filters == filters
                && &key.overrides == overrides
        );

        if hit {
            debug!("Dashboard inputs unchanged; reusing cached summary");
        } else {
            self.recomputations += 1;
            self.cache = None;
        }

        let config = &self.config;
        let (_, view) = self.cache.get_or_insert_with(|| {
            let key = ComputationKey {
                records: records.to_vec(),
                filters: filters.clone(),
                overrides: overrides.clone(),
            };
            (key, compute_view(config, records, filters, overrides))
        });
        view
    }

    /// Fetches records and, when a month is selected, its explicit targets,
    /// then summarizes. Without a selected month only bottom-up targets apply.
    pub fn run<R, T>(
        &mut self,
        record_store: &R,
        target_store: &T,
        filters: &FilterState,
    ) -> Result<DashboardView>
    where
        R: RecordStore + ?Sized,
        T: TargetStore + ?Sized,
    {
        let records = record_store.fetch_all()?;

        let overrides = match &filters.selected_month {
            Some(month) => resolve_targets(target_store, month)?,
            None => TargetOverrides::new(),
        };

        Ok(self.summarize(&records, filters, &overrides).clone())
    }
}

fn compute_view(
    config: &DashboardConfig,
    records: &[SalesRecord],
    filters: &FilterState,
    overrides: &TargetOverrides,
) -> DashboardView {
    info!(
        "Computing dashboard over {} records ({} target overrides)",
        records.len(),
        overrides.len()
    );

    let filtered_records = filter_records(records, filters);
    let summary = MetricsAggregator::new(config).aggregate(&filtered_records, overrides);

    if summary.is_none() {
        debug!("No records left after filtering; summary is absent");
    }

    DashboardView {
        filtered_records,
        summary,
    }
}
