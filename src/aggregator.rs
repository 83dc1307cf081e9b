use crate::schema::{
    BranchMetrics, ChannelMetrics, DashboardConfig, DashboardSummary, SalesRecord,
    TargetOverrides,
};
use crate::utils::{coerce_amount, percentage, ratio, saturating_count, saturating_sum};
use log::{debug, warn};

/// Rolls records up into channel, branch and overall metrics.
///
/// Branches and channels come from the configured enumerations, never from the
/// records, so combinations without data still appear with zeroed metrics and
/// records naming an unknown branch or channel are ignored.
pub struct MetricsAggregator<'a> {
    config: &'a DashboardConfig,
}

impl<'a> MetricsAggregator<'a> {
    pub fn new(config: &'a DashboardConfig) -> Self {
        Self { config }
    }

    /// Returns `None` for an empty record collection so callers can tell
    /// "no data" apart from "all zero".
    pub fn aggregate(
        &self,
        records: &[SalesRecord],
        overrides: &TargetOverrides,
    ) -> Option<DashboardSummary> {
        if records.is_empty() {
            return None;
        }

        let branch_metrics: Vec<BranchMetrics> = self
            .config
            .branches
            .iter()
            .map(|branch| self.branch_metrics(branch, records, overrides))
            .collect();

        let total_sales = saturating_sum(branch_metrics.iter().map(|b| b.total_sales));
        let total_orders = saturating_count(branch_metrics.iter().map(|b| b.total_orders));
        let total_target = saturating_sum(branch_metrics.iter().map(|b| b.total_target));

        debug!(
            "Aggregated {} records into {} branches: sales {}, orders {}, target {}",
            records.len(),
            branch_metrics.len(),
            total_sales,
            total_orders,
            total_target
        );

        Some(DashboardSummary {
            total_sales,
            total_orders,
            total_target,
            overall_achievement: percentage(total_sales, total_target),
            overall_aov: ratio(total_sales, total_orders as f64),
            branch_metrics,
        })
    }

    fn branch_metrics(
        &self,
        branch: &str,
        records: &[SalesRecord],
        overrides: &TargetOverrides,
    ) -> BranchMetrics {
        let branch_records: Vec<&SalesRecord> =
            records.iter().filter(|r| r.branch_name == branch).collect();

        let channels: Vec<ChannelMetrics> = self
            .config
            .channels
            .iter()
            .map(|channel| channel_metrics(channel, &branch_records))
            .collect();

        let total_sales = saturating_sum(channels.iter().map(|c| c.sales));
        let total_orders = saturating_count(channels.iter().map(|c| c.orders));
        let channel_target = saturating_sum(channels.iter().map(|c| c.target));

        let total_target = match overrides.get(branch) {
            Some(&value) if value.is_finite() => value,
            Some(&value) => {
                warn!(
                    "Ignoring non-finite target override {} for branch {}",
                    value, branch
                );
                channel_target
            }
            None => channel_target,
        };

        BranchMetrics {
            branch_name: branch.to_string(),
            total_sales,
            total_orders,
            total_target,
            achievement_percentage: percentage(total_sales, total_target),
            aov: ratio(total_sales, total_orders as f64),
            channels,
        }
    }
}

fn channel_metrics(channel: &str, branch_records: &[&SalesRecord]) -> ChannelMetrics {
    let matching: Vec<&&SalesRecord> = branch_records
        .iter()
        .filter(|r| r.channel_name == channel)
        .collect();

    let sales = saturating_sum(matching.iter().map(|r| coerce_amount(r.sales_value)));
    let orders = saturating_count(matching.iter().map(|r| r.orders_count));
    let target = saturating_sum(matching.iter().map(|r| coerce_amount(r.target_value)));

    ChannelMetrics {
        channel_name: channel.to_string(),
        sales,
        orders,
        target,
        achievement_percentage: percentage(sales, target),
        aov: ratio(sales, orders as f64),
    }
}

pub fn aggregate(
    records: &[SalesRecord],
    overrides: &TargetOverrides,
    config: &DashboardConfig,
) -> Option<DashboardSummary> {
    MetricsAggregator::new(config).aggregate(records, overrides)
}
