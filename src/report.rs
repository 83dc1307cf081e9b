use crate::error::{DashboardError, Result};
use crate::schema::DashboardSummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowLevel {
    Overall,
    Branch,
    Channel,
}

/// One line of the flattened summary, as consumed by spreadsheet-style exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub level: RowLevel,
    pub branch: Option<String>,
    pub channel: Option<String>,
    pub sales: f64,
    pub orders: u64,
    pub target: f64,
    pub achievement_percentage: f64,
    pub aov: f64,
}

/// Flattens the summary: the overall row first, then each branch followed by its channels.
pub fn summary_rows(summary: &DashboardSummary) -> Vec<SummaryRow> {
    let mut rows = vec![SummaryRow {
        level: RowLevel::Overall,
        branch: None,
        channel: None,
        sales: summary.total_sales,
        orders: summary.total_orders,
        target: summary.total_target,
        achievement_percentage: summary.overall_achievement,
        aov: summary.overall_aov,
    }];

    for branch in &summary.branch_metrics {
        rows.push(SummaryRow {
            level: RowLevel::Branch,
            branch: Some(branch.branch_name.clone()),
            channel: None,
            sales: branch.total_sales,
            orders: branch.total_orders,
            target: branch.total_target,
            achievement_percentage: branch.achievement_percentage,
            aov: branch.aov,
        });

        for channel in &branch.channels {
            rows.push(SummaryRow {
                level: RowLevel::Channel,
                branch: Some(branch.branch_name.clone()),
                channel: Some(channel.channel_name.clone()),
                sales: channel.sales,
                orders: channel.orders,
                target: channel.target,
                achievement_percentage: channel.achievement_percentage,
                aov: channel.aov,
            });
        }
    }

    rows
}

pub fn summary_to_csv(summary: &DashboardSummary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in summary_rows(summary) {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
