use crate::error::{DashboardError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

pub const DEFAULT_BRANCHES: [&str; 5] = ["Central", "North", "South", "East", "West"];
pub const DEFAULT_CHANNELS: [&str; 4] = ["Dine-In", "Takeaway", "Delivery", "Online"];
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 500;

/// Explicit per-branch target overrides for one month.
/// A missing branch means "fall back to the channel target sum", never zero.
pub type TargetOverrides = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DashboardConfig {
    #[schemars(
        description = "Ordered branch enumeration. The summary lists branches in exactly this order, including branches with no records."
    )]
    pub branches: Vec<String>,

    #[schemars(
        description = "Ordered channel enumeration. Every branch lists its channels in exactly this order."
    )]
    pub channels: Vec<String>,

    #[serde(default = "default_upload_chunk_size")]
    #[schemars(
        description = "Number of records inserted per batch when replacing the record store"
    )]
    pub upload_chunk_size: usize,
}

fn default_upload_chunk_size() -> usize {
    DEFAULT_UPLOAD_CHUNK_SIZE
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            branches: DEFAULT_BRANCHES.iter().map(|b| b.to_string()).collect(),
            channels: DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect(),
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
        }
    }
}

impl DashboardConfig {
    pub fn new(branches: &[&str], channels: &[&str]) -> Self {
        Self {
            branches: branches.iter().map(|b| b.to_string()).collect(),
            channels: channels.iter().map(|c| c.to_string()).collect(),
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_names("branch", &self.branches)?;
        validate_names("channel", &self.channels)?;

        if self.upload_chunk_size == 0 {
            return Err(DashboardError::InvalidChunkSize(self.upload_chunk_size));
        }

        Ok(())
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.iter().any(|b| b == name)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DashboardConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

fn validate_names(kind: &str, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(DashboardError::InvalidConfig(format!(
            "at least one {} is required",
            kind
        )));
    }

    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(DashboardError::InvalidConfig(format!(
                "{} names must not be blank",
                kind
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(DashboardError::InvalidConfig(format!(
                "duplicate {} '{}'",
                kind, name
            )));
        }
    }

    Ok(())
}

/// One observation of sales at a branch, on a channel, on a date.
///
/// Numeric fields deserialize leniently: numbers and numeric strings are
/// accepted, while missing, null, non-numeric, negative or non-finite values
/// become 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesRecord {
    /// Calendar date in YYYY-MM-DD format. Missing dates deserialize as "".
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub branch_name: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub channel_name: String,

    #[serde(default, deserialize_with = "lenient_amount")]
    pub sales_value: f64,

    #[serde(default, deserialize_with = "lenient_count")]
    pub orders_count: u64,

    /// This record's contribution to the bottom-up target,
    /// independent of branch-level overrides.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub target_value: f64,
}

impl SalesRecord {
    pub fn new(
        date: &str,
        branch_name: &str,
        channel_name: &str,
        sales_value: f64,
        orders_count: u64,
        target_value: f64,
    ) -> Self {
        Self {
            date: date.to_string(),
            branch_name: branch_name.to_string(),
            channel_name: channel_name.to_string(),
            sales_value,
            orders_count,
            target_value,
        }
    }
}

/// An explicit monthly target, unique per `(branch_name, month)`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BranchTarget {
    pub branch_name: String,
    #[schemars(description = "Month in YYYY-MM format")]
    pub month: String,
    pub target_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMetrics {
    pub channel_name: String,
    pub sales: f64,
    pub orders: u64,
    pub target: f64,
    pub achievement_percentage: f64,
    pub aov: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchMetrics {
    pub branch_name: String,
    pub total_sales: f64,
    pub total_orders: u64,
    pub total_target: f64,
    pub achievement_percentage: f64,
    pub aov: f64,
    pub channels: Vec<ChannelMetrics>,
}

impl BranchMetrics {
    pub fn channel(&self, name: &str) -> Option<&ChannelMetrics> {
        self.channels.iter().find(|c| c.channel_name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_sales: f64,
    pub total_orders: u64,
    pub total_target: f64,
    pub overall_achievement: f64,
    pub overall_aov: f64,
    pub branch_metrics: Vec<BranchMetrics>,
}

impl DashboardSummary {
    pub fn branch(&self, name: &str) -> Option<&BranchMetrics> {
        self.branch_metrics.iter().find(|b| b.branch_name == name)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(amount_from_value).unwrap_or(0.0))
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(count_from_value).unwrap_or(0))
}

fn amount_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().map(non_negative).unwrap_or(0.0),
        Value::String(s) => parse_amount(s),
        _ => 0.0,
    }
}

fn count_from_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .unwrap_or_else(|| n.as_f64().map(non_negative).unwrap_or(0.0) as u64),
        Value::String(s) => parse_count(s),
        _ => 0,
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Parses an amount from text, yielding 0 for blank, non-numeric, negative or non-finite input.
pub fn parse_amount(text: &str) -> f64 {
    text.trim().parse::<f64>().map(non_negative).unwrap_or(0.0)
}

/// Parses an order count from text. Fractional counts are truncated.
pub fn parse_count(text: &str) -> u64 {
    let trimmed = text.trim();
    trimmed
        .parse::<u64>()
        .unwrap_or_else(|_| parse_amount(trimmed) as u64)
}
