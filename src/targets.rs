use crate::error::Result;
use crate::schema::{BranchTarget, TargetOverrides};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Source of explicit monthly branch targets.
pub trait TargetStore {
    /// All target rows recorded for `month` ("YYYY-MM"), possibly none.
    fn targets_for_month(&self, month: &str) -> Result<Vec<BranchTarget>>;

    /// Inserts or replaces the row keyed by `(branch_name, month)`.
    fn upsert(&mut self, target: BranchTarget) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTargetStore {
    rows: BTreeMap<(String, String), f64>,
}

impl InMemoryTargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TargetStore for InMemoryTargetStore {
    fn targets_for_month(&self, month: &str) -> Result<Vec<BranchTarget>> {
        Ok(self
            .rows
            .iter()
            .filter(|((_, m), _)| m == month)
            .map(|((branch, m), value)| BranchTarget {
                branch_name: branch.clone(),
                month: m.clone(),
                target_value: *value,
            })
            .collect())
    }

    fn upsert(&mut self, target: BranchTarget) -> Result<()> {
        self.rows
            .insert((target.branch_name, target.month), target.target_value);
        Ok(())
    }
}

/// Reads the explicit targets for `month` into an override map.
///
/// Branches without a row are left out so the aggregator falls back to the
/// channel target sum for them.
pub fn resolve_targets<S: TargetStore + ?Sized>(store: &S, month: &str) -> Result<TargetOverrides> {
    let rows = store.targets_for_month(month)?;

    let mut overrides = TargetOverrides::new();
    for row in rows {
        if row.month != month {
            warn!(
                "Target store returned a row for {} when asked for {}; skipping",
                row.month, month
            );
            continue;
        }
        overrides.insert(row.branch_name, row.target_value);
    }

    debug!(
        "Resolved {} explicit target(s) for {}",
        overrides.len(),
        month
    );

    Ok(overrides)
}
