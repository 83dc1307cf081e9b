//! Write operations gated on a privilege flag supplied by the host's
//! authorization layer. Reads and aggregation never go through here.

use crate::error::{DashboardError, Result};
use crate::schema::{BranchTarget, DashboardConfig, SalesRecord};
use crate::store::{replace_records, RecordStore};
use crate::targets::TargetStore;
use crate::utils::{month_key, parse_month};
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminSession {
    privileged: bool,
}

impl AdminSession {
    pub fn new(privileged: bool) -> Self {
        Self { privileged }
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    fn require_privilege(&self, operation: &str) -> Result<()> {
        if self.privileged {
            Ok(())
        } else {
            warn!("Rejected unprivileged '{}'", operation);
            Err(DashboardError::Unauthorized(operation.to_string()))
        }
    }

    /// Replaces the whole record store with `records`, in chunks of the configured size.
    pub fn upload_records<S: RecordStore + ?Sized>(
        &self,
        config: &DashboardConfig,
        store: &mut S,
        records: &[SalesRecord],
    ) -> Result<usize> {
        self.require_privilege("upload_records")?;
        let inserted = replace_records(store, records, config.upload_chunk_size)?;
        info!("Uploaded {} records", inserted);
        Ok(inserted)
    }

    /// Sets the explicit target for `branch` in `month`, replacing any previous value.
    pub fn set_branch_target<S: TargetStore + ?Sized>(
        &self,
        config: &DashboardConfig,
        store: &mut S,
        branch: &str,
        month: &str,
        value: f64,
    ) -> Result<BranchTarget> {
        self.require_privilege("set_branch_target")?;

        let month = month_key(parse_month(month.trim())?);

        if !config.has_branch(branch) {
            return Err(DashboardError::UnknownBranch(branch.to_string()));
        }
        if !value.is_finite() || value < 0.0 {
            return Err(DashboardError::InvalidTargetValue {
                branch: branch.to_string(),
                value,
            });
        }

        let target = BranchTarget {
            branch_name: branch.to_string(),
            month,
            target_value: value,
        };
        store.upsert(target.clone())?;

        info!(
            "Set target for {} in {} to {}",
            target.branch_name, target.month, target.target_value
        );

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;
    use crate::targets::{resolve_targets, InMemoryTargetStore};

    fn config() -> DashboardConfig {
        let mut config = DashboardConfig::new(&["A", "B"], &["X", "Y"]);
        config.upload_chunk_size = 2;
        config
    }

    #[test]
    fn test_unprivileged_writes_are_rejected() {
        let session = AdminSession::new(false);
        let mut records = InMemoryRecordStore::with_records(vec![SalesRecord::new(
            "2024-03-01",
            "A",
            "X",
            1.0,
            1,
            0.0,
        )]);
        let mut targets = InMemoryTargetStore::new();

        let upload = session.upload_records(&config(), &mut records, &[]);
        assert!(matches!(upload, Err(DashboardError::Unauthorized(_))));
        assert_eq!(records.len(), 1);

        let set = session.set_branch_target(&config(), &mut targets, "A", "2024-03", 10.0);
        assert!(matches!(set, Err(DashboardError::Unauthorized(_))));
        assert!(targets.is_empty());
    }

    #[test]
    fn test_privileged_upload_uses_configured_chunks() {
        let session = AdminSession::new(true);
        let mut store = InMemoryRecordStore::new();
        let records: Vec<SalesRecord> = (0..5)
            .map(|i| SalesRecord::new("2024-03-01", "A", "X", i as f64, 1, 0.0))
            .collect();

        let inserted = session.upload_records(&config(), &mut store, &records).unwrap();
        assert_eq!(inserted, 5);
        assert_eq!(store.insert_calls(), 3);
    }

    #[test]
    fn test_set_branch_target_validates_and_upserts() {
        let session = AdminSession::new(true);
        let mut store = InMemoryTargetStore::new();

        let target = session
            .set_branch_target(&config(), &mut store, "A", " 2024-03 ", 1000.0)
            .unwrap();
        assert_eq!(target.month, "2024-03");

        session
            .set_branch_target(&config(), &mut store, "A", "2024-03", 1500.0)
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            resolve_targets(&store, "2024-03").unwrap().get("A"),
            Some(&1500.0)
        );

        assert!(matches!(
            session.set_branch_target(&config(), &mut store, "Z", "2024-03", 1.0),
            Err(DashboardError::UnknownBranch(_))
        ));
        assert!(matches!(
            session.set_branch_target(&config(), &mut store, "A", "March", 1.0),
            Err(DashboardError::InvalidMonth(_))
        ));
        assert!(matches!(
            session.set_branch_target(&config(), &mut store, "A", "2024-03", -5.0),
            Err(DashboardError::InvalidTargetValue { .. })
        ));
        assert!(matches!(
            session.set_branch_target(&config(), &mut store, "A", "2024-03", f64::NAN),
            Err(DashboardError::InvalidTargetValue { .. })
        ));
        assert_eq!(store.len(), 1);
    }
}
