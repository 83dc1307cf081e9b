use crate::error::{DashboardError, Result};
use crate::schema::SalesRecord;
use log::{debug, info};

/// Holder of the raw sales records.
pub trait RecordStore {
    fn fetch_all(&self) -> Result<Vec<SalesRecord>>;

    fn insert(&mut self, batch: &[SalesRecord]) -> Result<()>;

    fn delete_all(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Vec<SalesRecord>,
    insert_calls: usize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SalesRecord>) -> Self {
        Self {
            records,
            insert_calls: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of insert batches received so far.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls
    }
}

impl RecordStore for InMemoryRecordStore {
    fn fetch_all(&self) -> Result<Vec<SalesRecord>> {
        Ok(self.records.clone())
    }

    fn insert(&mut self, batch: &[SalesRecord]) -> Result<()> {
        self.records.extend_from_slice(batch);
        self.insert_calls += 1;
        Ok(())
    }

    fn delete_all(&mut self) -> Result<()> {
        self.records.clear();
        Ok(())
    }
}

/// Deletes every stored record, then inserts `records` in batches of `chunk_size`.
/// Returns the number of records inserted.
pub fn replace_records<S: RecordStore + ?Sized>(
    store: &mut S,
    records: &[SalesRecord],
    chunk_size: usize,
) -> Result<usize> {
    if chunk_size == 0 {
        return Err(DashboardError::InvalidChunkSize(chunk_size));
    }

    store.delete_all()?;

    let mut inserted = 0;
    for (idx, chunk) in records.chunks(chunk_size).enumerate() {
        store.insert(chunk)?;
        inserted += chunk.len();
        debug!("Inserted chunk #{} ({} records)", idx, chunk.len());
    }

    info!("Replaced record store contents with {} records", inserted);

    Ok(inserted)
}
