//! Row sources feeding the exporters. Each fetch is scoped to one point id.

mod files;
mod postgres;

pub use self::files::{CsvFiles, CsvRowSource};
pub use self::postgres::{PgRowSource, Relations};

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::model::{ContinuousWaterLevel, Lithology, ManualWaterLevel, WellConstruction};

#[async_trait]
pub trait RowSource: Send + Sync {
    async fn manual_water_levels(&self, point_id: &str)
        -> Result<Vec<ManualWaterLevel>, SourceError>;

    /// Only QC-approved rows unless the source was built with
    /// `require_qc = false`.
    async fn continuous_water_levels(
        &self,
        point_id: &str,
    ) -> Result<Vec<ContinuousWaterLevel>, SourceError>;

    async fn well_construction(&self, point_id: &str)
        -> Result<Vec<WellConstruction>, SourceError>;

    async fn lithology(&self, point_id: &str) -> Result<Vec<Lithology>, SourceError>;
}

/// Rows held in memory, mostly for tests and embedding.
#[derive(Debug, Clone)]
pub struct MemoryRowSource {
    manual: Vec<ManualWaterLevel>,
    continuous: Vec<ContinuousWaterLevel>,
    construction: Vec<WellConstruction>,
    lithology: Vec<Lithology>,
    require_qc: bool,
}

impl Default for MemoryRowSource {
    fn default() -> Self {
        Self {
            manual: Vec::new(),
            continuous: Vec::new(),
            construction: Vec::new(),
            lithology: Vec::new(),
            require_qc: true,
        }
    }
}

impl MemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manual(mut self, rows: impl IntoIterator<Item = ManualWaterLevel>) -> Self {
        self.manual.extend(rows);
        self
    }

    pub fn with_continuous(
        mut self,
        rows: impl IntoIterator<Item = ContinuousWaterLevel>,
    ) -> Self {
        self.continuous.extend(rows);
        self
    }

    pub fn with_well_construction(
        mut self,
        rows: impl IntoIterator<Item = WellConstruction>,
    ) -> Self {
        self.construction.extend(rows);
        self
    }

    pub fn with_lithology(mut self, rows: impl IntoIterator<Item = Lithology>) -> Self {
        self.lithology.extend(rows);
        self
    }

    pub fn require_qc(mut self, require_qc: bool) -> Self {
        self.require_qc = require_qc;
        self
    }
}

#[async_trait]
impl RowSource for MemoryRowSource {
    async fn manual_water_levels(
        &self,
        point_id: &str,
    ) -> Result<Vec<ManualWaterLevel>, SourceError> {
        Ok(for_point(&self.manual, point_id, |row| &row.point_id))
    }

    async fn continuous_water_levels(
        &self,
        point_id: &str,
    ) -> Result<Vec<ContinuousWaterLevel>, SourceError> {
        let rows = for_point(&self.continuous, point_id, |row| &row.point_id);
        Ok(filter_qc(rows, self.require_qc))
    }

    async fn well_construction(
        &self,
        point_id: &str,
    ) -> Result<Vec<WellConstruction>, SourceError> {
        Ok(for_point(&self.construction, point_id, |row| &row.point_id))
    }

    async fn lithology(&self, point_id: &str) -> Result<Vec<Lithology>, SourceError> {
        Ok(for_point(&self.lithology, point_id, |row| &row.point_id))
    }
}

pub(crate) fn for_point<T, F>(rows: &[T], point_id: &str, key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &String,
{
    rows.iter()
        .filter(|row| key(row) == point_id)
        .cloned()
        .collect()
}

pub(crate) fn filter_qc(
    rows: Vec<ContinuousWaterLevel>,
    require_qc: bool,
) -> Vec<ContinuousWaterLevel> {
    if !require_qc {
        return rows;
    }
    rows.into_iter().filter(|row| row.is_qc_approved()).collect()
}
