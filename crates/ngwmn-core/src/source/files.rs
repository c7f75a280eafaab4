use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{filter_qc, RowSource};
use crate::errors::SourceError;
use crate::model::{ContinuousWaterLevel, Lithology, ManualWaterLevel, WellConstruction};
use crate::schema::{row_schema, SourceDomain};

/// File name per domain inside the row directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CsvFiles {
    pub manual_water_levels: String,
    pub continuous_water_levels: String,
    pub well_construction: String,
    pub lithology: String,
}

impl Default for CsvFiles {
    fn default() -> Self {
        Self {
            manual_water_levels: "manual_water_levels.csv".to_string(),
            continuous_water_levels: "continuous_water_levels.csv".to_string(),
            well_construction: "well_construction.csv".to_string(),
            lithology: "lithology.csv".to_string(),
        }
    }
}

impl CsvFiles {
    fn file_for(&self, domain: SourceDomain) -> &str {
        match domain {
            SourceDomain::ManualWaterLevels => &self.manual_water_levels,
            SourceDomain::ContinuousWaterLevels => &self.continuous_water_levels,
            SourceDomain::WellConstruction => &self.well_construction,
            SourceDomain::Lithology => &self.lithology,
        }
    }
}

/// Reads one header-first CSV file per domain. Files are re-read on every
/// fetch.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    directory: PathBuf,
    files: CsvFiles,
    require_qc: bool,
}

impl CsvRowSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            files: CsvFiles::default(),
            require_qc: true,
        }
    }

    pub fn with_files(mut self, files: CsvFiles) -> Self {
        self.files = files;
        self
    }

    pub fn require_qc(mut self, require_qc: bool) -> Self {
        self.require_qc = require_qc;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, domain: SourceDomain) -> PathBuf {
        self.directory.join(self.files.file_for(domain))
    }

    async fn read_rows<T, F>(
        &self,
        domain: SourceDomain,
        point_id: &str,
        key: F,
    ) -> Result<Vec<T>, SourceError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> &str,
    {
        let path = self.path_for(domain);
        let content =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                })?;

        let rows: Vec<T> = parse_rows(domain, &path, &content)?;
        let total = rows.len();
        let rows: Vec<T> = rows.into_iter().filter(|row| key(row) == point_id).collect();
        debug!(
            domain = %domain,
            path = %path.display(),
            total,
            matched = rows.len(),
            "read CSV rows"
        );
        Ok(rows)
    }
}

fn parse_rows<T: DeserializeOwned>(
    domain: SourceDomain,
    path: &Path,
    content: &str,
) -> Result<Vec<T>, SourceError> {
    let csv_error = |source: csv::Error| SourceError::Csv {
        domain,
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let schema = row_schema(domain);
    let found: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let expected = schema.column_names();
    if found.len() != expected.len() || found.iter().zip(&expected).any(|(f, e)| f != e) {
        return Err(SourceError::SchemaMismatch {
            domain,
            version: schema.version,
            expected: expected.iter().map(|name| name.to_string()).collect(),
            found,
        });
    }

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_error)
}

#[async_trait]
impl RowSource for CsvRowSource {
    async fn manual_water_levels(
        &self,
        point_id: &str,
    ) -> Result<Vec<ManualWaterLevel>, SourceError> {
        self.read_rows(SourceDomain::ManualWaterLevels, point_id, |row: &ManualWaterLevel| {
            row.point_id.as_str()
        })
        .await
    }

    async fn continuous_water_levels(
        &self,
        point_id: &str,
    ) -> Result<Vec<ContinuousWaterLevel>, SourceError> {
        let rows = self
            .read_rows(
                SourceDomain::ContinuousWaterLevels,
                point_id,
                |row: &ContinuousWaterLevel| row.point_id.as_str(),
            )
            .await?;
        Ok(filter_qc(rows, self.require_qc))
    }

    async fn well_construction(
        &self,
        point_id: &str,
    ) -> Result<Vec<WellConstruction>, SourceError> {
        self.read_rows(SourceDomain::WellConstruction, point_id, |row: &WellConstruction| {
            row.point_id.as_str()
        })
        .await
    }

    async fn lithology(&self, point_id: &str) -> Result<Vec<Lithology>, SourceError> {
        self.read_rows(SourceDomain::Lithology, point_id, |row: &Lithology| {
            row.point_id.as_str()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_reordered_header() {
        let content = "DateMeasured,PointID,DepthToWaterBGS,WaterLevelUnits,MeasuringMethod,WaterLevelAccuracy\n";
        let err = parse_rows::<ManualWaterLevel>(
            SourceDomain::ManualWaterLevels,
            Path::new("manual.csv"),
            content,
        )
        .unwrap_err();
        match err {
            SourceError::SchemaMismatch { domain, found, .. } => {
                assert_eq!(domain, SourceDomain::ManualWaterLevels);
                assert_eq!(found[0], "DateMeasured");
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn empty_cells_become_none() {
        let content = "PointID,DateMeasured,DepthToWaterBGS,WaterLevelUnits,MeasuringMethod,WaterLevelAccuracy\n\
                       NM-0001,2024-01-01,10.0,,,\n";
        let rows = parse_rows::<ManualWaterLevel>(
            SourceDomain::ManualWaterLevels,
            Path::new("manual.csv"),
            content,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].depth_to_water_bgs, Some(10.0));
        assert_eq!(rows[0].water_level_units, None);
    }
}
