use std::fmt;

use tracing::info;

use crate::document::{assemble, DocumentKind, ExportDocument};
use crate::errors::{ExportError, RecordError, SourceError};
use crate::model::{
    CanonicalSeries, ContinuousWaterLevel, Lithology, ManualWaterLevel, WellConstruction,
};
use crate::reconcile::reconcile;
use crate::schema::SourceDomain;
use crate::source::RowSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// Manual and pressure readings reconciled into one series.
    WaterLevels,
    ManualWaterLevels,
    ContinuousWaterLevels,
    WellConstruction,
    Lithology,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::WaterLevels => "water_levels",
            ExportKind::ManualWaterLevels => "manual_water_levels",
            ExportKind::ContinuousWaterLevels => "continuous_water_levels",
            ExportKind::WellConstruction => "well_construction",
            ExportKind::Lithology => "lithology",
        }
    }

    pub fn document_kind(&self) -> DocumentKind {
        match self {
            ExportKind::WaterLevels
            | ExportKind::ManualWaterLevels
            | ExportKind::ContinuousWaterLevels => DocumentKind::WaterLevels,
            ExportKind::WellConstruction => DocumentKind::Casings,
            ExportKind::Lithology => DocumentKind::Lithologies,
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetch, reconcile where needed, and serialize one point's document.
pub async fn export(
    source: &dyn RowSource,
    kind: ExportKind,
    point_id: &str,
) -> Result<String, ExportError> {
    let document = match kind {
        ExportKind::WaterLevels => export_water_levels(source, point_id).await?,
        ExportKind::ManualWaterLevels => export_manual_water_levels(source, point_id).await?,
        ExportKind::ContinuousWaterLevels => {
            export_continuous_water_levels(source, point_id).await?
        }
        ExportKind::WellConstruction => export_well_construction(source, point_id).await?,
        ExportKind::Lithology => export_lithology(source, point_id).await?,
    };
    Ok(document.to_xml())
}

pub async fn export_water_levels(
    source: &dyn RowSource,
    point_id: &str,
) -> Result<ExportDocument, ExportError> {
    let series = water_level_series(source, point_id).await?;
    let document = assemble(DocumentKind::WaterLevels, series.entries())?;
    log_export(ExportKind::WaterLevels, point_id, &document);
    Ok(document)
}

/// Fetch both water-level sources and reconcile them.
pub async fn water_level_series(
    source: &dyn RowSource,
    point_id: &str,
) -> Result<CanonicalSeries, ExportError> {
    let manual = fetch_manual(source, point_id).await?;
    let continuous = fetch_continuous(source, point_id).await?;
    info!(
        point_id,
        manual = manual.len(),
        continuous = continuous.len(),
        "fetched water levels"
    );
    Ok(reconcile(manual, continuous)?)
}

pub async fn export_manual_water_levels(
    source: &dyn RowSource,
    point_id: &str,
) -> Result<ExportDocument, ExportError> {
    let manual = fetch_manual(source, point_id).await?;
    let series = reconcile(manual, Vec::new())?;
    let document = assemble(DocumentKind::WaterLevels, series.entries())?;
    log_export(ExportKind::ManualWaterLevels, point_id, &document);
    Ok(document)
}

pub async fn export_continuous_water_levels(
    source: &dyn RowSource,
    point_id: &str,
) -> Result<ExportDocument, ExportError> {
    let continuous = fetch_continuous(source, point_id).await?;
    let series = reconcile(Vec::new(), continuous)?;
    let document = assemble(DocumentKind::WaterLevels, series.entries())?;
    log_export(ExportKind::ContinuousWaterLevels, point_id, &document);
    Ok(document)
}

pub async fn export_well_construction(
    source: &dyn RowSource,
    point_id: &str,
) -> Result<ExportDocument, ExportError> {
    let rows = source
        .well_construction(point_id)
        .await
        .map_err(source_error(SourceDomain::WellConstruction, point_id))?;
    let document = well_construction_document(&rows)?;
    log_export(ExportKind::WellConstruction, point_id, &document);
    Ok(document)
}

pub async fn export_lithology(
    source: &dyn RowSource,
    point_id: &str,
) -> Result<ExportDocument, ExportError> {
    let rows = source
        .lithology(point_id)
        .await
        .map_err(source_error(SourceDomain::Lithology, point_id))?;
    let document = lithology_document(&rows)?;
    log_export(ExportKind::Lithology, point_id, &document);
    Ok(document)
}

/// Reconcile and assemble without a row source.
pub fn water_levels_document(
    manual: Vec<ManualWaterLevel>,
    continuous: Vec<ContinuousWaterLevel>,
) -> Result<ExportDocument, RecordError> {
    let series = reconcile(manual, continuous)?;
    assemble(DocumentKind::WaterLevels, series.entries())
}

pub fn well_construction_document(
    rows: &[WellConstruction],
) -> Result<ExportDocument, RecordError> {
    assemble(DocumentKind::Casings, rows)
}

pub fn lithology_document(rows: &[Lithology]) -> Result<ExportDocument, RecordError> {
    assemble(DocumentKind::Lithologies, rows)
}

async fn fetch_manual(
    source: &dyn RowSource,
    point_id: &str,
) -> Result<Vec<ManualWaterLevel>, ExportError> {
    source
        .manual_water_levels(point_id)
        .await
        .map_err(source_error(SourceDomain::ManualWaterLevels, point_id))
}

async fn fetch_continuous(
    source: &dyn RowSource,
    point_id: &str,
) -> Result<Vec<ContinuousWaterLevel>, ExportError> {
    source
        .continuous_water_levels(point_id)
        .await
        .map_err(source_error(SourceDomain::ContinuousWaterLevels, point_id))
}

fn source_error(domain: SourceDomain, point_id: &str) -> impl FnOnce(SourceError) -> ExportError {
    let point_id = point_id.to_string();
    move |source| ExportError::Source {
        domain,
        point_id,
        source,
    }
}

fn log_export(kind: ExportKind, point_id: &str, document: &ExportDocument) {
    info!(
        kind = %kind,
        point_id,
        children = document.len(),
        "assembled export document"
    );
}
