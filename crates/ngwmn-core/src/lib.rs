pub mod config;
pub mod db;
pub mod document;
pub mod errors;
pub mod export;
pub mod model;
mod reconcile;
pub mod schema;
pub mod source;
pub mod transcode;

pub use config::{ExportConfig, SourceConfig};
pub use document::{assemble, assemble_with, DocumentKind, Element, ExportDocument};
pub use errors::{ConfigError, ExportError, RecordError, SourceError, TranscodeError};
pub use export::{
    export, export_continuous_water_levels, export_lithology, export_manual_water_levels,
    export_water_levels, export_well_construction, lithology_document, water_level_series,
    water_levels_document, well_construction_document, ExportKind,
};
pub use model::{
    CanonicalEntry, CanonicalSeries, ContinuousWaterLevel, Lithology, ManualWaterLevel,
    Provenance, Reading, WellConstruction,
};
pub use reconcile::reconcile;
pub use schema::{all_row_schemas, row_schema, RowSchema, SourceDomain, ROW_SCHEMA_VERSION};
pub use source::{CsvFiles, CsvRowSource, MemoryRowSource, PgRowSource, Relations, RowSource};
pub use transcode::{Leaf, Transcode};
