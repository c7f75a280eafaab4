use std::path::PathBuf;

use thiserror::Error;

use crate::schema::SourceDomain;

/// Failure while deriving leaf values from a single record. Carries no
/// position; the assembler attaches domain, point id and index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeError {
    #[error("record has no measurement date")]
    MissingMeasurementDate,
    #[error("record is missing {field}")]
    MissingField { field: &'static str },
}

impl TranscodeError {
    pub fn at(self, domain: SourceDomain, point_id: impl Into<String>, index: usize) -> RecordError {
        let point_id = point_id.into();
        match self {
            TranscodeError::MissingMeasurementDate => RecordError::MissingMeasurementDate {
                domain,
                point_id,
                index,
            },
            TranscodeError::MissingField { field } => RecordError::MissingField {
                domain,
                point_id,
                index,
                field,
            },
        }
    }
}

/// Data-quality failure for one record. Surfaced to the caller, never
/// coerced or dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("{domain} record {index} for point {point_id} has no measurement date")]
    MissingMeasurementDate {
        domain: SourceDomain,
        point_id: String,
        index: usize,
    },

    #[error("{domain} record {index} for point {point_id} is missing {field}")]
    MissingField {
        domain: SourceDomain,
        point_id: String,
        index: usize,
        field: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{domain} CSV error in {}: {source}", .path.display())]
    Csv {
        domain: SourceDomain,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{domain} columns do not match {version}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        domain: SourceDomain,
        version: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("failed to connect to Postgres: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("invalid relation name '{0}'")]
    InvalidRelation(String),

    #[error("{domain} query failed: {source}")]
    Query {
        domain: SourceDomain,
        #[source]
        source: sqlx::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to fetch {domain} rows for point {point_id}: {source}")]
    Source {
        domain: SourceDomain,
        point_id: String,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Record(#[from] RecordError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("configuration error: {0}")]
    Invalid(String),
}
