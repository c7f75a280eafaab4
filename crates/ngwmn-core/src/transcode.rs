use chrono::{Datelike, NaiveDate};

use crate::errors::TranscodeError;
use crate::model::{
    CanonicalEntry, ContinuousWaterLevel, Lithology, ManualWaterLevel, Reading, WellConstruction,
};
use crate::schema::{SourceDomain, CASING_LEAVES, LITHOLOGY_LEAVES, WATER_LEVEL_LEAVES};

pub const MEASUREMENT_TIME: &str = "0:00:00";
pub const MEASUREMENT_TIMEZONE: &str = "MST";
pub const PRESSURE_UNITS: &str = "ft bgs";
pub const PRESSURE_METHOD: &str = "Pressure Transducer";
pub const PRESSURE_ACCURACY: &str = "0.02 ft";
pub const UNKNOWN_MATERIAL: &str = "Unknown";
/// Text written for a missing value in a stringified leaf.
pub const MISSING_VALUE: &str = "None";

/// A named text value inside a document child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub name: &'static str,
    pub text: String,
}

/// Maps one record onto the fixed, ordered leaf set of its document child.
pub trait Transcode {
    fn domain(&self) -> SourceDomain;
    fn point_id(&self) -> &str;
    fn leaves(&self) -> Result<Vec<Leaf>, TranscodeError>;
}

impl Transcode for ManualWaterLevel {
    fn domain(&self) -> SourceDomain {
        SourceDomain::ManualWaterLevels
    }

    fn point_id(&self) -> &str {
        &self.point_id
    }

    fn leaves(&self) -> Result<Vec<Leaf>, TranscodeError> {
        let date = self
            .date_measured
            .ok_or(TranscodeError::MissingMeasurementDate)?;
        let [month, day, year] = date_parts(date);
        Ok(zip_leaves(
            &WATER_LEVEL_LEAVES,
            [
                self.point_id.clone(),
                depth(self.depth_to_water_bgs)?,
                text(&self.water_level_units),
                text(&self.measuring_method),
                month,
                day,
                year,
                MEASUREMENT_TIME.to_string(),
                MEASUREMENT_TIMEZONE.to_string(),
                text(&self.accuracy),
            ],
        ))
    }
}

impl Transcode for ContinuousWaterLevel {
    fn domain(&self) -> SourceDomain {
        SourceDomain::ContinuousWaterLevels
    }

    fn point_id(&self) -> &str {
        &self.point_id
    }

    fn leaves(&self) -> Result<Vec<Leaf>, TranscodeError> {
        let date = self
            .measured_on()
            .ok_or(TranscodeError::MissingMeasurementDate)?;
        let [month, day, year] = date_parts(date);
        Ok(zip_leaves(
            &WATER_LEVEL_LEAVES,
            [
                self.point_id.clone(),
                depth(self.depth_to_water_bgs)?,
                PRESSURE_UNITS.to_string(),
                PRESSURE_METHOD.to_string(),
                month,
                day,
                year,
                MEASUREMENT_TIME.to_string(),
                MEASUREMENT_TIMEZONE.to_string(),
                PRESSURE_ACCURACY.to_string(),
            ],
        ))
    }
}

impl Transcode for WellConstruction {
    fn domain(&self) -> SourceDomain {
        SourceDomain::WellConstruction
    }

    fn point_id(&self) -> &str {
        &self.point_id
    }

    fn leaves(&self) -> Result<Vec<Leaf>, TranscodeError> {
        Ok(zip_leaves(
            &CASING_LEAVES,
            [
                self.point_id.clone(),
                number(self.casing_top),
                number(self.casing_bottom),
                text(&self.casing_depth_units),
                number(self.screen_top),
                number(self.screen_bottom),
                text(&self.screen_depth_units),
                material(&self.screen_material),
                material(&self.casing_material),
            ],
        ))
    }
}

impl Transcode for Lithology {
    fn domain(&self) -> SourceDomain {
        SourceDomain::Lithology
    }

    fn point_id(&self) -> &str {
        &self.point_id
    }

    fn leaves(&self) -> Result<Vec<Leaf>, TranscodeError> {
        Ok(zip_leaves(
            &LITHOLOGY_LEAVES,
            [
                self.point_id.clone(),
                raw_text(&self.lithology_code),
                raw_text(&self.term),
                raw_text(&self.strat_source),
                number(self.strat_top),
                text(&self.strat_top_unit),
                number(self.strat_bottom),
                text(&self.strat_bottom_unit),
            ],
        ))
    }
}

impl Transcode for CanonicalEntry {
    fn domain(&self) -> SourceDomain {
        match &self.reading {
            Reading::Manual(record) => record.domain(),
            Reading::Pressure(record) => record.domain(),
        }
    }

    fn point_id(&self) -> &str {
        self.reading.point_id()
    }

    fn leaves(&self) -> Result<Vec<Leaf>, TranscodeError> {
        match &self.reading {
            Reading::Manual(record) => record.leaves(),
            Reading::Pressure(record) => record.leaves(),
        }
    }
}

fn zip_leaves<const N: usize>(names: &[&'static str; N], values: [String; N]) -> Vec<Leaf> {
    names
        .iter()
        .zip(values)
        .map(|(name, text)| Leaf { name: *name, text })
        .collect()
}

/// Month, day and year without zero padding.
fn date_parts(date: NaiveDate) -> [String; 3] {
    [
        date.month().to_string(),
        date.day().to_string(),
        date.year().to_string(),
    ]
}

fn depth(value: Option<f64>) -> Result<String, TranscodeError> {
    value
        .map(|depth| format!("{depth:.2}"))
        .ok_or(TranscodeError::MissingField {
            field: "DepthToWaterBGS",
        })
}

/// Missing values are spelled out.
fn text(value: &Option<String>) -> String {
    value.as_deref().unwrap_or(MISSING_VALUE).to_string()
}

/// Missing values leave the element empty.
fn raw_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn material(value: &Option<String>) -> String {
    match value.as_deref() {
        Some(material) if !material.is_empty() => material.to_string(),
        _ => UNKNOWN_MATERIAL.to_string(),
    }
}

/// Shortest round-trip form, always with a fractional part.
pub(crate) fn number(value: Option<f64>) -> String {
    match value {
        None => MISSING_VALUE.to_string(),
        Some(v) if v.is_finite() && v.fract() == 0.0 => format!("{v}.0"),
        Some(v) => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_keep_one_decimal() {
        assert_eq!(number(Some(150.0)), "150.0");
        assert_eq!(number(Some(12.5)), "12.5");
        assert_eq!(number(Some(-3.0)), "-3.0");
        assert_eq!(number(None), "None");
    }

    #[test]
    fn depth_rounds_to_two_places() {
        assert_eq!(depth(Some(5.0)).unwrap(), "5.00");
        assert_eq!(depth(Some(9.499)).unwrap(), "9.50");
        assert_eq!(
            depth(None),
            Err(TranscodeError::MissingField {
                field: "DepthToWaterBGS"
            })
        );
    }
}
