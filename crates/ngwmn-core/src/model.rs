use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// One manually recorded depth-to-water reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualWaterLevel {
    #[serde(rename = "PointID")]
    pub point_id: String,
    #[serde(rename = "DateMeasured")]
    pub date_measured: Option<NaiveDate>,
    /// Feet below ground surface.
    #[serde(rename = "DepthToWaterBGS")]
    pub depth_to_water_bgs: Option<f64>,
    #[serde(rename = "WaterLevelUnits")]
    pub water_level_units: Option<String>,
    #[serde(rename = "MeasuringMethod")]
    pub measuring_method: Option<String>,
    #[serde(rename = "WaterLevelAccuracy")]
    pub accuracy: Option<String>,
}

impl ManualWaterLevel {
    pub fn new(point_id: impl Into<String>, date_measured: NaiveDate, depth_to_water_bgs: f64) -> Self {
        Self {
            point_id: point_id.into(),
            date_measured: Some(date_measured),
            depth_to_water_bgs: Some(depth_to_water_bgs),
            water_level_units: None,
            measuring_method: None,
            accuracy: None,
        }
    }

    pub fn measured_on(&self) -> Option<NaiveDate> {
        self.date_measured
    }
}

/// One daily pressure transducer reading. Only the identifiers, the
/// timestamp and the depth feed the merge; every other column is carried so
/// transcoders can grow into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousWaterLevel {
    #[serde(rename = "GlobalID")]
    pub global_id: Option<Uuid>,
    #[serde(rename = "OBJECTID")]
    pub object_id: Option<i64>,
    #[serde(rename = "WellID")]
    pub well_id: Option<Uuid>,
    #[serde(rename = "PointID")]
    pub point_id: String,
    #[serde(rename = "DateMeasured")]
    pub date_measured: Option<NaiveDateTime>,
    #[serde(rename = "TemperatureWater")]
    pub temperature_water: Option<f64>,
    #[serde(rename = "WaterHead")]
    pub water_head: Option<f64>,
    #[serde(rename = "WaterHeadAdjusted")]
    pub water_head_adjusted: Option<f64>,
    #[serde(rename = "DepthToWaterBGS")]
    pub depth_to_water_bgs: Option<f64>,
    #[serde(rename = "MeasurementMethod")]
    pub measurement_method: Option<String>,
    #[serde(rename = "DataSource")]
    pub data_source: Option<String>,
    #[serde(rename = "MeasuringAgency")]
    pub measuring_agency: Option<String>,
    #[serde(rename = "QCed", default, deserialize_with = "deserialize_flag")]
    pub qced: Option<bool>,
    #[serde(rename = "Notes")]
    pub notes: Option<String>,
    #[serde(rename = "Created")]
    pub created: Option<NaiveDateTime>,
    #[serde(rename = "Updated")]
    pub updated: Option<NaiveDateTime>,
    #[serde(rename = "ProcessedBy")]
    pub processed_by: Option<String>,
    #[serde(rename = "CheckedBy")]
    pub checked_by: Option<String>,
    #[serde(rename = "CONDDL (mS/cm)")]
    pub conductivity_ms_cm: Option<f64>,
}

impl ContinuousWaterLevel {
    pub fn new(
        point_id: impl Into<String>,
        date_measured: NaiveDateTime,
        depth_to_water_bgs: f64,
    ) -> Self {
        Self {
            global_id: None,
            object_id: None,
            well_id: None,
            point_id: point_id.into(),
            date_measured: Some(date_measured),
            temperature_water: None,
            water_head: None,
            water_head_adjusted: None,
            depth_to_water_bgs: Some(depth_to_water_bgs),
            measurement_method: None,
            data_source: None,
            measuring_agency: None,
            qced: None,
            notes: None,
            created: None,
            updated: None,
            processed_by: None,
            checked_by: None,
            conductivity_ms_cm: None,
        }
    }

    pub fn qc_approved(mut self) -> Self {
        self.qced = Some(true);
        self
    }

    pub fn is_qc_approved(&self) -> bool {
        self.qced == Some(true)
    }

    /// Calendar date of the reading's timestamp.
    pub fn measured_on(&self) -> Option<NaiveDate> {
        self.date_measured.map(|timestamp| timestamp.date())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellConstruction {
    #[serde(rename = "PointID")]
    pub point_id: String,
    #[serde(rename = "CasingTop")]
    pub casing_top: Option<f64>,
    #[serde(rename = "CasingBottom")]
    pub casing_bottom: Option<f64>,
    #[serde(rename = "CasingDepthUnits")]
    pub casing_depth_units: Option<String>,
    #[serde(rename = "ScreenTop")]
    pub screen_top: Option<f64>,
    #[serde(rename = "ScreenBottom")]
    pub screen_bottom: Option<f64>,
    #[serde(rename = "ScreenDepthUnits")]
    pub screen_depth_units: Option<String>,
    #[serde(rename = "ScreenMaterial")]
    pub screen_material: Option<String>,
    #[serde(rename = "CasingMaterial")]
    pub casing_material: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lithology {
    #[serde(rename = "PointID")]
    pub point_id: String,
    #[serde(rename = "LithologyCode")]
    pub lithology_code: Option<String>,
    #[serde(rename = "TERM")]
    pub term: Option<String>,
    #[serde(rename = "StratSource")]
    pub strat_source: Option<String>,
    #[serde(rename = "StratTop")]
    pub strat_top: Option<f64>,
    #[serde(rename = "StratTopUnit")]
    pub strat_top_unit: Option<String>,
    #[serde(rename = "StratBottom")]
    pub strat_bottom: Option<f64>,
    #[serde(rename = "StratBottomUnit")]
    pub strat_bottom_unit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Manual,
    Pressure,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Manual => "manual",
            Provenance::Pressure => "pressure",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "provenance", content = "record", rename_all = "lowercase")]
pub enum Reading {
    Manual(ManualWaterLevel),
    Pressure(ContinuousWaterLevel),
}

impl Reading {
    pub fn provenance(&self) -> Provenance {
        match self {
            Reading::Manual(_) => Provenance::Manual,
            Reading::Pressure(_) => Provenance::Pressure,
        }
    }

    pub fn point_id(&self) -> &str {
        match self {
            Reading::Manual(record) => &record.point_id,
            Reading::Pressure(record) => &record.point_id,
        }
    }

    pub fn depth_to_water_bgs(&self) -> Option<f64> {
        match self {
            Reading::Manual(record) => record.depth_to_water_bgs,
            Reading::Pressure(record) => record.depth_to_water_bgs,
        }
    }
}

/// A reading that survived reconciliation, keyed by its calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalEntry {
    pub measured_on: NaiveDate,
    #[serde(flatten)]
    pub reading: Reading,
}

impl CanonicalEntry {
    pub fn provenance(&self) -> Provenance {
        self.reading.provenance()
    }
}

/// Date-ordered water-level series for one point. Only the reconciler builds
/// one, so entries are always sorted ascending by `measured_on`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalSeries {
    entries: Vec<CanonicalEntry>,
}

impl CanonicalSeries {
    pub(crate) fn from_sorted(entries: Vec<CanonicalEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CanonicalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<CanonicalEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a CanonicalSeries {
    type Item = &'a CanonicalEntry;
    type IntoIter = std::slice::Iter<'a, CanonicalEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "t" | "yes" | "y" => Ok(Some(true)),
        "0" | "false" | "f" | "no" | "n" => Ok(Some(false)),
        other => Err(D::Error::custom(format!("invalid flag value '{other}'"))),
    }
}
