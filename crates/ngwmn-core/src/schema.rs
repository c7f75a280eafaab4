use std::fmt;

use once_cell::sync::Lazy;

/// Version tag for the positional row contracts below. Bump whenever a column
/// is added, removed or reordered.
pub const ROW_SCHEMA_VERSION: &str = "ngwmn_rows_v1";

pub const POINT_ID_COLUMN: &str = "PointID";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceDomain {
    ManualWaterLevels,
    ContinuousWaterLevels,
    WellConstruction,
    Lithology,
}

impl SourceDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceDomain::ManualWaterLevels => "manual_water_levels",
            SourceDomain::ContinuousWaterLevels => "continuous_water_levels",
            SourceDomain::WellConstruction => "well_construction",
            SourceDomain::Lithology => "lithology",
        }
    }
}

impl fmt::Display for SourceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage kind of a source column. The Postgres source casts every column to
/// the matching SQL type so decoding does not depend on the view definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Float,
    Integer,
    Date,
    Timestamp,
    Uuid,
    Flag,
}

impl ColumnKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Float => "float8",
            ColumnKind::Integer => "int8",
            ColumnKind::Date => "date",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::Uuid => "uuid",
            ColumnKind::Flag => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

pub const MANUAL_WATER_LEVEL_COLUMNS: [Column; 6] = [
    col("PointID", ColumnKind::Text),
    col("DateMeasured", ColumnKind::Date),
    col("DepthToWaterBGS", ColumnKind::Float),
    col("WaterLevelUnits", ColumnKind::Text),
    col("MeasuringMethod", ColumnKind::Text),
    col("WaterLevelAccuracy", ColumnKind::Text),
];

pub const CONTINUOUS_WATER_LEVEL_COLUMNS: [Column; 19] = [
    col("GlobalID", ColumnKind::Uuid),
    col("OBJECTID", ColumnKind::Integer),
    col("WellID", ColumnKind::Uuid),
    col("PointID", ColumnKind::Text),
    col("DateMeasured", ColumnKind::Timestamp),
    col("TemperatureWater", ColumnKind::Float),
    col("WaterHead", ColumnKind::Float),
    col("WaterHeadAdjusted", ColumnKind::Float),
    col("DepthToWaterBGS", ColumnKind::Float),
    col("MeasurementMethod", ColumnKind::Text),
    col("DataSource", ColumnKind::Text),
    col("MeasuringAgency", ColumnKind::Text),
    col("QCed", ColumnKind::Flag),
    col("Notes", ColumnKind::Text),
    col("Created", ColumnKind::Timestamp),
    col("Updated", ColumnKind::Timestamp),
    col("ProcessedBy", ColumnKind::Text),
    col("CheckedBy", ColumnKind::Text),
    col("CONDDL (mS/cm)", ColumnKind::Float),
];

pub const WELL_CONSTRUCTION_COLUMNS: [Column; 9] = [
    col("PointID", ColumnKind::Text),
    col("CasingTop", ColumnKind::Float),
    col("CasingBottom", ColumnKind::Float),
    col("CasingDepthUnits", ColumnKind::Text),
    col("ScreenTop", ColumnKind::Float),
    col("ScreenBottom", ColumnKind::Float),
    col("ScreenDepthUnits", ColumnKind::Text),
    col("ScreenMaterial", ColumnKind::Text),
    col("CasingMaterial", ColumnKind::Text),
];

pub const LITHOLOGY_COLUMNS: [Column; 8] = [
    col("PointID", ColumnKind::Text),
    col("LithologyCode", ColumnKind::Text),
    col("TERM", ColumnKind::Text),
    col("StratSource", ColumnKind::Text),
    col("StratTop", ColumnKind::Float),
    col("StratTopUnit", ColumnKind::Text),
    col("StratBottom", ColumnKind::Float),
    col("StratBottomUnit", ColumnKind::Text),
];

/// Leaf order of a `WaterLevel` child, shared by the manual and pressure
/// derivations.
pub const WATER_LEVEL_LEAVES: [&str; 10] = [
    "PointID",
    "DepthFromLandSurfaceData",
    "WaterLevelUnits",
    "MeasuringMethod",
    "MeasurementMonth",
    "MeasurementDay",
    "MeasurementYear",
    "MeasurementTime",
    "MeasurementTimezone",
    "WaterLevelAccuracy",
];

pub const CASING_LEAVES: [&str; 9] = [
    "PointID",
    "CasingTop",
    "CasingBottom",
    "CasingDepthUnits",
    "ScreenTop",
    "ScreenBottom",
    "ScreenBottomUnits",
    "ScreenIntervalMaterial",
    "CasingIntervalMaterial",
];

pub const LITHOLOGY_LEAVES: [&str; 8] = [
    "PointID",
    "LithologyCode",
    "TERM",
    "StratSource",
    "StratTop",
    "StratTopUnit",
    "StratBottom",
    "StratBottomUnit",
];

#[derive(Debug, Clone)]
pub struct RowSchema {
    pub domain: SourceDomain,
    pub version: &'static str,
    pub default_relation: &'static str,
    pub columns: &'static [Column],
}

impl RowSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }
}

static ROW_SCHEMAS: Lazy<Vec<RowSchema>> = Lazy::new(|| {
    vec![
        RowSchema {
            domain: SourceDomain::ManualWaterLevels,
            version: ROW_SCHEMA_VERSION,
            default_relation: "NGWMN_WaterLevels",
            columns: &MANUAL_WATER_LEVEL_COLUMNS,
        },
        RowSchema {
            domain: SourceDomain::ContinuousWaterLevels,
            version: ROW_SCHEMA_VERSION,
            default_relation: "WaterLevelsContinuous_Pressure_Daily",
            columns: &CONTINUOUS_WATER_LEVEL_COLUMNS,
        },
        RowSchema {
            domain: SourceDomain::WellConstruction,
            version: ROW_SCHEMA_VERSION,
            default_relation: "NGWMN_WellConstruction",
            columns: &WELL_CONSTRUCTION_COLUMNS,
        },
        RowSchema {
            domain: SourceDomain::Lithology,
            version: ROW_SCHEMA_VERSION,
            default_relation: "NGWMN_Lithology",
            columns: &LITHOLOGY_COLUMNS,
        },
    ]
});

pub fn all_row_schemas() -> &'static [RowSchema] {
    ROW_SCHEMAS.as_slice()
}

/// `ROW_SCHEMAS` is declared in `SourceDomain` discriminant order.
pub fn row_schema(domain: SourceDomain) -> &'static RowSchema {
    &ROW_SCHEMAS[domain as usize]
}
