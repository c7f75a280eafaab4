use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::debug;

use super::RowSource;
use crate::db::DbPool;
use crate::errors::SourceError;
use crate::model::{ContinuousWaterLevel, Lithology, ManualWaterLevel, WellConstruction};
use crate::schema::{row_schema, SourceDomain, POINT_ID_COLUMN};

/// Table or view name per domain, optionally schema-qualified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Relations {
    pub manual_water_levels: String,
    pub continuous_water_levels: String,
    pub well_construction: String,
    pub lithology: String,
}

impl Default for Relations {
    fn default() -> Self {
        let relation = |domain: SourceDomain| row_schema(domain).default_relation.to_string();
        Self {
            manual_water_levels: relation(SourceDomain::ManualWaterLevels),
            continuous_water_levels: relation(SourceDomain::ContinuousWaterLevels),
            well_construction: relation(SourceDomain::WellConstruction),
            lithology: relation(SourceDomain::Lithology),
        }
    }
}

impl Relations {
    fn relation_for(&self, domain: SourceDomain) -> &str {
        match domain {
            SourceDomain::ManualWaterLevels => &self.manual_water_levels,
            SourceDomain::ContinuousWaterLevels => &self.continuous_water_levels,
            SourceDomain::WellConstruction => &self.well_construction,
            SourceDomain::Lithology => &self.lithology,
        }
    }

    /// Reject names that cannot be safely quoted as identifiers.
    pub fn validate(&self) -> Result<(), SourceError> {
        for relation in [
            &self.manual_water_levels,
            &self.continuous_water_levels,
            &self.well_construction,
            &self.lithology,
        ] {
            quote_relation(relation)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgRowSource {
    pool: DbPool,
    relations: Relations,
    require_qc: bool,
}

impl PgRowSource {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            relations: Relations::default(),
            require_qc: true,
        }
    }

    pub fn with_relations(mut self, relations: Relations) -> Result<Self, SourceError> {
        relations.validate()?;
        self.relations = relations;
        Ok(self)
    }

    pub fn require_qc(mut self, require_qc: bool) -> Self {
        self.require_qc = require_qc;
        self
    }

    async fn fetch<T, F>(
        &self,
        domain: SourceDomain,
        point_id: &str,
        decode: F,
    ) -> Result<Vec<T>, SourceError>
    where
        F: Fn(&PgRow) -> Result<T, sqlx::Error>,
    {
        let qc_only = domain == SourceDomain::ContinuousWaterLevels && self.require_qc;
        let sql = select_sql(domain, self.relations.relation_for(domain), qc_only)?;
        let query_error = |source: sqlx::Error| SourceError::Query { domain, source };

        let rows = sqlx::query(&sql)
            .bind(point_id)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        debug!(domain = %domain, point_id, rows = rows.len(), "fetched rows");

        rows.iter()
            .map(|row| decode(row).map_err(query_error))
            .collect()
    }
}

#[async_trait]
impl RowSource for PgRowSource {
    async fn manual_water_levels(
        &self,
        point_id: &str,
    ) -> Result<Vec<ManualWaterLevel>, SourceError> {
        self.fetch(SourceDomain::ManualWaterLevels, point_id, |row| {
            Ok(ManualWaterLevel {
                point_id: row.try_get("PointID")?,
                date_measured: row.try_get("DateMeasured")?,
                depth_to_water_bgs: row.try_get("DepthToWaterBGS")?,
                water_level_units: row.try_get("WaterLevelUnits")?,
                measuring_method: row.try_get("MeasuringMethod")?,
                accuracy: row.try_get("WaterLevelAccuracy")?,
            })
        })
        .await
    }

    async fn continuous_water_levels(
        &self,
        point_id: &str,
    ) -> Result<Vec<ContinuousWaterLevel>, SourceError> {
        self.fetch(SourceDomain::ContinuousWaterLevels, point_id, |row| {
            Ok(ContinuousWaterLevel {
                global_id: row.try_get("GlobalID")?,
                object_id: row.try_get("OBJECTID")?,
                well_id: row.try_get("WellID")?,
                point_id: row.try_get("PointID")?,
                date_measured: row.try_get("DateMeasured")?,
                temperature_water: row.try_get("TemperatureWater")?,
                water_head: row.try_get("WaterHead")?,
                water_head_adjusted: row.try_get("WaterHeadAdjusted")?,
                depth_to_water_bgs: row.try_get("DepthToWaterBGS")?,
                measurement_method: row.try_get("MeasurementMethod")?,
                data_source: row.try_get("DataSource")?,
                measuring_agency: row.try_get("MeasuringAgency")?,
                qced: row.try_get("QCed")?,
                notes: row.try_get("Notes")?,
                created: row.try_get("Created")?,
                updated: row.try_get("Updated")?,
                processed_by: row.try_get("ProcessedBy")?,
                checked_by: row.try_get("CheckedBy")?,
                conductivity_ms_cm: row.try_get("CONDDL (mS/cm)")?,
            })
        })
        .await
    }

    async fn well_construction(
        &self,
        point_id: &str,
    ) -> Result<Vec<WellConstruction>, SourceError> {
        self.fetch(SourceDomain::WellConstruction, point_id, |row| {
            Ok(WellConstruction {
                point_id: row.try_get("PointID")?,
                casing_top: row.try_get("CasingTop")?,
                casing_bottom: row.try_get("CasingBottom")?,
                casing_depth_units: row.try_get("CasingDepthUnits")?,
                screen_top: row.try_get("ScreenTop")?,
                screen_bottom: row.try_get("ScreenBottom")?,
                screen_depth_units: row.try_get("ScreenDepthUnits")?,
                screen_material: row.try_get("ScreenMaterial")?,
                casing_material: row.try_get("CasingMaterial")?,
            })
        })
        .await
    }

    async fn lithology(&self, point_id: &str) -> Result<Vec<Lithology>, SourceError> {
        self.fetch(SourceDomain::Lithology, point_id, |row| {
            Ok(Lithology {
                point_id: row.try_get("PointID")?,
                lithology_code: row.try_get("LithologyCode")?,
                term: row.try_get("TERM")?,
                strat_source: row.try_get("StratSource")?,
                strat_top: row.try_get("StratTop")?,
                strat_top_unit: row.try_get("StratTopUnit")?,
                strat_bottom: row.try_get("StratBottom")?,
                strat_bottom_unit: row.try_get("StratBottomUnit")?,
            })
        })
        .await
    }
}

fn quote_relation(relation: &str) -> Result<String, SourceError> {
    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    };
    if !relation.split('.').all(valid_part) {
        return Err(SourceError::InvalidRelation(relation.to_string()));
    }
    Ok(relation
        .split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join("."))
}

/// Every column is cast to its declared kind so decoding does not depend on
/// how the view types it. The point id is always bound as `$1`.
fn select_sql(
    domain: SourceDomain,
    relation: &str,
    qc_only: bool,
) -> Result<String, SourceError> {
    let schema = row_schema(domain);
    let columns = schema
        .columns
        .iter()
        .map(|column| {
            format!(
                "\"{name}\"::{kind} AS \"{name}\"",
                name = column.name,
                kind = column.kind.sql_type()
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!(
        "SELECT {columns} FROM {relation} WHERE \"{POINT_ID_COLUMN}\" = $1",
        relation = quote_relation(relation)?
    );
    if qc_only {
        sql.push_str(" AND \"QCed\"::boolean IS TRUE");
    }
    if matches!(
        domain,
        SourceDomain::ManualWaterLevels | SourceDomain::ContinuousWaterLevels
    ) {
        sql.push_str(" ORDER BY \"DateMeasured\"");
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_schema_qualified_relations() {
        assert_eq!(
            quote_relation("dbo.view_NGWMN_Lithology").unwrap(),
            "\"dbo\".\"view_NGWMN_Lithology\""
        );
        assert!(matches!(
            quote_relation("NGWMN_Lithology; DROP TABLE x"),
            Err(SourceError::InvalidRelation(_))
        ));
        assert!(quote_relation("dbo.").is_err());
    }

    #[test]
    fn continuous_query_filters_on_qc() {
        let sql = select_sql(
            SourceDomain::ContinuousWaterLevels,
            "WaterLevelsContinuous_Pressure_Daily",
            true,
        )
        .unwrap();
        assert!(sql.contains("\"CONDDL (mS/cm)\"::float8 AS \"CONDDL (mS/cm)\""));
        assert!(sql.contains("WHERE \"PointID\" = $1 AND \"QCed\"::boolean IS TRUE"));
        assert!(sql.ends_with("ORDER BY \"DateMeasured\""));

        let sql = select_sql(SourceDomain::Lithology, "NGWMN_Lithology", false).unwrap();
        assert!(!sql.contains("QCed"));
        assert!(!sql.contains("ORDER BY"));
    }
}
