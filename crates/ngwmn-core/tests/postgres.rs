use std::env;

use anyhow::Result;
use ngwmn_core::{db, export, ExportKind, PgRowSource, Relations};
use uuid::Uuid;

const SETUP: &[&str] = &[
    r#"CREATE TABLE {schema}."manual_levels" (
        "PointID" text NOT NULL,
        "DateMeasured" date,
        "DepthToWaterBGS" numeric,
        "WaterLevelUnits" text,
        "MeasuringMethod" text,
        "WaterLevelAccuracy" text
    )"#,
    r#"CREATE TABLE {schema}."pressure_daily" (
        "GlobalID" uuid,
        "OBJECTID" integer,
        "WellID" uuid,
        "PointID" text NOT NULL,
        "DateMeasured" timestamp,
        "TemperatureWater" double precision,
        "WaterHead" double precision,
        "WaterHeadAdjusted" double precision,
        "DepthToWaterBGS" double precision,
        "MeasurementMethod" text,
        "DataSource" text,
        "MeasuringAgency" text,
        "QCed" integer,
        "Notes" text,
        "Created" timestamp,
        "Updated" timestamp,
        "ProcessedBy" text,
        "CheckedBy" text,
        "CONDDL (mS/cm)" double precision
    )"#,
    r#"CREATE TABLE {schema}."construction" (
        "PointID" text NOT NULL,
        "CasingTop" numeric,
        "CasingBottom" numeric,
        "CasingDepthUnits" text,
        "ScreenTop" numeric,
        "ScreenBottom" numeric,
        "ScreenDepthUnits" text,
        "ScreenMaterial" text,
        "CasingMaterial" text
    )"#,
    r#"CREATE TABLE {schema}."lithology" (
        "PointID" text NOT NULL,
        "LithologyCode" text,
        "TERM" text,
        "StratSource" text,
        "StratTop" numeric,
        "StratTopUnit" text,
        "StratBottom" numeric,
        "StratBottomUnit" text
    )"#,
    r#"INSERT INTO {schema}."manual_levels" VALUES
        ('NM-0001', '2024-01-01', 10.00, 'ft bgs', 'Steel tape', '0.01 ft')"#,
    r#"INSERT INTO {schema}."pressure_daily" ("PointID", "DateMeasured", "DepthToWaterBGS", "QCed") VALUES
        ('NM-0001', '2024-01-01 00:00:00', 12.0, 1),
        ('NM-0001', '2024-01-02 00:00:00', 9.5, 1),
        ('NM-0001', '2024-01-03 00:00:00', 8.0, 0)"#,
    r#"INSERT INTO {schema}."construction" VALUES
        ('NM-0001', 0, 150, 'ft', 120, 145.5, 'ft', NULL, 'PVC')"#,
];

#[tokio::test]
async fn postgres_source_matches_csv_behaviour_when_database_available() -> Result<()> {
    let database_url = match env::var("NGWMN_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping postgres test because NGWMN_TEST_DATABASE_URL is not set");
            return Ok(());
        }
    };

    let pool = db::connect(&database_url).await?;
    let schema = format!("ngwmn_test_{}", Uuid::new_v4().simple());
    sqlx::query(&format!("CREATE SCHEMA \"{schema}\""))
        .execute(&pool)
        .await?;

    let quoted = format!("\"{schema}\"");
    for statement in SETUP {
        sqlx::query(&statement.replace("{schema}", &quoted))
            .execute(&pool)
            .await?;
    }

    let source = PgRowSource::new(pool.clone()).with_relations(Relations {
        manual_water_levels: format!("{schema}.manual_levels"),
        continuous_water_levels: format!("{schema}.pressure_daily"),
        well_construction: format!("{schema}.construction"),
        lithology: format!("{schema}.lithology"),
    })?;

    let water_levels = export(&source, ExportKind::WaterLevels, "NM-0001").await;
    let construction = export(&source, ExportKind::WellConstruction, "NM-0001").await;
    let lithology = export(&source, ExportKind::Lithology, "NM-0001").await;

    sqlx::query(&format!("DROP SCHEMA \"{schema}\" CASCADE"))
        .execute(&pool)
        .await?;

    let water_levels = water_levels?;
    assert_eq!(water_levels.matches("<WaterLevel>").count(), 2);
    assert!(water_levels.contains("<DepthFromLandSurfaceData>10.00</DepthFromLandSurfaceData>"));
    assert!(water_levels.contains("<WaterLevelAccuracy>0.02 ft</WaterLevelAccuracy>"));
    assert!(!water_levels.contains("<DepthFromLandSurfaceData>8.00"));

    let construction = construction?;
    assert!(construction.contains("<CasingBottom>150.0</CasingBottom>"));
    assert!(construction.contains("<ScreenIntervalMaterial>Unknown</ScreenIntervalMaterial>"));

    assert_eq!(lithology?, "<Lithologies />");

    Ok(())
}
