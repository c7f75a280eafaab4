use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use ngwmn_core::{
    export, export_water_levels, water_level_series, ContinuousWaterLevel, CsvRowSource,
    ExportError, ExportKind, ManualWaterLevel, MemoryRowSource, Provenance, SourceDomain,
    SourceError,
};

const SCENARIO_XML: &str = "<WaterLevels>\
<WaterLevel>\
<PointID>NM-0001</PointID>\
<DepthFromLandSurfaceData>10.00</DepthFromLandSurfaceData>\
<WaterLevelUnits>ft bgs</WaterLevelUnits>\
<MeasuringMethod>Steel tape</MeasuringMethod>\
<MeasurementMonth>1</MeasurementMonth>\
<MeasurementDay>1</MeasurementDay>\
<MeasurementYear>2024</MeasurementYear>\
<MeasurementTime>0:00:00</MeasurementTime>\
<MeasurementTimezone>MST</MeasurementTimezone>\
<WaterLevelAccuracy>0.01 ft</WaterLevelAccuracy>\
</WaterLevel>\
<WaterLevel>\
<PointID>NM-0001</PointID>\
<DepthFromLandSurfaceData>9.50</DepthFromLandSurfaceData>\
<WaterLevelUnits>ft bgs</WaterLevelUnits>\
<MeasuringMethod>Pressure Transducer</MeasuringMethod>\
<MeasurementMonth>1</MeasurementMonth>\
<MeasurementDay>2</MeasurementDay>\
<MeasurementYear>2024</MeasurementYear>\
<MeasurementTime>0:00:00</MeasurementTime>\
<MeasurementTimezone>MST</MeasurementTimezone>\
<WaterLevelAccuracy>0.02 ft</WaterLevelAccuracy>\
</WaterLevel>\
</WaterLevels>";

fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn scenario_source() -> MemoryRowSource {
    let mut manual = ManualWaterLevel::new("NM-0001", date(2024, 1, 1), 10.0);
    manual.water_level_units = Some("ft bgs".to_string());
    manual.measuring_method = Some("Steel tape".to_string());
    manual.accuracy = Some("0.01 ft".to_string());

    let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).expect("valid time");
    MemoryRowSource::new()
        .with_manual([manual])
        .with_continuous([
            ContinuousWaterLevel::new("NM-0001", midnight(date(2024, 1, 1)), 12.0).qc_approved(),
            ContinuousWaterLevel::new("NM-0001", midnight(date(2024, 1, 2)), 9.5).qc_approved(),
            ContinuousWaterLevel::new("NM-0002", midnight(date(2024, 1, 2)), 1.0).qc_approved(),
        ])
}

#[tokio::test]
async fn reconciled_scenario_matches_expected_document() -> Result<()> {
    let source = scenario_source();

    let series = water_level_series(&source, "NM-0001").await?;
    let summary: Vec<_> = series
        .iter()
        .map(|e| (e.provenance(), e.measured_on, e.reading.depth_to_water_bgs()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Provenance::Manual, date(2024, 1, 1), Some(10.0)),
            (Provenance::Pressure, date(2024, 1, 2), Some(9.5)),
        ]
    );

    let document = export_water_levels(&source, "NM-0001").await?;
    assert_eq!(document.len(), 2);
    assert_eq!(document.children()[1].leaf("WaterLevelAccuracy"), Some("0.02 ft"));
    assert_eq!(document.to_xml(), SCENARIO_XML);

    Ok(())
}

#[tokio::test]
async fn csv_rows_produce_the_same_document() -> Result<()> {
    let source = CsvRowSource::new(fixture_dir(""));

    let xml = export(&source, ExportKind::WaterLevels, "NM-0001").await?;

    assert_eq!(xml, SCENARIO_XML);
    Ok(())
}

#[tokio::test]
async fn unreviewed_pressure_rows_are_included_when_qc_is_relaxed() -> Result<()> {
    let source = CsvRowSource::new(fixture_dir("")).require_qc(false);

    let series = water_level_series(&source, "NM-0001").await?;

    let days: Vec<_> = series.iter().map(|e| e.measured_on).collect();
    assert_eq!(days, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
    let third = &series.entries()[2];
    assert_eq!(third.provenance(), Provenance::Pressure);
    assert_eq!(third.reading.depth_to_water_bgs(), Some(8.0));
    Ok(())
}

#[tokio::test]
async fn single_source_exports_are_sorted() -> Result<()> {
    let source = CsvRowSource::new(fixture_dir(""));

    let manual = export(&source, ExportKind::ManualWaterLevels, "NM-0002").await?;
    let december = manual
        .find("<MeasurementMonth>12</MeasurementMonth>")
        .expect("december reading");
    let january = manual
        .find("<MeasurementMonth>1</MeasurementMonth>")
        .expect("january reading");
    assert!(december < january);
    assert_eq!(manual.matches("<WaterLevel>").count(), 2);

    let continuous = export(&source, ExportKind::ContinuousWaterLevels, "NM-0002").await?;
    assert_eq!(continuous.matches("<WaterLevel>").count(), 1);
    assert!(continuous.contains("<DepthFromLandSurfaceData>31.00</DepthFromLandSurfaceData>"));
    Ok(())
}

#[tokio::test]
async fn well_construction_export_fills_missing_material() -> Result<()> {
    let source = CsvRowSource::new(fixture_dir(""));

    let xml = export(&source, ExportKind::WellConstruction, "NM-0001").await?;

    assert_eq!(
        xml,
        "<Casings><Casing>\
         <PointID>NM-0001</PointID>\
         <CasingTop>0.0</CasingTop>\
         <CasingBottom>150.0</CasingBottom>\
         <CasingDepthUnits>ft</CasingDepthUnits>\
         <ScreenTop>120.0</ScreenTop>\
         <ScreenBottom>145.5</ScreenBottom>\
         <ScreenBottomUnits>ft</ScreenBottomUnits>\
         <ScreenIntervalMaterial>Unknown</ScreenIntervalMaterial>\
         <CasingIntervalMaterial>PVC</CasingIntervalMaterial>\
         </Casing></Casings>"
    );
    Ok(())
}

#[tokio::test]
async fn lithology_export_keeps_row_order() -> Result<()> {
    let source = CsvRowSource::new(fixture_dir(""));

    let xml = export(&source, ExportKind::Lithology, "NM-0001").await?;

    assert!(xml.starts_with("<Lithologies><Lithology><PointID>NM-0001</PointID><LithologyCode>SAND"));
    assert!(xml.contains("<TERM>Clay &amp; silt</TERM>"));
    assert!(xml.contains("<StratBottom>40.0</StratBottom>"));
    assert_eq!(xml.matches("<Lithology>").count(), 2);
    Ok(())
}

#[tokio::test]
async fn unknown_point_yields_empty_document() -> Result<()> {
    let source = CsvRowSource::new(fixture_dir(""));

    let xml = export(&source, ExportKind::Lithology, "NM-9999").await?;

    assert_eq!(xml, "<Lithologies />");
    Ok(())
}

#[tokio::test]
async fn mismatched_header_fails_the_export() {
    let source = CsvRowSource::new(fixture_dir("bad_header"));

    let err = export(&source, ExportKind::Lithology, "NM-0001")
        .await
        .unwrap_err();

    match err {
        ExportError::Source {
            domain,
            point_id,
            source: SourceError::SchemaMismatch { found, .. },
        } => {
            assert_eq!(domain, SourceDomain::Lithology);
            assert_eq!(point_id, "NM-0001");
            assert_eq!(found[1], "Code");
        }
        other => panic!("expected schema mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_file_is_reported_with_its_path() {
    let source = CsvRowSource::new(fixture_dir("bad_header"));

    let err = export(&source, ExportKind::WellConstruction, "NM-0001")
        .await
        .unwrap_err();

    match err {
        ExportError::Source {
            source: SourceError::Io { path, .. },
            ..
        } => assert!(path.ends_with("well_construction.csv")),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_record_aborts_the_whole_document() {
    let mut broken = ManualWaterLevel::new("NM-0001", date(2024, 1, 3), 1.0);
    broken.date_measured = None;
    let source = scenario_source().with_manual([broken]);

    let err = export(&source, ExportKind::WaterLevels, "NM-0001")
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Record(_)));
}
