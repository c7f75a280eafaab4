use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use ngwmn_core::{
    db, export, water_level_series, CanonicalSeries, CsvRowSource, ExportConfig, ExportKind,
    PgRowSource, Reading, Relations, RowSource, SourceConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "NGWMN interchange document exporter", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read rows from CSV files in this directory
    #[arg(long, global = true, conflicts_with = "database_url")]
    csv_dir: Option<PathBuf>,

    /// Read rows from Postgres
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manual and pressure readings reconciled into one WaterLevels document
    WaterLevels(ExportArgs),
    /// Manual readings only
    ManualWaterLevels(ExportArgs),
    /// QC-approved pressure readings only
    ContinuousWaterLevels(ExportArgs),
    /// Casings document
    WellConstruction(ExportArgs),
    /// Lithologies document
    Lithology(ExportArgs),
    /// Show the reconciled water-level series
    Series(SeriesArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    point_id: String,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SeriesArgs {
    point_id: String,

    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExportConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ExportConfig::default(),
    };
    let source = open_source(&cli, &config).await?;

    let (kind, args) = match cli.command {
        Command::WaterLevels(args) => (ExportKind::WaterLevels, args),
        Command::ManualWaterLevels(args) => (ExportKind::ManualWaterLevels, args),
        Command::ContinuousWaterLevels(args) => (ExportKind::ContinuousWaterLevels, args),
        Command::WellConstruction(args) => (ExportKind::WellConstruction, args),
        Command::Lithology(args) => (ExportKind::Lithology, args),
        Command::Series(args) => return show_series(source.as_ref(), &args).await,
    };

    let xml = export(source.as_ref(), kind, &args.point_id)
        .await
        .with_context(|| format!("{kind} export failed for point {}", args.point_id))?;
    write_document(&xml, args.output.as_deref())
}

async fn open_source(cli: &Cli, config: &ExportConfig) -> Result<Box<dyn RowSource>> {
    if let Some(directory) = &cli.csv_dir {
        let files = match &config.source {
            Some(SourceConfig::Csv { files, .. }) => files.clone(),
            _ => Default::default(),
        };
        return Ok(csv_source(directory, files, config.require_qc));
    }

    if let Some(url) = &cli.database_url {
        let relations = match &config.source {
            Some(SourceConfig::Postgres { relations, .. }) => relations.clone(),
            _ => Relations::default(),
        };
        return pg_source(url, relations, config.require_qc).await;
    }

    match &config.source {
        Some(SourceConfig::Csv { directory, files }) => {
            Ok(csv_source(directory, files.clone(), config.require_qc))
        }
        Some(SourceConfig::Postgres {
            database_url,
            relations,
        }) => {
            let url = match database_url {
                Some(url) => url.clone(),
                None => database_url_from_env()?,
            };
            pg_source(&url, relations.clone(), config.require_qc).await
        }
        None => {
            let url = database_url_from_env()?;
            pg_source(&url, Relations::default(), config.require_qc).await
        }
    }
}

fn csv_source(
    directory: &Path,
    files: ngwmn_core::CsvFiles,
    require_qc: bool,
) -> Box<dyn RowSource> {
    info!(directory = %directory.display(), require_qc, "reading rows from CSV");
    Box::new(
        CsvRowSource::new(directory)
            .with_files(files)
            .require_qc(require_qc),
    )
}

async fn pg_source(
    database_url: &str,
    relations: Relations,
    require_qc: bool,
) -> Result<Box<dyn RowSource>> {
    let pool = db::connect(database_url).await?;
    let source = PgRowSource::new(pool)
        .with_relations(relations)
        .context("invalid relation names")?
        .require_qc(require_qc);
    info!(require_qc, "reading rows from Postgres");
    Ok(Box::new(source))
}

fn database_url_from_env() -> Result<String> {
    std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("NGWMN_DATABASE_URL"))
        .context("DATABASE_URL (or NGWMN_DATABASE_URL) must be set, or pass --csv-dir")
}

fn write_document(xml: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            emit(xml, &mut file).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = xml.len(), "document written");
        }
        None => emit(xml, &mut io::stdout().lock()).context("failed to write to stdout")?,
    }
    Ok(())
}

/// Document bytes exactly, with no trailing newline.
fn emit(xml: &str, out: &mut impl Write) -> io::Result<()> {
    out.write_all(xml.as_bytes())?;
    out.flush()
}

async fn show_series(source: &dyn RowSource, args: &SeriesArgs) -> Result<()> {
    let series = water_level_series(source, &args.point_id)
        .await
        .with_context(|| format!("failed to reconcile water levels for {}", args.point_id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else {
        println!("{}", series_table(&series));
    }
    Ok(())
}

fn series_table(series: &CanonicalSeries) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Date", "Source", "Depth (ft bgs)", "Method"]);

    for entry in series {
        let depth = entry
            .reading
            .depth_to_water_bgs()
            .map(|depth| format!("{depth:.2}"))
            .unwrap_or_default();
        let method = match &entry.reading {
            Reading::Manual(record) => record.measuring_method.clone().unwrap_or_default(),
            Reading::Pressure(record) => record.measurement_method.clone().unwrap_or_default(),
        };
        table.add_row(vec![
            entry.measured_on.to_string(),
            entry.provenance().to_string(),
            depth,
            method,
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emitted_document_has_no_trailing_newline() {
        let xml = "<Lithologies />";
        let mut out = Vec::new();

        emit(xml, &mut out).unwrap();

        assert_eq!(out, xml.as_bytes());
    }

    #[test]
    fn output_file_matches_document_bytes() {
        let path = std::env::temp_dir().join(format!("ngwmn-{}.xml", std::process::id()));
        let xml = "<Casings><Casing><PointID>NM-0001</PointID></Casing></Casings>";

        write_document(xml, Some(&path)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(written, xml);
    }
}
