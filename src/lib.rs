pub mod analysis;
mod analyze_cmd;
pub mod cli;
pub mod data;
pub mod dataset;
pub mod format;
pub mod io_utils;
pub mod locale;
pub mod mapping;
mod preview;
pub mod report;
pub mod schema;
pub mod settings;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputArgs},
    mapping::suggest_column_kinds,
    settings::Settings,
    table::Table,
};

pub use analysis::{AnalysisOptions, AnalysisResult, analyze, analyze_with};
pub use dataset::Dataset;
pub use mapping::{FieldMapping, SemanticField};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sales_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Proposes a column for every semantic field the headers (or date-like contents) reveal.
pub fn detect_mapping(dataset: &Dataset) -> FieldMapping {
    mapping::default_mapper().detect(dataset)
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Detect(args) => handle_detect(&args),
        Commands::Types(args) => handle_types(&args),
        Commands::Analyze(args) => analyze_cmd::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}

/// Loads every input and merges them by header when more than one is given.
pub(crate) fn load_inputs(args: &InputArgs) -> Result<Dataset> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mut tables = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let delimiter = io_utils::resolve_input_delimiter(path, args.delimiter);
        info!(
            "Reading '{}' with delimiter '{}'",
            path.display(),
            printable_delimiter(delimiter)
        );
        let table = Dataset::from_csv_path(path, delimiter, encoding)
            .with_context(|| format!("Loading {path:?}"))?;
        tables.push(table);
    }
    if tables.len() == 1 {
        return Ok(tables.remove(0));
    }
    let merged = Dataset::merge(tables)?;
    info!(
        "Merged {} input(s) into {} row(s) across {} column(s)",
        args.inputs.len(),
        merged.row_count(),
        merged.column_count()
    );
    Ok(merged)
}

fn handle_detect(args: &cli::DetectArgs) -> Result<()> {
    let dataset = load_inputs(&args.input)?;
    let mapping = detect_mapping(&dataset);
    let language = args.language.unwrap_or_default();
    let texts = language.texts();

    let mut table = Table::new([texts.field_header, "Key", texts.column_header]);
    for field in SemanticField::ALL {
        let column = mapping.get(field).unwrap_or("-");
        table.push_row([language.field_label(field).to_string(), field.key(), column.to_string()]);
    }
    table.print();

    if let Some(path) = &args.save_settings {
        let settings = Settings::new(mapping, language, args.theme.unwrap_or_default());
        settings
            .save(path, Local::now().naive_local())
            .with_context(|| format!("Saving settings to {path:?}"))?;
    }
    Ok(())
}

fn handle_types(args: &cli::TypesArgs) -> Result<()> {
    let dataset = load_inputs(&args.input)?;
    let mut table = Table::new(["Column", "Type", "Kind", "Missing", "Distinct"])
        .align_right(3)
        .align_right(4);
    for (column, (_, kind)) in dataset.columns().iter().zip(suggest_column_kinds(&dataset)) {
        debug!("Column '{}' classified as {kind}", column.name);
        table.push_row([
            column.name.clone(),
            column.datatype.to_string(),
            kind.to_string(),
            format::format_count(column.missing_count()),
            format::format_count(column.distinct_count()),
        ]);
    }
    table.print();
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
