use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDateTime};
use encoding_rs::UTF_8;
use log::{debug, info, warn};

use crate::{
    analysis::{AnalysisOptions, SalesAnalyzer},
    cli::{AnalyzeArgs, OutputFormat},
    data::parse_timestamp,
    dataset::Dataset,
    detect_mapping, io_utils, load_inputs,
    mapping::FieldMapping,
    report::generate_report,
    settings::Settings,
};

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let dataset = load_inputs(&args.input)?;
    let settings = args
        .settings
        .as_deref()
        .map(Settings::load)
        .transpose()?;

    let mapping = resolve_mapping(&dataset, settings.as_ref(), &args.assignments)?;
    let options = AnalysisOptions {
        now: resolve_now(args.as_of.as_deref())?,
        language: args
            .language
            .or(settings.as_ref().map(|s| s.language))
            .unwrap_or_default(),
        estimated_margin: args.estimate_margin,
        max_insights: args.max_insights,
    };
    debug!("Analysis options: {options:?}");

    let analyzer = SalesAnalyzer::new(&dataset, &mapping, options);
    let result = analyzer.analyze_all();
    let report = generate_report(&result, analyzer.options());

    match args.format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&result).context("Serializing analysis result")?;
            println!("{json}");
        }
    }

    let encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?.unwrap_or(UTF_8);
    if let Some(path) = &args.report {
        io_utils::write_text(path, &report, encoding)
            .with_context(|| format!("Writing report to {path:?}"))?;
        info!("Report written to {path:?}");
    }
    if let Some(path) = &args.export {
        let mut writer = io_utils::open_csv_writer(Some(path), io_utils::DEFAULT_CSV_DELIMITER, encoding)?;
        analyzer
            .normalized_dataset()
            .write_csv(&mut writer)
            .with_context(|| format!("Exporting dataset to {path:?}"))?;
        info!(
            "Exported {} row(s) to {:?}",
            analyzer.normalized_dataset().row_count(),
            path
        );
    }
    Ok(())
}

/// Settings mapping (or auto-detection), then `field=column` overrides on top.
fn resolve_mapping(
    dataset: &Dataset,
    settings: Option<&Settings>,
    assignments: &[String],
) -> Result<FieldMapping> {
    let mut mapping = match settings {
        Some(settings) => {
            let retained = settings.column_mapping.retain_existing(dataset);
            let dropped = settings.column_mapping.iter().count() - retained.iter().count();
            if dropped > 0 {
                warn!("Ignoring {dropped} saved mapping(s) naming columns absent from the input");
            }
            retained
        }
        None => detect_mapping(dataset),
    };
    for assignment in assignments {
        mapping
            .apply_assignment(assignment)
            .with_context(|| format!("Applying mapping override '{assignment}'"))?;
    }
    if let Some((field, column)) = mapping.iter().find(|(_, column)| !dataset.has_column(column)) {
        return Err(anyhow!(
            "Column '{column}' mapped to {field} is not present in the input"
        ));
    }
    Ok(mapping)
}

fn resolve_now(as_of: Option<&str>) -> Result<NaiveDateTime> {
    match as_of {
        Some(value) => {
            parse_timestamp(value).ok_or_else(|| anyhow!("Invalid --as-of timestamp '{value}'"))
        }
        None => Ok(Local::now().naive_local()),
    }
}
