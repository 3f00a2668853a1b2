use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    locale::Language,
    settings::{DEFAULT_SETTINGS_FILE, Theme},
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Map sales table columns and report KPIs, trends and insights",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect which columns hold order ids, amounts, dates, regions and other sales fields
    Detect(DetectArgs),
    /// Show each column's inferred data type and kind (numeric, date, categorical, text)
    Types(TypesArgs),
    /// Compute KPIs, distributions, the monthly trend, insights and data-quality warnings
    Analyze(AnalyzeArgs),
    /// Preview the first few rows of the input in a formatted table
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV files; several files are merged by column name ('-' reads stdin)
    #[arg(short = 'i', long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8, falling back to windows-1256)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Write the detected mapping to a settings file (.json, .yml or .yaml; defaults to sales_config.json)
    #[arg(
        long = "save-settings",
        num_args = 0..=1,
        default_missing_value = DEFAULT_SETTINGS_FILE
    )]
    pub save_settings: Option<PathBuf>,
    /// Language for field labels and the saved settings
    #[arg(long, value_enum)]
    pub language: Option<Language>,
    /// Theme stored in the saved settings
    #[arg(long, value_enum)]
    pub theme: Option<Theme>,
}

#[derive(Debug, Args)]
pub struct TypesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Settings file providing the column mapping and language instead of auto-detection
    #[arg(long)]
    pub settings: Option<PathBuf>,
    /// Override one mapping entry, e.g. `total_amount=Net Sales` (empty column clears it)
    #[arg(long = "map", action = clap::ArgAction::Append)]
    pub assignments: Vec<String>,
    /// Output format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Report and insight language
    #[arg(long, value_enum)]
    pub language: Option<Language>,
    /// Estimate profit with this flat margin (e.g. 0.2) when no profit or cost column is mapped
    #[arg(long = "estimate-margin", value_parser = parse_fraction)]
    pub estimate_margin: Option<f64>,
    /// Keep at most this many insights
    #[arg(long = "max-insights")]
    pub max_insights: Option<usize>,
    /// Processing time used for the report date and future-date checks (defaults to now)
    #[arg(long = "as-of")]
    pub as_of: Option<String>,
    /// Also write the text report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Write the normalized dataset as CSV to this file
    #[arg(long)]
    pub export: Option<PathBuf>,
    /// Character encoding for the report and export files (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_fraction(value: &str) -> Result<f64, String> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if !(0.0..1.0).contains(&parsed) {
        return Err("Margin must be a fraction between 0 and 1".to_string());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn delimiter_names_are_accepted() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter("ab").is_err());
    }

    #[test]
    fn margin_must_be_a_fraction() {
        assert_eq!(parse_fraction("0.2"), Ok(0.2));
        assert!(parse_fraction("20").is_err());
        assert!(parse_fraction("abc").is_err());
    }

    #[test]
    fn analyze_accepts_repeated_overrides() {
        let cli = Cli::try_parse_from([
            "sales-insights",
            "analyze",
            "-i",
            "a.csv",
            "b.csv",
            "--map",
            "total_amount=Net",
            "--map",
            "region=",
            "--language",
            "ar",
            "--format",
            "json",
        ])
        .unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.input.inputs.len(), 2);
        assert_eq!(args.assignments, vec!["total_amount=Net", "region="]);
        assert_eq!(args.language, Some(Language::Arabic));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn bare_save_settings_uses_default_file() {
        let cli = Cli::try_parse_from([
            "sales-insights",
            "detect",
            "--save-settings",
            "-i",
            "orders.csv",
        ])
        .unwrap();
        let Commands::Detect(args) = cli.command else {
            panic!("expected detect");
        };
        assert_eq!(args.save_settings, Some(PathBuf::from(DEFAULT_SETTINGS_FILE)));
    }
}
