//! Saved session settings: the column mapping plus display preferences.
//!
//! Stored as pretty JSON by default; `.yml` / `.yaml` paths use YAML.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{locale::Language, mapping::FieldMapping};

pub const DEFAULT_SETTINGS_FILE: &str = "sales_config.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub column_mapping: FieldMapping,
    pub language: Language,
    pub theme: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsFormat {
    Json,
    Yaml,
}

impl SettingsFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                SettingsFormat::Yaml
            }
            _ => SettingsFormat::Json,
        }
    }
}

impl Settings {
    pub fn new(column_mapping: FieldMapping, language: Language, theme: Theme) -> Self {
        Self {
            column_mapping,
            language,
            theme,
            saved_at: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening settings file {path:?}"))?;
        let reader = BufReader::new(file);
        let settings: Settings = match SettingsFormat::for_path(path) {
            SettingsFormat::Json => {
                serde_json::from_reader(reader).context("Parsing settings JSON")?
            }
            SettingsFormat::Yaml => {
                serde_yaml::from_reader(reader).context("Parsing settings YAML")?
            }
        };
        info!(
            "Loaded settings from {:?} ({} mapped field(s))",
            path,
            settings.column_mapping.iter().count()
        );
        Ok(settings)
    }

    /// Writes the settings stamped with `saved_at`.
    pub fn save(&self, path: &Path, saved_at: NaiveDateTime) -> Result<()> {
        let stamped = Settings {
            saved_at: Some(saved_at),
            ..self.clone()
        };
        let file =
            File::create(path).with_context(|| format!("Creating settings file {path:?}"))?;
        let mut writer = BufWriter::new(file);
        match SettingsFormat::for_path(path) {
            SettingsFormat::Json => serde_json::to_writer_pretty(&mut writer, &stamped)
                .context("Writing settings JSON")?,
            SettingsFormat::Yaml => {
                serde_yaml::to_writer(&mut writer, &stamped).context("Writing settings YAML")?
            }
        }
        writer.flush().context("Flushing settings file")?;
        info!("Saved settings to {path:?}");
        Ok(())
    }
}
