//! TOML configuration.
//!
//! ```toml
//! [import]
//! input_dir = "/data/volunteers/2025"
//! pattern = "*.csv"
//! delay_ms = 1000
//! timezone = "US/Eastern"
//!
//! [sheets]
//! workbook = "2025-2026-volunteers"
//! access_token_env = "GOOGLE_OAUTH_ACCESS_TOKEN"
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{ImportError, ImportResult};
use crate::ingestion::DEFAULT_INPUT_PATTERN;
use crate::processing::{TransformOptions, DEFAULT_EXCLUDED_COLUMNS, DEFAULT_STRIP_MARKER};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Input and transformation settings.
    pub import: ImportSection,
    /// Destination workbook settings.
    pub sheets: SheetsSection,
}

/// `[import]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportSection {
    /// Directory holding the CSV exports.
    pub input_dir: Option<PathBuf>,
    /// Glob applied inside `input_dir`.
    pub pattern: String,
    /// Pause between published files, in milliseconds.
    pub delay_ms: u64,
    /// IANA timezone for serial dates.
    pub timezone: String,
    /// Overrides the built-in excluded column list.
    pub exclude_columns: Option<Vec<String>>,
    /// Overrides the substring stripped from field names.
    pub strip_marker: Option<String>,
    /// Optional append-only outcome log.
    pub log_file: Option<PathBuf>,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            input_dir: None,
            pattern: DEFAULT_INPUT_PATTERN.to_string(),
            delay_ms: 1000,
            timezone: "US/Eastern".to_string(),
            exclude_columns: None,
            strip_marker: None,
            log_file: None,
        }
    }
}

/// `[sheets]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsSection {
    /// Workbook title.
    pub workbook: String,
    /// Environment variable holding the bearer access token.
    pub access_token_env: String,
    /// Sheets API base URL.
    pub sheets_api_base: String,
    /// Drive API base URL.
    pub drive_api_base: String,
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            workbook: "2025-2026-volunteers".to_string(),
            access_token_env: "GOOGLE_OAUTH_ACCESS_TOKEN".to_string(),
            sheets_api_base: "https://sheets.googleapis.com/v4".to_string(),
            drive_api_base: "https://www.googleapis.com/drive/v3".to_string(),
        }
    }
}

impl Config {
    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> ImportResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse config text.
    pub fn from_toml_str(text: &str) -> ImportResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// The configured timezone.
    pub fn timezone(&self) -> ImportResult<Tz> {
        let name = self.import.timezone.trim();
        name.parse::<Tz>().map_err(|e| ImportError::Config {
            message: format!("unknown timezone '{name}': {e}"),
        })
    }

    /// Pause between published files.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.import.delay_ms)
    }

    /// Transformation settings derived from the `[import]` section.
    pub fn transform_options(&self) -> ImportResult<TransformOptions> {
        let excluded_columns = match &self.import.exclude_columns {
            Some(cols) => cols.iter().map(|c| c.trim().to_string()).collect(),
            None => DEFAULT_EXCLUDED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };
        Ok(TransformOptions {
            excluded_columns,
            strip_marker: self
                .import
                .strip_marker
                .clone()
                .unwrap_or_else(|| DEFAULT_STRIP_MARKER.to_string()),
            timezone: self.timezone()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.import.pattern, "*.csv");
        assert_eq!(cfg.delay(), Duration::from_secs(1));
        assert_eq!(cfg.transform_options().unwrap(), TransformOptions::default());
    }

    #[test]
    fn parses_both_sections() {
        let cfg = Config::from_toml_str(
            r#"
[import]
input_dir = "/data/2025"
delay_ms = 0
timezone = "America/Chicago"
exclude_columns = ["status", " waitlist "]

[sheets]
workbook = "fall-volunteers"
"#,
        )
        .unwrap();

        assert_eq!(cfg.import.input_dir, Some(PathBuf::from("/data/2025")));
        assert_eq!(cfg.sheets.workbook, "fall-volunteers");
        assert_eq!(cfg.sheets.access_token_env, "GOOGLE_OAUTH_ACCESS_TOKEN");

        let opts = cfg.transform_options().unwrap();
        assert_eq!(opts.timezone, chrono_tz::America::Chicago);
        assert_eq!(opts.excluded_columns.len(), 2);
        assert!(opts.excluded_columns.contains("waitlist"));
    }

    #[test]
    fn unknown_timezone_is_a_config_error() {
        let cfg = Config::from_toml_str("[import]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        let err = cfg.transform_options().unwrap_err();
        assert!(err.to_string().contains("unknown timezone 'Mars/Olympus'"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[sheets]\nworkbok = \"typo\"\n").unwrap_err();
        assert!(err.to_string().contains("config parse error"));
    }
}
