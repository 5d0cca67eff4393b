use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::FilterCriteria;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Sales performance dashboard for CSV/XLSX exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sales-dashboard",
    about = "Sales performance dashboard for CSV/XLSX exports",
    version
)]
pub struct Settings {
    /// Path to the sales export file (CSV or XLSX)
    pub input: PathBuf,

    /// Input format override (inferred from the extension by default)
    #[arg(long, value_parser = ["csv", "xlsx", "xls"])]
    pub format: Option<String>,

    /// Start of the date filter, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// End of the date filter, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Restrict to a channel (repeatable)
    #[arg(long = "channel")]
    pub channels: Vec<String>,

    /// Restrict to a customer type (repeatable)
    #[arg(long = "customer-type")]
    pub customer_types: Vec<String>,

    /// Restrict to a business / branch (repeatable)
    #[arg(long = "business")]
    pub businesses: Vec<String>,

    /// Write the plain-text executive summary to this path
    #[arg(long)]
    pub export_text: Option<PathBuf>,

    /// Write the PDF executive summary to this path
    #[arg(long)]
    pub export_pdf: Option<PathBuf>,

    /// Directory that relative export paths are resolved against
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Minimum orders a rep needs before the coaching insight considers them
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..))]
    pub min_coaching_orders: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.sales-dashboard/last_used.json`.
///
/// Filter criteria are deliberately *not* persisted: derived dashboard state
/// lives only for the session, but workstation-level preferences carry over.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_coaching_orders: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.sales-dashboard/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".sales-dashboard").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(params) => params,
            Err(e) => {
                tracing::debug!("ignoring unreadable last-used params: {}", e);
                Self::default()
            }
        }
    }

    /// Atomically write params to the default path, creating parent directories
    /// if needed.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the default config file if it exists.
    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());

        // Parse into the typed struct using the same args.
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug_override(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // Merge last-used values for fields that were NOT explicitly set on the
        // command line (CLI always wins).
        if !is_arg_explicitly_set(&matches, "export_dir") && settings.export_dir.is_none() {
            settings.export_dir = last.export_dir;
        }
        if !is_arg_explicitly_set(&matches, "min_coaching_orders") {
            if let Some(v) = last.min_coaching_orders {
                settings.min_coaching_orders = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "log_level") {
            if let Some(v) = last.log_level {
                settings.log_level = v;
            }
        }

        settings = Self::apply_debug_override(settings);

        // Persist current settings for next run.
        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Assemble the dashboard [`FilterCriteria`] from the filter flags.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            date_range: match (self.from, self.to) {
                (Some(from), Some(to)) => Some((from, to)),
                (Some(from), None) => Some((from, NaiveDate::MAX)),
                (None, Some(to)) => Some((NaiveDate::MIN, to)),
                (None, None) => None,
            },
            channels: self.channels.iter().cloned().collect(),
            customer_types: self.customer_types.iter().cloned().collect(),
            businesses: self.businesses.iter().cloned().collect(),
        }
    }

    /// Resolve an export path against `--export-dir` when it is relative.
    pub fn resolve_export_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.export_dir {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }

    /// `--debug` overrides the log level.
    fn apply_debug_override(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            export_dir: s.export_dir.clone(),
            min_coaching_orders: Some(s.min_coaching_orders),
            log_level: Some(s.log_level.clone()),
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
