mod bootstrap;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;

use sales_core::settings::Settings;
use sales_data::loader::{self, FileFormat};
use sales_report::{render_dashboard, render_pdf_report, render_text_report};
use sales_runtime::SessionContext;

fn main() -> ExitCode {
    let settings = Settings::load_with_last_used();

    if let Err(e) = bootstrap::ensure_directories() {
        eprintln!("Could not prepare ~/.sales-dashboard: {e:#}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref()) {
        eprintln!("Could not initialise logging: {e:#}");
        return ExitCode::FAILURE;
    }

    tracing::info!("Sales Dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<()> {
    let format = match &settings.format {
        Some(name) => Some(FileFormat::from_name(name)?),
        None => None,
    };

    let dataset = loader::load_path(&settings.input, format).map_err(|e| {
        anyhow::anyhow!(
            "Could not read {}: {}. Check the path and that the file is a CSV or XLSX export.",
            settings.input.display(),
            e
        )
    })?;
    tracing::info!(
        "Loaded {} records from {}",
        dataset.len(),
        settings.input.display()
    );

    let mut session = SessionContext::new(settings.min_coaching_orders as usize);
    session.load_dataset(dataset);
    session.set_criteria(settings.criteria());
    let snapshot = session.recompute()?.clone();

    print!("{}", render_dashboard(&snapshot));

    if let Some(path) = &settings.export_text {
        let path = resolve_export(settings, path);
        let report = render_text_report(&snapshot);
        std::fs::write(&path, report)?;
        println!("Text report written to {}", path.display());
    }

    if let Some(path) = &settings.export_pdf {
        let path = resolve_export(settings, path);
        match render_pdf_report(&snapshot) {
            Ok(bytes) => {
                std::fs::write(&path, bytes)?;
                println!("PDF report written to {}", path.display());
            }
            // The text export carries the same content, so a failed PDF is
            // a notice rather than a hard error.
            Err(e) if e.is_recoverable() => {
                tracing::warn!("PDF generation failed: {}", e);
                println!("PDF generation failed ({e}); use the text export instead.");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Resolve a relative export path against `--export-dir`, falling back to the
/// standard exports directory.
fn resolve_export(settings: &Settings, path: &Path) -> PathBuf {
    if path.is_absolute() || settings.export_dir.is_some() {
        settings.resolve_export_path(path)
    } else {
        bootstrap::default_export_dir().join(path)
    }
}
