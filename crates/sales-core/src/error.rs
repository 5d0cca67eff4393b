use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the sales dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The uploaded file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input file has an extension or declared format we cannot parse.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// The input file was recognised but its structure is unreadable
    /// (bad encoding, broken CSV framing, corrupt workbook).
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// The input table has no header row to map columns from.
    #[error("Input table has no header row")]
    MissingHeader,

    /// A string contained no characters representable in the PDF character
    /// set after sanitisation.
    #[error("PDF encoding failure: {0}")]
    PdfEncoding(String),

    /// The PDF backend failed while laying out or serialising the document.
    #[error("PDF render failure: {0}")]
    PdfRender(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DashboardError {
    /// `true` for failures the session can recover from by falling back to
    /// the text report (the PDF path is never fatal).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DashboardError::PdfEncoding(_) | DashboardError::PdfRender(_)
        )
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashboardError::FileRead {
            path: PathBuf::from("/some/sales.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/sales.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_unsupported_format() {
        let err = DashboardError::UnsupportedFormat("parquet".to_string());
        assert_eq!(err.to_string(), "Unsupported input format: parquet");
    }

    #[test]
    fn test_error_display_malformed_table() {
        let err = DashboardError::MalformedTable("invalid UTF-8 on line 3".to_string());
        assert_eq!(err.to_string(), "Malformed table: invalid UTF-8 on line 3");
    }

    #[test]
    fn test_error_display_missing_header() {
        let err = DashboardError::MissingHeader;
        assert_eq!(err.to_string(), "Input table has no header row");
    }

    #[test]
    fn test_error_display_pdf_encoding() {
        let err = DashboardError::PdfEncoding("insight #2".to_string());
        assert_eq!(err.to_string(), "PDF encoding failure: insight #2");
    }

    #[test]
    fn test_error_display_config() {
        let err = DashboardError::Config("no dataset loaded".to_string());
        assert_eq!(err.to_string(), "Configuration error: no dataset loaded");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DashboardError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_pdf_errors_are_recoverable() {
        assert!(DashboardError::PdfEncoding("x".to_string()).is_recoverable());
        assert!(DashboardError::PdfRender("x".to_string()).is_recoverable());
        assert!(!DashboardError::MissingHeader.is_recoverable());
    }
}
