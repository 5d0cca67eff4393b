//! PDF export of the executive summary.
//!
//! The PDF mirrors the text report line for line. The built-in Helvetica
//! fonts only cover ASCII, so every line is transliterated first; a line
//! that would vanish entirely under sanitisation fails the export instead of
//! silently printing nothing.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use tracing::debug;

use sales_core::error::{DashboardError, Result};
use sales_runtime::DashboardSnapshot;

use crate::text::render_text_report;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 18.0;
const LINE_HEIGHT_MM: f32 = 5.2;
const BODY_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 11.5;

/// Render the executive summary as PDF bytes.
pub fn render_pdf_report(snapshot: &DashboardSnapshot) -> Result<Vec<u8>> {
    // An insight that sanitises away entirely would still render its list
    // number, so check the raw sentences up front.
    for insight in &snapshot.insights {
        sanitize_ascii(insight)?;
    }

    let report = render_text_report(snapshot);

    let (doc, page, layer) = PdfDocument::new(
        "Sales Performance Executive Summary",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = add_font(&doc, BuiltinFont::Helvetica)?;
    let bold = add_font(&doc, BuiltinFont::HelveticaBold)?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    for line in report.lines() {
        if y < MARGIN_MM {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            current = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }

        let text = sanitize_ascii(line)?;
        if !text.is_empty() {
            let (font, size) = if is_heading(&text) {
                (&bold, HEADING_SIZE)
            } else {
                (&regular, BODY_SIZE)
            };
            current.use_text(text, size, Mm(MARGIN_MM), Mm(y), font);
        }
        y -= LINE_HEIGHT_MM;
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| DashboardError::PdfRender(e.to_string()))?;
    debug!("rendered PDF report, {} bytes", bytes.len());
    Ok(bytes)
}

fn add_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| DashboardError::PdfRender(e.to_string()))
}

/// Section headings are the all-caps lines of the text report.
fn is_heading(line: &str) -> bool {
    let has_letters = line.chars().any(|c| c.is_ascii_alphabetic());
    has_letters
        && line
            .chars()
            .all(|c| !c.is_ascii_lowercase() && c != ':' && c != '.')
}

// ── ASCII sanitisation ────────────────────────────────────────────────────────

/// Reduce a line to the ASCII subset the built-in fonts can encode.
///
/// Common Latin accents, dashes and typographic quotes transliterate;
/// anything else is dropped. A non-empty input that sanitises to nothing is
/// an error: the caller would otherwise emit an invisibly blank line where
/// content belonged.
pub fn sanitize_ascii(line: &str) -> Result<String> {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        if c.is_ascii() {
            if !c.is_ascii_control() {
                out.push(c);
            }
            continue;
        }
        if let Some(replacement) = transliterate(c) {
            out.push_str(replacement);
        }
    }
    let out = out.trim_end().to_string();
    if out.is_empty() && !line.trim().is_empty() {
        return Err(DashboardError::PdfEncoding(line.to_string()));
    }
    Ok(out)
}

/// ASCII stand-ins for characters the Helvetica built-ins cannot encode.
fn transliterate(c: char) -> Option<&'static str> {
    let replacement = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => "a",
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => "A",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'É' | 'È' | 'Ê' | 'Ë' => "E",
        'í' | 'ì' | 'î' | 'ï' => "i",
        'Í' | 'Ì' | 'Î' | 'Ï' => "I",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => "o",
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => "O",
        'ú' | 'ù' | 'û' | 'ü' => "u",
        'Ú' | 'Ù' | 'Û' | 'Ü' => "U",
        'ñ' => "n",
        'Ñ' => "N",
        'ç' => "c",
        'Ç' => "C",
        'ß' => "ss",
        '\u{2013}' | '\u{2014}' => "-",
        '\u{2018}' | '\u{2019}' => "'",
        '\u{201C}' | '\u{201D}' => "\"",
        '\u{2026}' => "...",
        '\u{00A0}' => " ",
        _ => return None,
    };
    Some(replacement)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sales_core::models::{Dataset, Record};
    use sales_runtime::SessionContext;

    fn sample_snapshot() -> DashboardSnapshot {
        let make = |rev: f64, channel: &str| Record {
            revenue: Some(rev),
            channel: Some(channel.to_string()),
            ..Record::default()
        };
        let mut session = SessionContext::new(3);
        session.load_dataset(Dataset {
            records: vec![make(1200.50, "Online"), make(2300.00, "Retail")],
            headers: vec!["Revenue".to_string(), "Channel".to_string()],
            source_name: "sales.csv".to_string(),
        });
        session.recompute().expect("recompute").clone()
    }

    // ── sanitize_ascii ────────────────────────────────────────────────────────

    #[test]
    fn test_sanitize_passes_ascii_through() {
        assert_eq!(
            sanitize_ascii("Total Revenue: $4,690.00").unwrap(),
            "Total Revenue: $4,690.00"
        );
    }

    #[test]
    fn test_sanitize_transliterates_accents() {
        assert_eq!(sanitize_ascii("Café São Paulo").unwrap(), "Cafe Sao Paulo");
        assert_eq!(sanitize_ascii("Müller").unwrap(), "Muller");
    }

    #[test]
    fn test_sanitize_maps_typography() {
        assert_eq!(
            sanitize_ascii("Growth \u{2013} \u{201C}strong\u{201D}\u{2026}").unwrap(),
            "Growth - \"strong\"..."
        );
    }

    #[test]
    fn test_sanitize_drops_unknown_chars() {
        assert_eq!(sanitize_ascii("Revenue 収益 up").unwrap(), "Revenue  up");
    }

    #[test]
    fn test_sanitize_rejects_fully_lost_line() {
        let err = sanitize_ascii("収益").unwrap_err();
        assert!(matches!(err, DashboardError::PdfEncoding(_)));
    }

    #[test]
    fn test_sanitize_empty_line_is_fine() {
        assert_eq!(sanitize_ascii("").unwrap(), "");
        assert_eq!(sanitize_ascii("   ").unwrap(), "");
    }

    // ── is_heading ────────────────────────────────────────────────────────────

    #[test]
    fn test_heading_detection() {
        assert!(is_heading("KEY PERFORMANCE INDICATORS"));
        assert!(is_heading("EXECUTIVE RECOMMENDATIONS"));
        assert!(!is_heading("Total Revenue:        $4,690.00"));
        assert!(!is_heading("  - Retail: $2,300.00"));
        assert!(!is_heading("======================================"));
    }

    // ── render_pdf_report ─────────────────────────────────────────────────────

    #[test]
    fn test_pdf_renders_nonempty_document() {
        let bytes = render_pdf_report(&sample_snapshot()).expect("pdf");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_pdf_fails_on_unencodable_insight() {
        let mut snapshot = sample_snapshot();
        snapshot.insights = vec!["\u{4E9C}\u{4E9C}\u{4E9C}".to_string()];
        let err = render_pdf_report(&snapshot).unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(err, DashboardError::PdfEncoding(_)));
    }
}
