//! Terminal dashboard view.
//!
//! A single-shot plain-text rendering: KPI lines, proportional bar charts for
//! each breakdown and the recommendation list. Labels are padded by display
//! width so names with wide characters keep the bars aligned.

use unicode_width::UnicodeWidthStr;

use sales_core::formatting::{format_currency, format_rate};
use sales_core::models::Breakdown;
use sales_runtime::DashboardSnapshot;

const BAR_WIDTH: usize = 24;
const BAR_CHAR: char = '#';

/// Render the interactive dashboard view of a snapshot.
pub fn render_dashboard(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!("Sales Dashboard - {}\n", snapshot.source_name));
    out.push_str(&format!(
        "Showing {} of {} rows",
        snapshot.filtered_rows, snapshot.source_rows
    ));
    if let Some((from, to)) = snapshot.date_range {
        out.push_str(&format!(" | {} to {}", from, to));
    }
    out.push_str("\n\n");

    if !snapshot.has_data() {
        out.push_str("No rows match the active filters.\n");
        out.push_str("Relax the date range or category selections and try again.\n");
        return out;
    }

    out.push_str(&format!(
        "Total Revenue     {}\n",
        format_currency(snapshot.kpis.total_revenue)
    ));
    out.push_str(&format!("Orders            {}\n", snapshot.kpis.order_count));
    out.push_str(&format!(
        "Avg Order Value   {}\n",
        format_currency(snapshot.kpis.average_order_value)
    ));
    out.push_str(&format!(
        "Conversion Rate   {}\n",
        format_rate(snapshot.kpis.conversion_rate)
    ));
    out.push('\n');

    push_chart(&mut out, "Revenue by Channel", &snapshot.breakdowns.channels);
    push_chart(&mut out, "Revenue by Sales Rep", &snapshot.breakdowns.sales_reps);
    push_chart(
        &mut out,
        "Revenue by Customer Type",
        &snapshot.breakdowns.customer_types,
    );
    push_chart(&mut out, "Revenue by Time of Day", &snapshot.breakdowns.time_of_day);
    if let Some(weekly) = &snapshot.breakdowns.weekly {
        push_chart(&mut out, "Weekly Revenue", weekly);
    }

    if !snapshot.insights.is_empty() {
        out.push_str("Recommendations\n");
        for insight in &snapshot.insights {
            out.push_str(&format!("  * {}\n", insight));
        }
        out.push('\n');
    }

    out
}

/// Append one bar-chart section, skipping it when the breakdown is empty.
fn push_chart(out: &mut String, title: &str, breakdown: &Breakdown) {
    if breakdown.entries.is_empty() {
        return;
    }
    let label_width = breakdown
        .entries
        .iter()
        .map(|e| e.key.width())
        .max()
        .unwrap_or(0);
    let max_revenue = breakdown
        .entries
        .iter()
        .map(|e| e.revenue)
        .fold(0.0_f64, f64::max);

    out.push_str(title);
    out.push('\n');
    for entry in &breakdown.entries {
        out.push_str(&format!(
            "  {}  {:>12}  {}\n",
            pad_to_width(&entry.key, label_width),
            format_currency(entry.revenue),
            bar(entry.revenue, max_revenue)
        ));
    }
    out.push('\n');
}

/// Right-pad `s` with spaces to the given display width.
fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

/// A bar proportional to `value / max`, at least one mark for any positive
/// value.
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let length = ((value / max) * BAR_WIDTH as f64).round() as usize;
    BAR_CHAR.to_string().repeat(length.clamp(1, BAR_WIDTH))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sales_core::models::{Dataset, FilterCriteria, Record};
    use sales_runtime::SessionContext;
    use std::collections::BTreeSet;

    fn make(rev: f64, channel: &str) -> Record {
        Record {
            revenue: Some(rev),
            channel: Some(channel.to_string()),
            ..Record::default()
        }
    }

    fn snapshot_with_criteria(
        records: Vec<Record>,
        criteria: FilterCriteria,
    ) -> DashboardSnapshot {
        let mut session = SessionContext::new(3);
        session.load_dataset(Dataset {
            records,
            headers: vec!["Revenue".to_string(), "Channel".to_string()],
            source_name: "sales.csv".to_string(),
        });
        session.set_criteria(criteria);
        session.recompute().expect("recompute").clone()
    }

    fn snapshot(records: Vec<Record>) -> DashboardSnapshot {
        snapshot_with_criteria(records, FilterCriteria::default())
    }

    #[test]
    fn test_dashboard_header_and_kpis() {
        let view = render_dashboard(&snapshot(vec![
            make(1200.50, "Online"),
            make(2300.00, "Retail"),
        ]));
        assert!(view.starts_with("Sales Dashboard - sales.csv"));
        assert!(view.contains("Showing 2 of 2 rows"));
        assert!(view.contains("Total Revenue     $3,500.50"));
        assert!(view.contains("Conversion Rate   N/A"));
    }

    #[test]
    fn test_dashboard_bars_scale_to_leader() {
        let view = render_dashboard(&snapshot(vec![
            make(100.0, "Online"),
            make(400.0, "Retail"),
        ]));
        let retail_line = view
            .lines()
            .find(|l| l.contains("Retail") && l.contains('#'))
            .expect("retail bar");
        let online_line = view
            .lines()
            .find(|l| l.contains("Online") && l.contains('#'))
            .expect("online bar");
        let count = |l: &str| l.chars().filter(|&c| c == '#').count();
        assert_eq!(count(retail_line), BAR_WIDTH);
        assert_eq!(count(online_line), BAR_WIDTH / 4);
    }

    #[test]
    fn test_dashboard_empty_state() {
        let mut channels = BTreeSet::new();
        channels.insert("Print".to_string());
        let view = render_dashboard(&snapshot_with_criteria(
            vec![make(100.0, "Online")],
            FilterCriteria {
                channels,
                ..FilterCriteria::default()
            },
        ));
        assert!(view.contains("Showing 0 of 1 rows"));
        assert!(view.contains("No rows match the active filters."));
        assert!(!view.contains("Total Revenue"));
    }

    #[test]
    fn test_dashboard_labels_align() {
        let view = render_dashboard(&snapshot(vec![
            make(100.0, "Online"),
            make(200.0, "Social Media"),
        ]));
        let lines: Vec<&str> = view
            .lines()
            .filter(|l| l.contains('$') && l.starts_with("  "))
            .collect();
        assert_eq!(lines.len(), 2);
        // Currency columns start at the same offset.
        let dollar_at = |l: &str| l.find('$').unwrap();
        assert_eq!(dollar_at(lines[0]), dollar_at(lines[1]));
    }

    #[test]
    fn test_dashboard_lists_recommendations() {
        let mut snap = snapshot(vec![make(100.0, "Online")]);
        snap.insights = vec!["Try something.".to_string()];
        let view = render_dashboard(&snap);
        assert!(view.contains("Recommendations"));
        assert!(view.contains("  * Try something."));
    }

    #[test]
    fn test_bar_minimum_one_mark() {
        assert_eq!(bar(1.0, 10_000.0), "#");
        assert_eq!(bar(0.0, 10_000.0), "");
        assert_eq!(bar(5.0, 0.0), "");
    }
}
