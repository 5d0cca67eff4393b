//! Plain-text executive summary.
//!
//! The text report is the canonical export: the PDF renders the same
//! content. Sections whose underlying breakdown is empty are omitted rather
//! than printed with a placeholder.

use sales_core::formatting::{format_currency, format_rate};
use sales_core::models::Breakdown;
use sales_runtime::DashboardSnapshot;

const RULE_HEAVY: &str =
    "======================================================================";
const RULE_LIGHT: &str =
    "----------------------------------------------------------------------";

/// Render the full executive summary for a snapshot.
pub fn render_text_report(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();

    out.push_str(RULE_HEAVY);
    out.push('\n');
    out.push_str("SALES PERFORMANCE EXECUTIVE SUMMARY\n");
    out.push_str(RULE_HEAVY);
    out.push('\n');
    out.push_str(&format!(
        "Generated: {}\n",
        snapshot.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    if let Some((from, to)) = snapshot.date_range {
        out.push_str(&format!("Period: {} to {}\n", from, to));
    }
    out.push('\n');

    out.push_str("KEY PERFORMANCE INDICATORS\n");
    out.push_str(RULE_LIGHT);
    out.push('\n');
    out.push_str(&format!(
        "Total Revenue:        {}\n",
        format_currency(snapshot.kpis.total_revenue)
    ));
    out.push_str(&format!("Orders:               {}\n", snapshot.kpis.order_count));
    out.push_str(&format!(
        "Average Order Value:  {}\n",
        format_currency(snapshot.kpis.average_order_value)
    ));
    out.push_str(&format!(
        "Conversion Rate:      {}\n",
        format_rate(snapshot.kpis.conversion_rate)
    ));
    out.push('\n');

    push_leaderboard(&mut out, "TOP CHANNELS BY REVENUE", &snapshot.breakdowns.channels);
    push_leaderboard(
        &mut out,
        "TOP SALES REPRESENTATIVES",
        &snapshot.breakdowns.sales_reps,
    );
    push_leaderboard(
        &mut out,
        "REVENUE BY CUSTOMER TYPE",
        &snapshot.breakdowns.customer_types,
    );
    let time_of_day = &snapshot.breakdowns.time_of_day;
    if !time_of_day.entries.is_empty() {
        out.push_str("REVENUE BY TIME OF DAY\n");
        out.push_str(RULE_LIGHT);
        out.push('\n');
        // Entries arrive in bucket order, not leaderboard order.
        for entry in &time_of_day.entries {
            out.push_str(&format!(
                "  - {}: {}\n",
                entry.key,
                format_currency(entry.revenue)
            ));
        }
        out.push('\n');
    }
    if let Some(weekly) = &snapshot.breakdowns.weekly {
        if !weekly.entries.is_empty() {
            out.push_str("WEEKLY REVENUE TREND\n");
            out.push_str(RULE_LIGHT);
            out.push('\n');
            for entry in &weekly.entries {
                out.push_str(&format!(
                    "  {}: {} ({} orders)\n",
                    entry.key,
                    format_currency(entry.revenue),
                    entry.count
                ));
            }
            out.push('\n');
        }
    }

    if !snapshot.insights.is_empty() {
        out.push_str("EXECUTIVE RECOMMENDATIONS\n");
        out.push_str(RULE_LIGHT);
        out.push('\n');
        for (i, insight) in snapshot.insights.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, insight));
        }
        out.push('\n');
    }

    out.push_str(RULE_HEAVY);
    out.push('\n');
    out.push_str(&format!(
        "Data Source: {} | {} of {} rows\n",
        snapshot.source_name, snapshot.filtered_rows, snapshot.source_rows
    ));

    out
}

/// Append one top-5 leaderboard section, skipping it when empty.
fn push_leaderboard(out: &mut String, title: &str, breakdown: &Breakdown) {
    if breakdown.entries.is_empty() {
        return;
    }
    out.push_str(title);
    out.push('\n');
    out.push_str(RULE_LIGHT);
    out.push('\n');
    for entry in breakdown.top(5) {
        out.push_str(&format!(
            "  - {}: {}\n",
            entry.key,
            format_currency(entry.revenue)
        ));
    }
    out.push('\n');
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use sales_core::models::{Dataset, FilterCriteria, Record};
    use sales_runtime::SessionContext;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot_for(records: Vec<Record>) -> DashboardSnapshot {
        let headers = vec!["Revenue".to_string(), "Channel".to_string()];
        let mut session = SessionContext::new(3);
        session.load_dataset(Dataset {
            records,
            headers,
            source_name: "sales.csv".to_string(),
        });
        session.set_criteria(FilterCriteria::default());
        session.recompute().expect("recompute").clone()
    }

    fn sample_snapshot() -> DashboardSnapshot {
        let make = |d: NaiveDate, rev: f64, channel: &str| Record {
            date: Some(d),
            revenue: Some(rev),
            channel: Some(channel.to_string()),
            ..Record::default()
        };
        snapshot_for(vec![
            make(date(2024, 2, 5), 1200.50, "Online"),
            make(date(2024, 2, 6), 2300.00, "Retail"),
            make(date(2024, 2, 7), 1189.50, "Social Media"),
        ])
    }

    #[test]
    fn test_report_header_and_kpis() {
        let report = render_text_report(&sample_snapshot());
        assert!(report.starts_with(RULE_HEAVY));
        assert!(report.contains("SALES PERFORMANCE EXECUTIVE SUMMARY"));
        assert!(report.contains("Total Revenue:        $4,690.00"));
        assert!(report.contains("Orders:               3"));
        assert!(report.contains("Average Order Value:  $1,563.33"));
        assert!(report.contains("Conversion Rate:      N/A"));
        assert!(report.contains("Period: 2024-02-05 to 2024-02-07"));
    }

    #[test]
    fn test_report_channel_leaderboard_order() {
        let report = render_text_report(&sample_snapshot());
        let retail = report.find("- Retail: $2,300.00").expect("retail line");
        let online = report.find("- Online: $1,200.50").expect("online line");
        let social = report
            .find("- Social Media: $1,189.50")
            .expect("social line");
        assert!(retail < online && online < social);
    }

    #[test]
    fn test_report_footer_rows() {
        let report = render_text_report(&sample_snapshot());
        assert!(report
            .trim_end()
            .ends_with("Data Source: sales.csv | 3 of 3 rows"));
    }

    #[test]
    fn test_report_omits_empty_sections() {
        let report = render_text_report(&snapshot_for(vec![Record {
            revenue: Some(10.0),
            ..Record::default()
        }]));
        assert!(!report.contains("TOP CHANNELS BY REVENUE"));
        assert!(!report.contains("TOP SALES REPRESENTATIVES"));
        assert!(!report.contains("REVENUE BY TIME OF DAY"));
        assert!(!report.contains("WEEKLY REVENUE TREND"));
    }

    #[test]
    fn test_report_time_of_day_section_in_bucket_order() {
        let make = |rev: f64, tod: &str| Record {
            revenue: Some(rev),
            time_of_day: Some(tod.to_string()),
            ..Record::default()
        };
        let report = render_text_report(&snapshot_for(vec![
            make(900.0, "Evening"),
            make(100.0, "Morning"),
        ]));
        assert!(report.contains("REVENUE BY TIME OF DAY"));
        let morning = report.find("- Morning: $100.00").expect("morning line");
        let evening = report.find("- Evening: $900.00").expect("evening line");
        // Bucket order, even though Evening out-earns Morning.
        assert!(morning < evening);
    }

    #[test]
    fn test_report_numbers_recommendations() {
        let mut snapshot = sample_snapshot();
        snapshot.insights = vec![
            "Do the first thing.".to_string(),
            "Do the second thing.".to_string(),
        ];
        let report = render_text_report(&snapshot);
        assert!(report.contains("EXECUTIVE RECOMMENDATIONS"));
        assert!(report.contains("1. Do the first thing."));
        assert!(report.contains("2. Do the second thing."));
    }

    #[test]
    fn test_report_revenue_round_trips_at_two_decimals() {
        let report = render_text_report(&sample_snapshot());
        let line = report
            .lines()
            .find(|l| l.starts_with("Total Revenue:"))
            .expect("total revenue line");
        let value: f64 = line
            .trim_start_matches("Total Revenue:")
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .parse()
            .expect("parse back");
        assert!((value - 4690.0).abs() < 0.005);
    }

    #[test]
    fn test_empty_snapshot_still_renders() {
        let snapshot = snapshot_for(vec![]);
        let report = render_text_report(&snapshot);
        assert!(report.contains("Total Revenue:        $0.00"));
        assert!(report.contains("0 of 0 rows"));
    }

    #[test]
    fn test_generated_timestamp_present() {
        let report = render_text_report(&sample_snapshot());
        let year = Utc::now().format("%Y").to_string();
        assert!(report.contains(&format!("Generated: {}", year)));
    }
}
