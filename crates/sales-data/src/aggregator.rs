//! KPI and breakdown aggregation over a filtered view.
//!
//! Every aggregate is recomputed from scratch on each filter change; nothing
//! here is incremental. Absent values degrade the specific metric that needs
//! them: a record without a revenue value contributes to no KPI, a record
//! without a channel appears in no channel breakdown.

use std::collections::BTreeMap;

use sales_core::models::{
    Breakdown, BreakdownEntry, Dimension, Field, KpiSummary, Record,
};

use crate::filter::FilteredView;

// ── KPIs ──────────────────────────────────────────────────────────────────────

/// Compute the scalar KPI summary over the surviving records.
///
/// `order_count` counts records that carry a revenue value, so a row whose
/// revenue cell was blank or unparseable is not an order. The conversion rate
/// is `None` when no surviving record carries a conversions value, which the
/// presentation layer must render differently from a genuine zero.
pub fn compute_kpis(records: &[Record]) -> KpiSummary {
    let mut total_revenue = 0.0;
    let mut order_count = 0usize;
    let mut conversions_sum: Option<u64> = None;

    for record in records {
        if let Some(revenue) = record.revenue {
            total_revenue += revenue;
            order_count += 1;
        }
        if let Some(c) = record.conversions {
            conversions_sum = Some(conversions_sum.unwrap_or(0) + c);
        }
    }

    let average_order_value = if order_count > 0 {
        total_revenue / order_count as f64
    } else {
        0.0
    };
    let conversion_rate = match (conversions_sum, order_count) {
        (Some(sum), n) if n > 0 => Some(sum as f64 / n as f64),
        _ => None,
    };

    KpiSummary {
        total_revenue,
        order_count,
        average_order_value,
        conversion_rate,
    }
}

// ── Breakdowns ────────────────────────────────────────────────────────────────

/// The full set of breakdowns the dashboard presents.
#[derive(Debug, Clone)]
pub struct DashboardBreakdowns {
    /// Channels as a revenue leaderboard.
    pub channels: Breakdown,
    /// Sales reps as a revenue leaderboard.
    pub sales_reps: Breakdown,
    /// Customer types as a revenue leaderboard.
    pub customer_types: Breakdown,
    /// Time-of-day buckets in day order.
    pub time_of_day: Breakdown,
    /// ISO-week trend, `None` when no surviving record carries a date.
    pub weekly: Option<Breakdown>,
}

/// Compute every breakdown over the filtered view.
pub fn compute_breakdowns(view: &FilteredView) -> DashboardBreakdowns {
    DashboardBreakdowns {
        channels: leaderboard(&view.records, Dimension::Channel, Field::Channel),
        sales_reps: leaderboard(&view.records, Dimension::SalesRep, Field::SalesRep),
        customer_types: leaderboard(&view.records, Dimension::CustomerType, Field::CustomerType),
        time_of_day: time_of_day_breakdown(&view.records),
        weekly: weekly_breakdown(&view.records),
    }
}

/// Group by a categorical field and order by revenue, highest first.
/// Ties break on the key so the ordering is deterministic.
pub fn leaderboard(records: &[Record], dimension: Dimension, field: Field) -> Breakdown {
    let mut entries = group_by(records, dimension, |r| {
        r.category(field).map(str::to_string)
    })
    .entries;
    entries.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    Breakdown { dimension, entries }
}

/// Canonical time-of-day bucket order; unrecognised labels follow
/// alphabetically after the known ones.
const TIME_OF_DAY_ORDER: [&str; 4] = ["Morning", "Afternoon", "Evening", "Night"];

fn time_of_day_rank(key: &str) -> usize {
    TIME_OF_DAY_ORDER
        .iter()
        .position(|&k| k.eq_ignore_ascii_case(key))
        .unwrap_or(TIME_OF_DAY_ORDER.len())
}

fn time_of_day_breakdown(records: &[Record]) -> Breakdown {
    let mut breakdown = group_by(records, Dimension::TimeOfDay, |r| {
        r.time_of_day.clone()
    });
    breakdown.entries.sort_by(|a, b| {
        time_of_day_rank(&a.key)
            .cmp(&time_of_day_rank(&b.key))
            .then_with(|| a.key.cmp(&b.key))
    });
    breakdown
}

/// Group dated records into ISO weeks, keyed `"2024-W07"`, ascending.
/// Weeks with no records simply do not appear.
fn weekly_breakdown(records: &[Record]) -> Option<Breakdown> {
    if !records.iter().any(|r| r.date.is_some()) {
        return None;
    }
    Some(group_by(records, Dimension::Week, |r| {
        r.date.map(|d| d.format("%G-W%V").to_string())
    }))
}

// ── Accumulator ───────────────────────────────────────────────────────────────

/// Running totals for one group.
#[derive(Debug, Default)]
struct GroupAccumulator {
    revenue: f64,
    revenue_count: usize,
    count: usize,
    conversions: Option<u64>,
    order_size_sum: f64,
    order_size_count: usize,
}

impl GroupAccumulator {
    fn add_record(&mut self, record: &Record) {
        self.count += 1;
        if let Some(revenue) = record.revenue {
            self.revenue += revenue;
            self.revenue_count += 1;
        }
        if let Some(c) = record.conversions {
            self.conversions = Some(self.conversions.unwrap_or(0) + c);
        }
        if let Some(size) = record.average_order_size {
            self.order_size_sum += size;
            self.order_size_count += 1;
        }
    }

    fn into_entry(self, key: String) -> BreakdownEntry {
        // Prefer observed revenue for the group mean; fall back to the
        // source-reported average order size when no revenue was present.
        let mean_order_value = if self.revenue_count > 0 {
            self.revenue / self.revenue_count as f64
        } else if self.order_size_count > 0 {
            self.order_size_sum / self.order_size_count as f64
        } else {
            0.0
        };
        let revenue_per_conversion = match self.conversions {
            Some(c) if c > 0 => Some(self.revenue / c as f64),
            _ => None,
        };
        BreakdownEntry {
            key,
            revenue: self.revenue,
            count: self.count,
            mean_order_value,
            conversions: self.conversions,
            revenue_per_conversion,
        }
    }
}

/// Generic grouping driver.
///
/// `key_fn` maps a record to its group key; records that yield `None` are
/// skipped, there is no catch-all bucket for absent values. Entries come out
/// in ascending key order.
fn group_by(
    records: &[Record],
    dimension: Dimension,
    key_fn: impl Fn(&Record) -> Option<String>,
) -> Breakdown {
    // BTreeMap keeps the keys sorted as we accumulate.
    let mut map: BTreeMap<String, GroupAccumulator> = BTreeMap::new();

    for record in records {
        let Some(key) = key_fn(record) else {
            continue;
        };
        map.entry(key).or_default().add_record(record);
    }

    Breakdown {
        dimension,
        entries: map
            .into_iter()
            .map(|(key, acc)| acc.into_entry(key))
            .collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
