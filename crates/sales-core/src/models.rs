use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ── Field ─────────────────────────────────────────────────────────────────────

/// The semantic columns the dashboard understands.
///
/// Source files may carry any number of extra columns; those are retained in
/// the [`Dataset`] header list but ignored by every downstream stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Date,
    Revenue,
    Channel,
    SalesRep,
    CustomerType,
    Conversions,
    AverageOrderSize,
    TimeOfDay,
    Business,
}

impl Field {
    /// All semantic fields, in presentation order.
    pub const ALL: [Field; 9] = [
        Field::Date,
        Field::Revenue,
        Field::Channel,
        Field::SalesRep,
        Field::CustomerType,
        Field::Conversions,
        Field::AverageOrderSize,
        Field::TimeOfDay,
        Field::Business,
    ];

    /// Match a raw header against the known semantic fields.
    ///
    /// Matching is case-insensitive and ignores whitespace, underscores and
    /// hyphens, so `"Sales Rep"`, `"sales_rep"` and `"SALES-REP"` all resolve
    /// to [`Field::SalesRep`].
    pub fn match_header(header: &str) -> Option<Field> {
        let normalised: String = header
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalised.as_str() {
            "date" => Some(Field::Date),
            "revenue" => Some(Field::Revenue),
            "channel" => Some(Field::Channel),
            "salesrep" => Some(Field::SalesRep),
            "customertype" => Some(Field::CustomerType),
            "conversions" => Some(Field::Conversions),
            "averageordersize" => Some(Field::AverageOrderSize),
            "timeofday" => Some(Field::TimeOfDay),
            "business" => Some(Field::Business),
            _ => None,
        }
    }

    /// Canonical human-readable column name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Revenue => "Revenue",
            Field::Channel => "Channel",
            Field::SalesRep => "Sales Rep",
            Field::CustomerType => "Customer Type",
            Field::Conversions => "Conversions",
            Field::AverageOrderSize => "Average Order Size",
            Field::TimeOfDay => "Time of Day",
            Field::Business => "Business",
        }
    }
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One transaction row from the source table.
///
/// Every attribute is optional; absence degrades the specific breakdowns that
/// need it rather than failing the load. Only `revenue` is required for any
/// KPI to be meaningful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Calendar date of the transaction.
    pub date: Option<NaiveDate>,
    /// Non-negative revenue amount.
    pub revenue: Option<f64>,
    /// Sales channel category, e.g. `"Online"`.
    pub channel: Option<String>,
    /// Sales representative name.
    pub sales_rep: Option<String>,
    /// Customer segment, e.g. `"Returning"`.
    pub customer_type: Option<String>,
    /// Number of conversions attributed to this row.
    pub conversions: Option<u64>,
    /// Average order size as reported by the source system.
    pub average_order_size: Option<f64>,
    /// Time-of-day bucket label, e.g. `"Morning"`.
    pub time_of_day: Option<String>,
    /// Business / branch name.
    pub business: Option<String>,
}

impl Record {
    /// `true` when this record carries a value for `field`.
    pub fn has_value(&self, field: Field) -> bool {
        match field {
            Field::Date => self.date.is_some(),
            Field::Revenue => self.revenue.is_some(),
            Field::Channel => self.channel.is_some(),
            Field::SalesRep => self.sales_rep.is_some(),
            Field::CustomerType => self.customer_type.is_some(),
            Field::Conversions => self.conversions.is_some(),
            Field::AverageOrderSize => self.average_order_size.is_some(),
            Field::TimeOfDay => self.time_of_day.is_some(),
            Field::Business => self.business.is_some(),
        }
    }

    /// The categorical value for `field`, when `field` is string-valued.
    pub fn category(&self, field: Field) -> Option<&str> {
        match field {
            Field::Channel => self.channel.as_deref(),
            Field::SalesRep => self.sales_rep.as_deref(),
            Field::CustomerType => self.customer_type.as_deref(),
            Field::TimeOfDay => self.time_of_day.as_deref(),
            Field::Business => self.business.as_deref(),
            _ => None,
        }
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// The full ordered collection of records from one uploaded file.
///
/// Immutable once parsed; a new upload replaces the whole dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Parsed records in source order.
    pub records: Vec<Record>,
    /// Raw header names as they appeared in the file (recognised or not).
    pub headers: Vec<String>,
    /// Display name of the source file.
    pub source_name: String,
}

impl Dataset {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest dates present, or `None` when no record has a date.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some((min, max))
    }

    /// Semantic fields with at least one value somewhere in the dataset.
    pub fn present_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|&f| self.records.iter().any(|r| r.has_value(f)))
            .collect()
    }

    /// Semantic fields that are absent in *every* record.
    ///
    /// Feeds the data-completeness insight and lets the presentation layer
    /// hide filter controls that can never match.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|&f| !self.records.iter().any(|r| r.has_value(f)))
            .collect()
    }

    /// Sorted distinct values of a categorical field across all records.
    pub fn distinct_values(&self, field: Field) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .records
            .iter()
            .filter_map(|r| r.category(field))
            .collect();
        set.into_iter().map(str::to_string).collect()
    }
}

// ── FilterCriteria ────────────────────────────────────────────────────────────

/// The set of predicates a user has enabled on the dashboard controls.
///
/// Each predicate is independently optional: a `None` date range or an empty
/// allowed-set places no restriction on that dimension. All active predicates
/// compose with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Inclusive calendar date range.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Allowed channels; empty means unrestricted.
    pub channels: BTreeSet<String>,
    /// Allowed customer types; empty means unrestricted.
    pub customer_types: BTreeSet<String>,
    /// Allowed businesses / branches; empty means unrestricted.
    pub businesses: BTreeSet<String>,
}

impl FilterCriteria {
    /// `true` when no predicate is active.
    pub fn is_unrestricted(&self) -> bool {
        self.date_range.is_none()
            && self.channels.is_empty()
            && self.customer_types.is_empty()
            && self.businesses.is_empty()
    }
}

// ── KpiSummary ────────────────────────────────────────────────────────────────

/// Top-level scalar metrics recomputed on every filter change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Sum of revenue over records that carry a revenue value.
    pub total_revenue: f64,
    /// Count of records with a revenue value.
    pub order_count: usize,
    /// `total_revenue / order_count`, defined as `0.0` when there are no orders.
    pub average_order_value: f64,
    /// `sum(conversions) / order_count`, or `None` when no record carries a
    /// conversions value. Presentation must distinguish `None` from zero.
    pub conversion_rate: Option<f64>,
}

// ── Breakdown ─────────────────────────────────────────────────────────────────

/// Categorical dimensions the aggregator can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    Channel,
    SalesRep,
    CustomerType,
    TimeOfDay,
    Week,
}

impl Dimension {
    /// Human-readable dimension title used in reports.
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Channel => "Channel",
            Dimension::SalesRep => "Sales Rep",
            Dimension::CustomerType => "Customer Type",
            Dimension::TimeOfDay => "Time of Day",
            Dimension::Week => "Week",
        }
    }
}

/// Aggregated metrics for one group within a [`Breakdown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// The group key, e.g. a channel name or an ISO week like `"2024-W07"`.
    pub key: String,
    /// Sum of revenue over the group's records.
    pub revenue: f64,
    /// Number of records in the group.
    pub count: usize,
    /// Mean order value within the group.
    pub mean_order_value: f64,
    /// Sum of conversions, or `None` when absent throughout the group.
    pub conversions: Option<u64>,
    /// `revenue / conversions`, or `None` when conversions are zero or absent.
    pub revenue_per_conversion: Option<f64>,
}

/// Grouped aggregate metrics keyed by one categorical dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// The dimension this breakdown groups by.
    pub dimension: Dimension,
    /// Group entries, already in presentation order (leaderboard or
    /// chronological depending on the dimension).
    pub entries: Vec<BreakdownEntry>,
}

impl Breakdown {
    /// Sum of revenue across all entries.
    pub fn total_revenue(&self) -> f64 {
        self.entries.iter().map(|e| e.revenue).sum()
    }

    /// Sum of record counts across all entries.
    pub fn total_count(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// The first `n` entries.
    pub fn top(&self, n: usize) -> &[BreakdownEntry] {
        &self.entries[..self.entries.len().min(n)]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
