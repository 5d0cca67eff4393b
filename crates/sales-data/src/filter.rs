//! Filter application over a loaded dataset.
//!
//! All exclusion policy lives in [`record_matches`]: every other stage sees
//! only the records that survived. Filtering is conservative about absent
//! values, a record missing the attribute an active predicate tests is
//! excluded rather than waved through.

use sales_core::models::{Dataset, FilterCriteria, Record};
use tracing::debug;

// ── FilteredView ──────────────────────────────────────────────────────────────

/// The subset of a dataset that satisfies the active filter criteria.
///
/// Records keep their source order. `source_rows` preserves the size of the
/// full dataset for the "N of M rows" presentation line.
#[derive(Debug, Clone)]
pub struct FilteredView {
    /// Surviving records in source order.
    pub records: Vec<Record>,
    /// Row count of the unfiltered dataset.
    pub source_rows: usize,
}

impl FilteredView {
    /// Number of surviving records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when no record survived the filters.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Apply `criteria` to `dataset`, preserving record order.
pub fn apply_filters(dataset: &Dataset, criteria: &FilterCriteria) -> FilteredView {
    let records: Vec<Record> = dataset
        .records
        .iter()
        .filter(|r| record_matches(r, criteria))
        .cloned()
        .collect();
    debug!(
        "filters kept {} of {} records",
        records.len(),
        dataset.len()
    );
    FilteredView {
        records,
        source_rows: dataset.len(),
    }
}

/// Decide whether one record satisfies every active predicate.
///
/// A record with no value for a tested attribute fails that predicate. An
/// inactive predicate (no date range, empty allowed-set) always passes.
pub fn record_matches(record: &Record, criteria: &FilterCriteria) -> bool {
    if let Some((from, to)) = criteria.date_range {
        match record.date {
            Some(d) if d >= from && d <= to => {}
            _ => return false,
        }
    }
    if !criteria.channels.is_empty() {
        match &record.channel {
            Some(c) if criteria.channels.contains(c) => {}
            _ => return false,
        }
    }
    if !criteria.customer_types.is_empty() {
        match &record.customer_type {
            Some(c) if criteria.customer_types.contains(c) => {}
            _ => return false,
        }
    }
    if !criteria.businesses.is_empty() {
        match &record.business {
            Some(b) if criteria.businesses.contains(b) => {}
            _ => return false,
        }
    }
    true
}

// ── Tests ─────────────────────────────────────────────────────────────────────
