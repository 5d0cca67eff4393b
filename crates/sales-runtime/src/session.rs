//! Dashboard session state and snapshot recomputation.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use sales_core::error::{DashboardError, Result};
use sales_core::models::{Dataset, FilterCriteria, KpiSummary};
use sales_data::aggregator::{compute_breakdowns, compute_kpis, DashboardBreakdowns};
use sales_data::filter::{apply_filters, FilteredView};
use sales_data::insights::{default_rules, generate_insights, InsightContext};

// ── DashboardSnapshot ─────────────────────────────────────────────────────────

/// One complete, internally consistent dashboard state.
///
/// Built atomically by [`SessionContext::recompute`]: every aggregate in the
/// snapshot derives from the same filtered view, so KPIs, breakdowns and
/// insights can never disagree about which records they describe.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    /// Display name of the source file.
    pub source_name: String,
    /// Row count of the unfiltered dataset.
    pub source_rows: usize,
    /// Rows surviving the active filters.
    pub filtered_rows: usize,
    /// Earliest and latest dates among surviving records.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Scalar KPIs over the surviving records.
    pub kpis: KpiSummary,
    /// Grouped aggregates over the surviving records.
    pub breakdowns: DashboardBreakdowns,
    /// Executive recommendations in rule order.
    pub insights: Vec<String>,
    /// When this snapshot was computed.
    pub generated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// `true` when at least one record survived the filters.
    pub fn has_data(&self) -> bool {
        self.filtered_rows > 0
    }
}

// ── SessionContext ────────────────────────────────────────────────────────────

/// Holds one user session: the dataset, the filter criteria and the latest
/// snapshot.
///
/// The snapshot is replaced wholesale on every recompute; callers never see a
/// half-updated state.
#[derive(Debug, Default)]
pub struct SessionContext {
    dataset: Option<Dataset>,
    criteria: FilterCriteria,
    snapshot: Option<DashboardSnapshot>,
    min_coaching_orders: usize,
}

impl SessionContext {
    pub fn new(min_coaching_orders: usize) -> Self {
        SessionContext {
            min_coaching_orders,
            ..SessionContext::default()
        }
    }

    /// Replace the dataset. Discards the stale snapshot; filters carry over.
    pub fn load_dataset(&mut self, dataset: Dataset) {
        debug!(
            "session dataset replaced: {:?} ({} records)",
            dataset.source_name,
            dataset.len()
        );
        self.dataset = Some(dataset);
        self.snapshot = None;
    }

    /// Replace the filter criteria. Discards the stale snapshot.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.snapshot = None;
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// The latest snapshot, if one has been computed since the last change.
    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    /// Recompute the snapshot from the current dataset and criteria.
    ///
    /// The new snapshot is assembled completely before it replaces the old
    /// one. Fails when no dataset has been loaded.
    pub fn recompute(&mut self) -> Result<&DashboardSnapshot> {
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| DashboardError::Config("no dataset loaded".to_string()))?;

        let view = apply_filters(dataset, &self.criteria);
        let snapshot = build_snapshot(dataset, &view, self.min_coaching_orders);
        debug!(
            "snapshot rebuilt: {} of {} rows, {} insight(s)",
            snapshot.filtered_rows,
            snapshot.source_rows,
            snapshot.insights.len()
        );

        Ok(self.snapshot.insert(snapshot))
    }
}

/// Assemble a snapshot from a filtered view.
fn build_snapshot(
    dataset: &Dataset,
    view: &FilteredView,
    min_coaching_orders: usize,
) -> DashboardSnapshot {
    let kpis = compute_kpis(&view.records);
    let breakdowns = compute_breakdowns(view);
    // Completeness is a property of the source file, not of the current
    // filter, so it is measured over the whole dataset.
    let missing_fields = dataset.missing_fields();
    let insights = generate_insights(
        &default_rules(),
        &InsightContext {
            kpis: &kpis,
            breakdowns: &breakdowns,
            missing_fields: &missing_fields,
            min_coaching_orders,
        },
    );

    let mut dates = view.records.iter().filter_map(|r| r.date);
    let date_range = dates.next().map(|first| {
        dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)))
    });

    DashboardSnapshot {
        source_name: dataset.source_name.clone(),
        source_rows: view.source_rows,
        filtered_rows: view.len(),
        date_range,
        kpis,
        breakdowns,
        insights,
        generated_at: Utc::now(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sales_core::models::Record;
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_dataset() -> Dataset {
        let make = |d: NaiveDate, rev: f64, channel: &str| Record {
            date: Some(d),
            revenue: Some(rev),
            channel: Some(channel.to_string()),
            ..Record::default()
        };
        Dataset {
            records: vec![
                make(date(2024, 2, 5), 1200.50, "Online"),
                make(date(2024, 2, 6), 2300.00, "Retail"),
                make(date(2024, 2, 7), 1189.50, "Social Media"),
            ],
            headers: vec![
                "Date".to_string(),
                "Revenue".to_string(),
                "Channel".to_string(),
            ],
            source_name: "sales.csv".to_string(),
        }
    }

    #[test]
    fn test_recompute_without_dataset_fails() {
        let mut session = SessionContext::new(3);
        assert!(matches!(
            session.recompute(),
            Err(DashboardError::Config(_))
        ));
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn test_recompute_builds_consistent_snapshot() {
        let mut session = SessionContext::new(3);
        session.load_dataset(sample_dataset());
        let snapshot = session.recompute().expect("recompute");

        assert_eq!(snapshot.source_rows, 3);
        assert_eq!(snapshot.filtered_rows, 3);
        assert!((snapshot.kpis.total_revenue - 4690.0).abs() < 1e-9);
        assert_eq!(snapshot.kpis.order_count, 3);
        assert_eq!(snapshot.date_range, Some((date(2024, 2, 5), date(2024, 2, 7))));
        assert_eq!(snapshot.breakdowns.channels.entries[0].key, "Retail");
        assert!(snapshot.has_data());
    }

    #[test]
    fn test_load_dataset_discards_snapshot() {
        let mut session = SessionContext::new(3);
        session.load_dataset(sample_dataset());
        session.recompute().expect("recompute");
        assert!(session.snapshot().is_some());

        session.load_dataset(sample_dataset());
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn test_set_criteria_discards_snapshot_and_restricts_view() {
        let mut session = SessionContext::new(3);
        session.load_dataset(sample_dataset());
        session.recompute().expect("recompute");

        let mut channels = BTreeSet::new();
        channels.insert("Retail".to_string());
        session.set_criteria(FilterCriteria {
            channels,
            ..FilterCriteria::default()
        });
        assert!(session.snapshot().is_none());

        let snapshot = session.recompute().expect("recompute");
        assert_eq!(snapshot.filtered_rows, 1);
        assert_eq!(snapshot.source_rows, 3);
        assert!((snapshot.kpis.total_revenue - 2300.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_filtered_out_yields_empty_snapshot() {
        let mut session = SessionContext::new(3);
        session.load_dataset(sample_dataset());

        let mut channels = BTreeSet::new();
        channels.insert("Print".to_string());
        session.set_criteria(FilterCriteria {
            channels,
            ..FilterCriteria::default()
        });

        let snapshot = session.recompute().expect("recompute");
        assert!(!snapshot.has_data());
        assert_eq!(snapshot.kpis.order_count, 0);
        assert_eq!(snapshot.kpis.average_order_value, 0.0);
        assert!(snapshot.kpis.conversion_rate.is_none());
        assert!(snapshot.breakdowns.channels.entries.is_empty());
        assert!(snapshot.date_range.is_none());
    }

    #[test]
    fn test_missing_fields_measured_on_whole_dataset() {
        // Filter everything out; the data-gap insight still reflects the file.
        let mut session = SessionContext::new(3);
        session.load_dataset(sample_dataset());

        let mut channels = BTreeSet::new();
        channels.insert("Print".to_string());
        session.set_criteria(FilterCriteria {
            channels,
            ..FilterCriteria::default()
        });

        let snapshot = session.recompute().expect("recompute");
        let gap = snapshot
            .insights
            .iter()
            .find(|i| i.contains("Data gaps"))
            .expect("gap insight");
        assert!(gap.contains("Conversions"));
    }
}
