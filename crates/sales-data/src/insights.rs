//! Rule-based executive recommendations.
//!
//! Each rule inspects the aggregated state and emits zero or more plain
//! sentences. Rules run in a fixed order so the recommendation list is
//! deterministic for a given snapshot; a rule whose inputs are absent simply
//! contributes nothing.

use sales_core::formatting::format_currency;
use sales_core::models::{Breakdown, Field, KpiSummary};
use tracing::debug;

use crate::aggregator::DashboardBreakdowns;

// ── Context ───────────────────────────────────────────────────────────────────

/// Everything a rule is allowed to look at.
pub struct InsightContext<'a> {
    pub kpis: &'a KpiSummary,
    pub breakdowns: &'a DashboardBreakdowns,
    /// Semantic fields absent from the whole dataset.
    pub missing_fields: &'a [Field],
    /// Minimum orders a rep needs before the coaching rule considers them.
    pub min_coaching_orders: usize,
}

/// One recommendation rule.
pub trait InsightRule {
    /// Stable rule name, used for logging.
    fn name(&self) -> &'static str;

    /// Produce zero or more recommendation sentences.
    fn evaluate(&self, ctx: &InsightContext) -> Vec<String>;
}

/// The standard rule set, in presentation order.
pub fn default_rules() -> Vec<Box<dyn InsightRule>> {
    vec![
        Box::new(ChannelFocusRule),
        Box::new(PeakWindowRule),
        Box::new(RepCoachingRule),
        Box::new(DataGapRule),
    ]
}

/// Run `rules` against `ctx` and collect the sentences in rule order.
pub fn generate_insights(rules: &[Box<dyn InsightRule>], ctx: &InsightContext) -> Vec<String> {
    let mut out = Vec::new();
    for rule in rules {
        let produced = rule.evaluate(ctx);
        debug!("rule {} produced {} insight(s)", rule.name(), produced.len());
        out.extend(produced);
    }
    out
}

// ── ChannelFocusRule ──────────────────────────────────────────────────────────

/// Picks the channels to invest in and to review.
///
/// With conversion data the ranking uses revenue per conversion and also
/// flags the weakest channel; without it the rule falls back to naming the
/// revenue leader.
pub struct ChannelFocusRule;

impl InsightRule for ChannelFocusRule {
    fn name(&self) -> &'static str {
        "channel-focus"
    }

    fn evaluate(&self, ctx: &InsightContext) -> Vec<String> {
        let channels = &ctx.breakdowns.channels;
        let mut ranked: Vec<(&str, f64)> = channels
            .entries
            .iter()
            .filter_map(|e| e.revenue_per_conversion.map(|r| (e.key.as_str(), r)))
            .collect();

        if ranked.is_empty() {
            // No conversion data anywhere; recommend the revenue leader.
            return match channels.entries.first() {
                Some(top) if top.revenue > 0.0 => vec![format!(
                    "Double down on {} - it leads all channels at {} revenue.",
                    top.key,
                    format_currency(top.revenue)
                )],
                _ => vec![],
            };
        }

        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        let mut out = Vec::new();
        let (best, best_rate) = ranked[0];
        out.push(format!(
            "Focus investment on {} - highest revenue per conversion (~{}).",
            best,
            format_currency(best_rate)
        ));
        if ranked.len() > 1 {
            let (worst, worst_rate) = ranked[ranked.len() - 1];
            out.push(format!(
                "Review or optimize {} - lowest revenue per conversion (~{}).",
                worst,
                format_currency(worst_rate)
            ));
        }
        out
    }
}

// ── PeakWindowRule ────────────────────────────────────────────────────────────

/// Names the time-of-day bucket with the highest revenue.
pub struct PeakWindowRule;

impl InsightRule for PeakWindowRule {
    fn name(&self) -> &'static str {
        "peak-window"
    }

    fn evaluate(&self, ctx: &InsightContext) -> Vec<String> {
        let peak = ctx
            .breakdowns
            .time_of_day
            .entries
            .iter()
            .max_by(|a, b| {
                a.revenue
                    .partial_cmp(&b.revenue)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .filter(|e| e.revenue > 0.0);
        match peak {
            Some(e) => vec![format!(
                "Peak selling window: {}. Schedule campaigns and staffing around it.",
                e.key
            )],
            None => vec![],
        }
    }
}

// ── RepCoachingRule ───────────────────────────────────────────────────────────

/// Flags the rep with the lowest average order value for coaching.
///
/// Reps below the minimum order count are ignored so a single small deal does
/// not single anyone out.
pub struct RepCoachingRule;

impl RepCoachingRule {
    fn candidate<'a>(breakdown: &'a Breakdown, min_orders: usize) -> Option<&'a str> {
        breakdown
            .entries
            .iter()
            .filter(|e| e.count >= min_orders && e.mean_order_value > 0.0)
            .min_by(|a, b| {
                a.mean_order_value
                    .partial_cmp(&b.mean_order_value)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|e| e.key.as_str())
    }
}

impl InsightRule for RepCoachingRule {
    fn name(&self) -> &'static str {
        "rep-coaching"
    }

    fn evaluate(&self, ctx: &InsightContext) -> Vec<String> {
        let reps = &ctx.breakdowns.sales_reps;
        // Nothing to compare against a single qualifying rep.
        if reps
            .entries
            .iter()
            .filter(|e| e.count >= ctx.min_coaching_orders)
            .count()
            < 2
        {
            return vec![];
        }
        match Self::candidate(reps, ctx.min_coaching_orders) {
            Some(rep) => {
                let entry = reps.entries.iter().find(|e| e.key == rep);
                let value = entry.map(|e| e.mean_order_value).unwrap_or_default();
                vec![format!(
                    "Coach {} on upselling - average order value {} trails the team.",
                    rep,
                    format_currency(value)
                )]
            }
            None => vec![],
        }
    }
}

// ── DataGapRule ───────────────────────────────────────────────────────────────

/// Notes which semantic columns the source file never provided.
pub struct DataGapRule;

impl InsightRule for DataGapRule {
    fn name(&self) -> &'static str {
        "data-gap"
    }

    fn evaluate(&self, ctx: &InsightContext) -> Vec<String> {
        if ctx.missing_fields.is_empty() {
            return vec![];
        }
        let names: Vec<&str> = ctx
            .missing_fields
            .iter()
            .map(Field::display_name)
            .collect();
        vec![format!(
            "Data gaps limit this analysis: no {} column(s) in the source. Export them for deeper insights.",
            names.join(", ")
        )]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
