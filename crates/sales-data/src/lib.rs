//! Data ingestion layer for the sales dashboard.
//!
//! Responsible for reading and parsing CSV/XLSX sales exports, mapping
//! arbitrary column headers onto the known schema, applying filter criteria
//! and aggregating records into KPIs, breakdowns and insights.

pub mod aggregator;
pub mod filter;
pub mod insights;
pub mod loader;
pub mod schema;

pub use sales_core as core;
