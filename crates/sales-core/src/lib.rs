//! Core types for the sales dashboard.
//!
//! Holds the data model (records, datasets, filter criteria, KPI summaries
//! and breakdowns), the error taxonomy, report formatting helpers and the
//! CLI settings layer shared by every other crate in the workspace.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{DashboardError, Result};
