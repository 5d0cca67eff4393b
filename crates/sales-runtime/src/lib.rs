//! Session orchestration for the sales dashboard.
//!
//! Owns the loaded dataset and the active filter criteria, and recomputes the
//! derived dashboard snapshot whenever either changes.

pub mod session;

pub use session::{DashboardSnapshot, SessionContext};
