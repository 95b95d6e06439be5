//! Tax computation engine for a simulated filing walkthrough.
//!
//! Turns a complete or in-progress [`TaxReturn`] into a
//! [`ComputationResult`]: income totals, deduction choice, bracket tax,
//! self-employment tax, credits, state tax, and the refund or amount owed.
//! All constants come from a [`TaxYearTables`] value; the built-in tables
//! are [`TaxYearTables::y2025`].

pub mod calculations;
pub mod models;
pub mod tables;

pub use calculations::resolver::{ComputationResult, resolve_return};
pub use models::*;
pub use tables::{TablesError, TaxYearTables};
