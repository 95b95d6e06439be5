//! Command-line host for the tax computation engine.
//!
//! Reads a return snapshot, resolves it against tax-year tables, and
//! renders the review-step summary.

pub mod input;
pub mod report;

pub use input::{ReturnFormat, ReturnInputError, load_return, parse_return};
pub use report::Summary;
