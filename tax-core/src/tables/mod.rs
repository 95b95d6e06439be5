//! Tax-year tables.
//!
//! [`TaxYearTables`] holds every constant the engine reads for one tax
//! year. The built-in 2025 tables come from [`TaxYearTables::y2025`];
//! tables loaded from external data must pass [`TaxYearTables::validate`]
//! before they are handed to the engine, which never re-checks them.

mod y2025;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::credits::{
    ChildTaxCreditConfig, EarnedIncomeCreditTable, EducationCreditLimits,
};
use crate::calculations::deduction::{DependentDeductionLimit, ItemizedLimits};
use crate::calculations::self_emp::SeTaxConfig;
use crate::calculations::state::StateTable;
use crate::models::{BracketTable, ByFilingStatus};

/// A table value that breaks an invariant the engine relies on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TablesError {
    #[error("{section}: rate {value} must be between 0 and 1")]
    InvalidRate { section: String, value: Decimal },

    #[error("{section}: amount {value} must not be negative")]
    NegativeAmount { section: String, value: Decimal },

    #[error("{section}: amount {value} must be greater than zero")]
    NonPositiveAmount { section: String, value: Decimal },

    #[error("{section}: bracket table is empty")]
    EmptyBrackets { section: String },

    #[error("{section}: first bracket must start at 0, found {value}")]
    FirstBracketNotZero { section: String, value: Decimal },

    #[error("{section}: bracket bounds must strictly increase ({previous} then {next})")]
    UnorderedBrackets {
        section: String,
        previous: Decimal,
        next: Decimal,
    },

    #[error("{section}: phase-out start {start} must be below end {end}")]
    InvalidPhaseOut {
        section: String,
        start: Decimal,
        end: Decimal,
    },

    #[error("{section}: at least one schedule is required")]
    EmptySchedules { section: String },

    #[error("net earnings factor must be greater than 0 and at most 1, got {0}")]
    InvalidNetEarningsFactor(Decimal),

    #[error("'{0}' is not a US state or DC postal code")]
    UnknownStateCode(String),
}

/// Checks that `value` lies in `[0, 1]`.
pub fn check_rate(
    section: &str,
    value: Decimal,
) -> Result<(), TablesError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(TablesError::InvalidRate {
            section: section.to_string(),
            value,
        });
    }
    Ok(())
}

pub fn check_non_negative(
    section: &str,
    value: Decimal,
) -> Result<(), TablesError> {
    if value < Decimal::ZERO {
        return Err(TablesError::NegativeAmount {
            section: section.to_string(),
            value,
        });
    }
    Ok(())
}

/// Every constant for one simulated tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearTables {
    pub tax_year: i32,
    pub federal_brackets: ByFilingStatus<BracketTable>,
    pub standard_deduction: ByFilingStatus<Decimal>,
    pub dependent_deduction: DependentDeductionLimit,
    pub itemized: ItemizedLimits,
    pub self_employment: SeTaxConfig,
    /// Schedule C standard mileage rate per business mile.
    pub mileage_rate: Decimal,
    pub education: EducationCreditLimits,
    pub child_tax_credit: ChildTaxCreditConfig,
    pub earned_income_credit: EarnedIncomeCreditTable,
    pub states: StateTable,
}

impl TaxYearTables {
    /// Checks every section, returning the first violation found.
    ///
    /// # Errors
    ///
    /// Returns [`TablesError`] when brackets are empty or unordered, a rate
    /// falls outside `[0, 1]`, an amount is negative, a phase-out range is
    /// inverted, or a state key is not a US postal code.
    pub fn validate(&self) -> Result<(), TablesError> {
        for (status, table) in self.federal_brackets.iter() {
            table.validate(&format!("federal {}", status.as_str()))?;
        }
        for (status, amount) in self.standard_deduction.iter() {
            check_non_negative(&format!("standard deduction {}", status.as_str()), *amount)?;
        }
        self.dependent_deduction.validate()?;
        self.itemized.validate()?;
        self.self_employment.validate()?;
        check_non_negative("mileage rate", self.mileage_rate)?;
        self.education.validate()?;
        self.child_tax_credit.validate()?;
        self.earned_income_credit.validate()?;
        self.states.validate()
    }
}
