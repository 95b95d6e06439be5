//! Standard versus itemized deduction.
//!
//! The resolver totals the Schedule A categories under the year's limits,
//! compares the total against the standard deduction for the filing status,
//! takes the larger, and derives taxable income from AGI.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{amount, floor_zero, max};
use crate::models::{ByFilingStatus, Deductions, FilingStatusCode};
use crate::tables::{TablesError, check_non_negative, check_rate};

/// Limits applied to itemized categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedLimits {
    /// Cap on the state and local tax deduction.
    pub salt_cap: ByFilingStatus<Decimal>,
    /// Medical expenses are deductible only above this share of AGI.
    pub medical_agi_floor: Decimal,
    /// Charitable gifts are deductible up to this share of AGI.
    pub charitable_agi_limit: Decimal,
}

impl ItemizedLimits {
    pub fn validate(&self) -> Result<(), TablesError> {
        for (status, cap) in self.salt_cap.iter() {
            check_non_negative(&format!("salt cap {}", status.as_str()), *cap)?;
        }
        check_rate("medical agi floor", self.medical_agi_floor)?;
        check_rate("charitable agi limit", self.charitable_agi_limit)?;
        Ok(())
    }
}

/// Standard deduction limit for a filer someone else can claim.
///
/// The deduction is the larger of `minimum` and earned income plus
/// `earned_income_addition`, but never more than the regular amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentDeductionLimit {
    pub minimum: Decimal,
    pub earned_income_addition: Decimal,
}

impl DependentDeductionLimit {
    pub fn validate(&self) -> Result<(), TablesError> {
        check_non_negative("dependent deduction minimum", self.minimum)?;
        check_non_negative(
            "dependent deduction earned income addition",
            self.earned_income_addition,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionMethod {
    Standard,
    Itemized,
}

/// Itemized categories after limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedBreakdown {
    pub medical: Decimal,
    pub state_local_taxes: Decimal,
    pub mortgage_interest: Decimal,
    pub charitable: Decimal,
    pub other: Decimal,
}

impl ItemizedBreakdown {
    pub fn total(&self) -> Decimal {
        self.medical + self.state_local_taxes + self.mortgage_interest + self.charitable + self.other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionResult {
    pub standard_deduction: Decimal,
    pub itemized: ItemizedBreakdown,
    pub itemized_total: Decimal,
    pub selected_deduction: Decimal,
    pub method: DeductionMethod,
    pub taxable_income: Decimal,
}

/// Inputs the resolver needs beyond the deduction line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeductionContext {
    pub filing_status: FilingStatusCode,
    pub adjusted_gross_income: Decimal,
    pub can_be_claimed_as_dependent: bool,
    /// Only consulted for a dependent filer.
    pub earned_income: Decimal,
}

#[derive(Debug, Clone)]
pub struct DeductionResolver<'a> {
    standard: &'a ByFilingStatus<Decimal>,
    dependent_limit: &'a DependentDeductionLimit,
    limits: &'a ItemizedLimits,
}

impl<'a> DeductionResolver<'a> {
    pub fn new(
        standard: &'a ByFilingStatus<Decimal>,
        dependent_limit: &'a DependentDeductionLimit,
        limits: &'a ItemizedLimits,
    ) -> Self {
        Self {
            standard,
            dependent_limit,
            limits,
        }
    }

    /// Selects the larger of standard and itemized and derives taxable
    /// income, which is never negative.
    pub fn resolve(
        &self,
        context: &DeductionContext,
        deductions: &Deductions,
    ) -> DeductionResult {
        let standard_deduction = self.standard_deduction(context);
        let itemized = self.itemized(context, deductions);
        let itemized_total = itemized.total();

        let (selected_deduction, method) = if itemized_total > standard_deduction {
            (itemized_total, DeductionMethod::Itemized)
        } else {
            (standard_deduction, DeductionMethod::Standard)
        };

        let taxable_income = floor_zero(context.adjusted_gross_income - selected_deduction);

        debug!(
            standard = %standard_deduction,
            itemized = %itemized_total,
            ?method,
            taxable_income = %taxable_income,
            "Resolved deduction"
        );

        DeductionResult {
            standard_deduction,
            itemized,
            itemized_total,
            selected_deduction,
            method,
            taxable_income,
        }
    }

    /// Standard deduction for the filing status, limited for a dependent
    /// filer.
    pub fn standard_deduction(
        &self,
        context: &DeductionContext,
    ) -> Decimal {
        let regular = *self.standard.get(context.filing_status);
        if !context.can_be_claimed_as_dependent {
            return regular;
        }
        let limited = max(
            self.dependent_limit.minimum,
            context.earned_income + self.dependent_limit.earned_income_addition,
        );
        limited.min(regular)
    }

    fn itemized(
        &self,
        context: &DeductionContext,
        deductions: &Deductions,
    ) -> ItemizedBreakdown {
        let agi = floor_zero(context.adjusted_gross_income);

        let medical = floor_zero(
            amount(deductions.medical, "deductions.medical") - agi * self.limits.medical_agi_floor,
        );
        let state_local_taxes = amount(deductions.state_local_taxes, "deductions.state_local_taxes")
            .min(*self.limits.salt_cap.get(context.filing_status));
        let mortgage_interest = amount(deductions.mortgage_interest, "deductions.mortgage_interest");
        let charitable = amount(deductions.charitable, "deductions.charitable")
            .min(agi * self.limits.charitable_agi_limit);
        let other = amount(deductions.other, "deductions.other");

        ItemizedBreakdown {
            medical,
            state_local_taxes,
            mortgage_interest,
            charitable,
            other,
        }
    }
}
