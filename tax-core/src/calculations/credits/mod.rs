//! Credit engine.
//!
//! Evaluates every credit family against one return and applies them in a
//! fixed order:
//!
//! | Order | Credit | Kind |
//! |-------|--------|------|
//! | 1 | Education (AOTC non-refundable part, or LLC) | Limited by income tax |
//! | 2 | Child Tax Credit and Credit for Other Dependents | Limited by the income tax left after 1 |
//! | 3 | Additional Child Tax Credit | Refundable |
//! | 4 | Earned Income Credit | Refundable |
//! | 5 | AOTC refundable part | Refundable |
//!
//! Refundable credits are reported separately and treated as payments by
//! the return resolver. Ineligibility never fails the computation; it is
//! recorded as an [`IneligibilityReason`] and the credit is zero.

pub mod child;
pub mod earned_income;
pub mod education;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use child::{ChildCreditInputs, ChildTaxCredit, ChildTaxCreditConfig, ChildTaxCreditResult};
pub use earned_income::{
    EarnedIncomeCredit, EarnedIncomeCreditResult, EarnedIncomeCreditTable, EarnedIncomeInputs,
    EicSchedule,
};
pub use education::{
    AotcComputation, AotcLimits, EducationCreditLimits, EducationCreditResult, EducationCredits,
    EducationExpenses, EducationInputs, LlcComputation, LlcLimits,
};

use crate::calculations::common::floor_zero;
use crate::models::{EducationCreditChoice, FilingStatusCode, TaxReturn};
use crate::tables::TaxYearTables;

/// Credit a reason applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditFamily {
    ChildTax,
    EarnedIncome,
    AmericanOpportunity,
    LifetimeLearning,
}

impl CreditFamily {
    pub fn label(self) -> &'static str {
        match self {
            Self::ChildTax => "Child Tax Credit",
            Self::EarnedIncome => "Earned Income Credit",
            Self::AmericanOpportunity => "American Opportunity Credit",
            Self::LifetimeLearning => "Lifetime Learning Credit",
        }
    }
}

/// Why a credit was denied or reduced to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IneligibilityReason {
    pub family: CreditFamily,
    pub reason: String,
}

impl IneligibilityReason {
    pub fn new(
        family: CreditFamily,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            family,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditResult {
    pub child_tax_credit: ChildTaxCreditResult,
    pub earned_income_credit: EarnedIncomeCreditResult,
    pub education: EducationCreditResult,
    /// Non-refundable education credit actually used against income tax.
    pub education_applied: Decimal,
    /// Education plus Child Tax Credit used against income tax.
    pub nonrefundable_applied: Decimal,
    /// ACTC + EIC + refundable AOTC.
    pub refundable_total: Decimal,
    pub total_credits: Decimal,
    pub ineligibility: Vec<IneligibilityReason>,
}

impl CreditResult {
    /// The education credit the engine would pick without an override.
    pub fn recommended_credit(&self) -> EducationCreditChoice {
        self.education.recommended
    }

    pub fn reasons_for(
        &self,
        family: CreditFamily,
    ) -> impl Iterator<Item = &IneligibilityReason> {
        self.ineligibility
            .iter()
            .filter(move |reason| reason.family == family)
    }
}

/// Figures the credit engine needs that are computed earlier in the
/// return.
#[derive(Debug, Clone, Copy)]
pub struct CreditInputs<'a> {
    pub tax_return: &'a TaxReturn,
    pub filing_status: FilingStatusCode,
    pub adjusted_gross_income: Decimal,
    pub earned_income: Decimal,
    pub investment_income: Decimal,
    /// Income tax from the brackets, before any credit.
    pub income_tax: Decimal,
    pub year_end: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct CreditEngine<'a> {
    education: &'a EducationCreditLimits,
    child_tax_credit: &'a ChildTaxCreditConfig,
    earned_income_credit: &'a EarnedIncomeCreditTable,
}

impl<'a> CreditEngine<'a> {
    pub fn new(
        education: &'a EducationCreditLimits,
        child_tax_credit: &'a ChildTaxCreditConfig,
        earned_income_credit: &'a EarnedIncomeCreditTable,
    ) -> Self {
        Self {
            education,
            child_tax_credit,
            earned_income_credit,
        }
    }

    pub fn from_tables(tables: &'a TaxYearTables) -> Self {
        Self::new(
            &tables.education,
            &tables.child_tax_credit,
            &tables.earned_income_credit,
        )
    }

    pub fn evaluate(
        &self,
        inputs: &CreditInputs<'_>,
    ) -> CreditResult {
        let tax_return = inputs.tax_return;
        let personal = &tax_return.personal_info;
        let mut ineligibility = Vec::new();

        let education = EducationCredits::new(self.education).evaluate(
            &EducationInputs {
                filing_status: inputs.filing_status,
                adjusted_gross_income: inputs.adjusted_gross_income,
                can_be_claimed_as_dependent: personal.can_be_claimed_as_dependent,
                student: &personal.student,
                education: &tax_return.education,
                choice: tax_return.credits.education_choice,
            },
            &mut ineligibility,
        );

        let income_tax = floor_zero(inputs.income_tax);
        let education_applied = education.selected_nonrefundable().min(income_tax);
        let remaining_tax = income_tax - education_applied;

        let child_tax_credit = ChildTaxCredit::new(self.child_tax_credit).evaluate(
            &ChildCreditInputs {
                filing_status: inputs.filing_status,
                adjusted_gross_income: inputs.adjusted_gross_income,
                earned_income: inputs.earned_income,
                tax_liability: remaining_tax,
                dependents: &personal.dependents,
                year_end: inputs.year_end,
            },
            &mut ineligibility,
        );

        let earned_income_credit = EarnedIncomeCredit::new(self.earned_income_credit).evaluate(
            &EarnedIncomeInputs {
                filing_status: inputs.filing_status,
                adjusted_gross_income: inputs.adjusted_gross_income,
                earned_income: inputs.earned_income,
                investment_income: inputs.investment_income,
                can_be_claimed_as_dependent: personal.can_be_claimed_as_dependent,
                filer_age: personal
                    .date_of_birth
                    .and_then(|born| crate::models::age_on(born, inputs.year_end)),
                dependents: &personal.dependents,
                year_end: inputs.year_end,
            },
            &mut ineligibility,
        );

        let nonrefundable_applied = education_applied + child_tax_credit.nonrefundable;
        let refundable_total = child_tax_credit.refundable
            + earned_income_credit.amount
            + education.selected_refundable();

        debug!(
            nonrefundable = %nonrefundable_applied,
            refundable = %refundable_total,
            reasons = ineligibility.len(),
            "Applied credits"
        );

        CreditResult {
            child_tax_credit,
            earned_income_credit,
            education,
            education_applied,
            nonrefundable_applied,
            refundable_total,
            total_credits: nonrefundable_applied + refundable_total,
            ineligibility,
        }
    }
}
