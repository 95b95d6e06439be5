//! Child Tax Credit, Credit for Other Dependents, and the refundable
//! Additional Child Tax Credit.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CreditFamily, IneligibilityReason};
use crate::calculations::common::floor_zero;
use crate::models::{ByFilingStatus, Dependent, FilingStatusCode, age_on};
use crate::tables::{TablesError, check_non_negative, check_rate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTaxCreditConfig {
    pub per_child: Decimal,
    /// A child must be younger than this at year end.
    pub age_limit: u32,
    pub other_dependent: Decimal,
    /// Refundable (ACTC) ceiling per qualifying child.
    pub refundable_per_child: Decimal,
    pub refundable_earned_income_threshold: Decimal,
    pub refundable_rate: Decimal,
    pub phase_out_threshold: ByFilingStatus<Decimal>,
    /// The credit drops by `phase_out_reduction` for each `phase_out_step`
    /// of AGI (or fraction of one) above the threshold.
    pub phase_out_step: Decimal,
    pub phase_out_reduction: Decimal,
}

impl ChildTaxCreditConfig {
    pub fn validate(&self) -> Result<(), TablesError> {
        check_non_negative("ctc per child", self.per_child)?;
        check_non_negative("ctc other dependent", self.other_dependent)?;
        check_non_negative("ctc refundable per child", self.refundable_per_child)?;
        check_non_negative(
            "ctc refundable earned income threshold",
            self.refundable_earned_income_threshold,
        )?;
        check_rate("ctc refundable rate", self.refundable_rate)?;
        for (status, threshold) in self.phase_out_threshold.iter() {
            check_non_negative(&format!("ctc phase-out {}", status.as_str()), *threshold)?;
        }
        if self.phase_out_step <= Decimal::ZERO {
            return Err(TablesError::NonPositiveAmount {
                section: "ctc phase-out step".to_string(),
                value: self.phase_out_step,
            });
        }
        check_non_negative("ctc phase-out reduction", self.phase_out_reduction)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTaxCreditResult {
    pub qualifying_children: u32,
    pub other_dependents: u32,
    pub credit_before_phase_out: Decimal,
    pub phase_out_reduction: Decimal,
    pub credit_after_phase_out: Decimal,
    /// Portion used against tax liability.
    pub nonrefundable: Decimal,
    /// Additional Child Tax Credit.
    pub refundable: Decimal,
}

impl ChildTaxCreditResult {
    pub fn total(&self) -> Decimal {
        self.nonrefundable + self.refundable
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChildCreditInputs<'a> {
    pub filing_status: FilingStatusCode,
    pub adjusted_gross_income: Decimal,
    pub earned_income: Decimal,
    /// Income tax left after credits applied earlier in the ordering.
    pub tax_liability: Decimal,
    pub dependents: &'a [Dependent],
    pub year_end: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct ChildTaxCredit<'a> {
    config: &'a ChildTaxCreditConfig,
}

impl<'a> ChildTaxCredit<'a> {
    pub fn new(config: &'a ChildTaxCreditConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(
        &self,
        inputs: &ChildCreditInputs<'_>,
        reasons: &mut Vec<IneligibilityReason>,
    ) -> ChildTaxCreditResult {
        if inputs.dependents.is_empty() {
            return ChildTaxCreditResult::default();
        }

        let mut qualifying_children = 0u32;
        let mut other_dependents = 0u32;
        for dependent in inputs.dependents {
            match self.child_test(dependent, inputs.year_end) {
                Ok(()) => qualifying_children += 1,
                Err(reason) => {
                    other_dependents += 1;
                    reasons.push(IneligibilityReason::new(CreditFamily::ChildTax, reason));
                }
            }
        }

        let credit_before_phase_out = self.config.per_child * Decimal::from(qualifying_children)
            + self.config.other_dependent * Decimal::from(other_dependents);
        let phase_out_reduction = self.phase_out_reduction(inputs);
        let credit_after_phase_out = floor_zero(credit_before_phase_out - phase_out_reduction);

        if credit_before_phase_out > Decimal::ZERO && credit_after_phase_out == Decimal::ZERO {
            reasons.push(IneligibilityReason::new(
                CreditFamily::ChildTax,
                format!(
                    "AGI {} is high enough to phase out the credit entirely",
                    inputs.adjusted_gross_income
                ),
            ));
        }

        let nonrefundable = credit_after_phase_out.min(floor_zero(inputs.tax_liability));
        let refundable = self.refundable(
            credit_after_phase_out - nonrefundable,
            qualifying_children,
            inputs.earned_income,
        );

        debug!(
            qualifying_children,
            other_dependents,
            credit = %credit_after_phase_out,
            refundable = %refundable,
            "Evaluated child tax credit"
        );

        ChildTaxCreditResult {
            qualifying_children,
            other_dependents,
            credit_before_phase_out,
            phase_out_reduction,
            credit_after_phase_out,
            nonrefundable,
            refundable,
        }
    }

    /// `Ok` if the dependent is a qualifying child for the full credit,
    /// otherwise the reason they only count as an other dependent.
    fn child_test(
        &self,
        dependent: &Dependent,
        year_end: NaiveDate,
    ) -> Result<(), String> {
        let name = if dependent.first_name.is_empty() {
            "Dependent"
        } else {
            dependent.first_name.as_str()
        };

        if !dependent.is_qualifying_child {
            return Err(format!("{name} does not meet the qualifying child tests"));
        }
        let Some(born) = dependent.date_of_birth else {
            return Err(format!("{name} has no date of birth entered"));
        };
        let Some(age) = age_on(born, year_end) else {
            return Err(format!("{name} was born after the end of the tax year ({born})"));
        };
        if age >= self.config.age_limit {
            return Err(format!(
                "{name} is {age} at year end; the limit is under {}",
                self.config.age_limit
            ));
        }
        if !dependent.has_ssn {
            return Err(format!("{name} has no social security number"));
        }
        Ok(())
    }

    /// `reduction × ceil(excess / step)` for AGI above the threshold.
    fn phase_out_reduction(
        &self,
        inputs: &ChildCreditInputs<'_>,
    ) -> Decimal {
        let threshold = *self.config.phase_out_threshold.get(inputs.filing_status);
        let excess = floor_zero(inputs.adjusted_gross_income - threshold);
        if excess == Decimal::ZERO {
            return Decimal::ZERO;
        }
        (excess / self.config.phase_out_step).ceil() * self.config.phase_out_reduction
    }

    fn refundable(
        &self,
        unused: Decimal,
        qualifying_children: u32,
        earned_income: Decimal,
    ) -> Decimal {
        let per_child_cap = self.config.refundable_per_child * Decimal::from(qualifying_children);
        let earned_cap = floor_zero(earned_income - self.config.refundable_earned_income_threshold)
            * self.config.refundable_rate;
        unused.min(per_child_cap).min(earned_cap)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::tables::TaxYearTables;

    fn year_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
    }

    fn child(
        name: &str,
        born: (i32, u32, u32),
    ) -> Dependent {
        Dependent {
            first_name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(born.0, born.1, born.2),
            is_qualifying_child: true,
            ..Default::default()
        }
    }

    fn evaluate(
        status: FilingStatusCode,
        agi: Decimal,
        tax_liability: Decimal,
        dependents: &[Dependent],
    ) -> (ChildTaxCreditResult, Vec<IneligibilityReason>) {
        let tables = TaxYearTables::y2025();
        let mut reasons = Vec::new();
        let inputs = ChildCreditInputs {
            filing_status: status,
            adjusted_gross_income: agi,
            earned_income: agi,
            tax_liability,
            dependents,
            year_end: year_end(),
        };
        let result = ChildTaxCredit::new(&tables.child_tax_credit).evaluate(&inputs, &mut reasons);
        (result, reasons)
    }

    #[test]
    fn no_dependents_no_credit() {
        let (result, reasons) = evaluate(
            FilingStatusCode::Single,
            dec!(50000),
            dec!(4000),
            &[],
        );

        assert_eq!(result, ChildTaxCreditResult::default());
        assert!(reasons.is_empty());
    }

    #[test]
    fn one_child_fully_nonrefundable_when_tax_covers_it() {
        let (result, reasons) = evaluate(
            FilingStatusCode::MarriedFilingJointly,
            dec!(85000),
            dec!(6123),
            &[child("Ava", (2018, 4, 2))],
        );

        assert!(reasons.is_empty());
        assert_eq!(result.qualifying_children, 1);
        assert_eq!(result.nonrefundable, dec!(2000));
        assert_eq!(result.refundable, Decimal::ZERO);
    }

    #[test]
    fn seventeen_year_old_counts_as_other_dependent() {
        let (result, reasons) = evaluate(
            FilingStatusCode::HeadOfHousehold,
            dec!(60000),
            dec!(5000),
            &[child("Leo", (2008, 3, 1))],
        );

        assert_eq!(result.qualifying_children, 0);
        assert_eq!(result.other_dependents, 1);
        assert_eq!(result.credit_after_phase_out, dec!(500));
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].family, CreditFamily::ChildTax);
    }

    #[test]
    fn child_without_birth_date_is_other_dependent() {
        let dependent = Dependent {
            first_name: "Kai".to_string(),
            is_qualifying_child: true,
            ..Default::default()
        };

        let (result, reasons) =
            evaluate(FilingStatusCode::Single, dec!(40000), dec!(3000), &[dependent]);

        assert_eq!(result.other_dependents, 1);
        assert_eq!(
            reasons,
            vec![IneligibilityReason::new(
                CreditFamily::ChildTax,
                "Kai has no date of birth entered"
            )]
        );
    }

    #[test]
    fn child_born_after_year_end_is_other_dependent() {
        let (result, reasons) = evaluate(
            FilingStatusCode::Single,
            dec!(40000),
            dec!(3000),
            &[child("Ivy", (2026, 1, 15))],
        );

        assert_eq!(result.qualifying_children, 0);
        assert_eq!(result.other_dependents, 1);
        assert_eq!(
            reasons,
            vec![IneligibilityReason::new(
                CreditFamily::ChildTax,
                "Ivy was born after the end of the tax year (2026-01-15)"
            )]
        );
    }

    #[test]
    fn unused_credit_becomes_refundable_up_to_limits() {
        let (result, _) = evaluate(
            FilingStatusCode::HeadOfHousehold,
            dec!(20000),
            dec!(300),
            &[child("Mia", (2015, 1, 1)), child("Noah", (2019, 6, 30))],
        );

        assert_eq!(result.credit_after_phase_out, dec!(4000));
        assert_eq!(result.nonrefundable, dec!(300));
        // min(3700 unused, 2 × 1700, 15% × (20000 − 2500) = 2625)
        assert_eq!(result.refundable, dec!(2625));
    }

    #[test]
    fn phase_out_reduces_fifty_per_thousand_or_fraction() {
        let (result, _) = evaluate(
            FilingStatusCode::Single,
            dec!(210000.01),
            dec!(40000),
            &[child("Eli", (2016, 2, 2))],
        );

        // 10,000.01 over → 11 steps → 550
        assert_eq!(result.phase_out_reduction, dec!(550));
        assert_eq!(result.credit_after_phase_out, dec!(1450));
    }

    #[test]
    fn fully_phased_out_records_reason() {
        let (result, reasons) = evaluate(
            FilingStatusCode::Single,
            dec!(260000),
            dec!(50000),
            &[child("Eli", (2016, 2, 2))],
        );

        assert_eq!(result.credit_after_phase_out, Decimal::ZERO);
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].reason.contains("phase out"));
    }

    #[test]
    fn other_dependent_credit_is_not_refundable() {
        let (result, _) = evaluate(
            FilingStatusCode::Single,
            dec!(30000),
            Decimal::ZERO,
            &[child("Zoe", (2000, 1, 1))],
        );

        assert_eq!(result.credit_after_phase_out, dec!(500));
        assert_eq!(result.total(), Decimal::ZERO);
    }
}
