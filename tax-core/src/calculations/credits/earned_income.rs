//! Earned Income Credit.
//!
//! The credit phases in with earned income up to a maximum, plateaus, then
//! phases out above a threshold measured on the larger of AGI and earned
//! income. Parameters depend on the number of qualifying children (capped at
//! the last schedule in the table).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CreditFamily, IneligibilityReason};
use crate::calculations::common::{floor_zero, max};
use crate::models::{ByFilingStatus, Dependent, FilingStatusCode};
use crate::tables::{TablesError, check_non_negative, check_rate};

/// Parameters for one count of qualifying children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EicSchedule {
    pub phase_in_rate: Decimal,
    pub earned_income_amount: Decimal,
    pub max_credit: Decimal,
    pub phase_out_rate: Decimal,
    pub phase_out_start: ByFilingStatus<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedIncomeCreditTable {
    /// Indexed by number of qualifying children; the last entry applies to
    /// that many children or more.
    pub schedules: Vec<EicSchedule>,
    pub investment_income_limit: Decimal,
    /// Age band (inclusive) a filer without qualifying children must be in.
    pub min_age_without_children: u32,
    pub max_age_without_children: u32,
    /// Children qualify under this age, or under `student_age_limit` when a
    /// full-time student.
    pub child_age_limit: u32,
    pub student_age_limit: u32,
}

impl EarnedIncomeCreditTable {
    pub fn validate(&self) -> Result<(), TablesError> {
        if self.schedules.is_empty() {
            return Err(TablesError::EmptySchedules {
                section: "earned income credit".to_string(),
            });
        }
        for (children, schedule) in self.schedules.iter().enumerate() {
            let section = format!("eic {children} children");
            check_rate(&section, schedule.phase_in_rate)?;
            check_rate(&section, schedule.phase_out_rate)?;
            check_non_negative(&section, schedule.earned_income_amount)?;
            check_non_negative(&section, schedule.max_credit)?;
            for (_, start) in schedule.phase_out_start.iter() {
                check_non_negative(&section, *start)?;
            }
        }
        check_non_negative("eic investment income limit", self.investment_income_limit)
    }

    fn schedule_for(
        &self,
        children: usize,
    ) -> Option<&EicSchedule> {
        self.schedules
            .get(children)
            .or_else(|| self.schedules.last())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedIncomeCreditResult {
    pub eligible: bool,
    pub qualifying_children: u32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct EarnedIncomeInputs<'a> {
    pub filing_status: FilingStatusCode,
    pub adjusted_gross_income: Decimal,
    pub earned_income: Decimal,
    pub investment_income: Decimal,
    pub can_be_claimed_as_dependent: bool,
    pub filer_age: Option<u32>,
    pub dependents: &'a [Dependent],
    pub year_end: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct EarnedIncomeCredit<'a> {
    table: &'a EarnedIncomeCreditTable,
}

impl<'a> EarnedIncomeCredit<'a> {
    pub fn new(table: &'a EarnedIncomeCreditTable) -> Self {
        Self { table }
    }

    /// Evaluates the credit. A return with no earned income is not
    /// evaluated and adds no reasons.
    pub fn evaluate(
        &self,
        inputs: &EarnedIncomeInputs<'_>,
        reasons: &mut Vec<IneligibilityReason>,
    ) -> EarnedIncomeCreditResult {
        if inputs.earned_income <= Decimal::ZERO {
            return EarnedIncomeCreditResult::default();
        }

        let qualifying_children = self.qualifying_children(inputs);
        let before = reasons.len();
        let mut deny = |reason: String| {
            reasons.push(IneligibilityReason::new(CreditFamily::EarnedIncome, reason))
        };

        if inputs.filing_status == FilingStatusCode::MarriedFilingSeparately {
            deny("Not available when filing as Married Filing Separately".to_string());
        }
        if inputs.can_be_claimed_as_dependent {
            deny("Can be claimed as a dependent on another return".to_string());
        }
        if inputs.investment_income > self.table.investment_income_limit {
            deny(format!(
                "Investment income {} exceeds the limit of {}",
                inputs.investment_income, self.table.investment_income_limit
            ));
        }
        if qualifying_children == 0 {
            match inputs.filer_age {
                None => deny("Date of birth is needed to check the age requirement".to_string()),
                Some(age)
                    if age < self.table.min_age_without_children
                        || age > self.table.max_age_without_children =>
                {
                    deny(format!(
                        "Without a qualifying child the filer must be {} to {}; age is {age}",
                        self.table.min_age_without_children, self.table.max_age_without_children
                    ))
                }
                Some(_) => {}
            }
        }

        let Some(schedule) = self.table.schedule_for(qualifying_children as usize) else {
            return EarnedIncomeCreditResult::default();
        };

        let amount = if reasons.len() == before {
            credit_amount(schedule, inputs)
        } else {
            Decimal::ZERO
        };

        if reasons.len() == before && amount == Decimal::ZERO {
            reasons.push(IneligibilityReason::new(
                CreditFamily::EarnedIncome,
                format!(
                    "Income is above the phase-out range for {qualifying_children} qualifying children"
                ),
            ));
        }

        debug!(qualifying_children, amount = %amount, "Evaluated earned income credit");

        EarnedIncomeCreditResult {
            eligible: amount > Decimal::ZERO,
            qualifying_children,
            amount,
        }
    }

    fn qualifying_children(
        &self,
        inputs: &EarnedIncomeInputs<'_>,
    ) -> u32 {
        let count = inputs
            .dependents
            .iter()
            .filter(|dependent| dependent.is_qualifying_child)
            .filter_map(|dependent| dependent.age_at(inputs.year_end).map(|age| (dependent, age)))
            .filter(|(dependent, age)| {
                *age < self.table.child_age_limit
                    || (dependent.is_full_time_student && *age < self.table.student_age_limit)
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Phase-in, plateau, phase-out.
fn credit_amount(
    schedule: &EicSchedule,
    inputs: &EarnedIncomeInputs<'_>,
) -> Decimal {
    let phased_in = (inputs.earned_income * schedule.phase_in_rate).min(schedule.max_credit);
    let measured = max(inputs.adjusted_gross_income, inputs.earned_income);
    let start = *schedule.phase_out_start.get(inputs.filing_status);
    let reduction = floor_zero(measured - start) * schedule.phase_out_rate;
    floor_zero(phased_in - reduction)
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

    fn kid(born_year: i32) -> Dependent {
        Dependent {
            first_name: "Kid".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(born_year, 5, 5),
            is_qualifying_child: true,
            ..Default::default()
        }
    }

    fn inputs<'a>(
        earned: Decimal,
        dependents: &'a [Dependent],
    ) -> EarnedIncomeInputs<'a> {
        EarnedIncomeInputs {
            filing_status: FilingStatusCode::Single,
            adjusted_gross_income: earned,
            earned_income: earned,
            investment_income: Decimal::ZERO,
            can_be_claimed_as_dependent: false,
            filer_age: Some(30),
            dependents,
            year_end: year_end(),
        }
    }

    fn evaluate(inputs: &EarnedIncomeInputs<'_>) -> (EarnedIncomeCreditResult, Vec<IneligibilityReason>) {
        let tables = TaxYearTables::y2025();
        let mut reasons = Vec::new();
        let result =
            EarnedIncomeCredit::new(&tables.earned_income_credit).evaluate(inputs, &mut reasons);
        (result, reasons)
    }

    #[test]
    fn childless_plateau_pays_maximum() {
        let (result, reasons) = evaluate(&inputs(dec!(9000), &[]));

        assert!(reasons.is_empty());
        assert_eq!(result.amount, dec!(649));
    }

    #[test]
    fn childless_phase_in() {
        let (result, _) = evaluate(&inputs(dec!(4000), &[]));

        assert_eq!(result.amount, dec!(306.00));
    }

    #[test]
    fn childless_phase_out() {
        let (result, _) = evaluate(&inputs(dec!(12620), &[]));

        // 649 − (12620 − 10620) × 7.65%
        assert_eq!(result.amount, dec!(496.00));
    }

    #[test]
    fn one_child_plateau() {
        let dependents = [kid(2020)];

        let (result, _) = evaluate(&inputs(dec!(15000), &dependents));

        assert_eq!(result.qualifying_children, 1);
        assert_eq!(result.amount, dec!(4328));
    }

    #[test]
    fn more_than_three_children_use_last_schedule() {
        let dependents = [kid(2012), kid(2014), kid(2016), kid(2018)];

        let (result, _) = evaluate(&inputs(dec!(20000), &dependents));

        assert_eq!(result.qualifying_children, 4);
        assert_eq!(result.amount, dec!(8046));
    }

    #[test]
    fn high_income_records_phase_out_reason() {
        let (result, reasons) = evaluate(&inputs(dec!(55000), &[]));

        assert_eq!(result.amount, Decimal::ZERO);
        assert!(!result.eligible);
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].family, CreditFamily::EarnedIncome);
    }

    #[test]
    fn childless_filer_under_twenty_five_is_denied() {
        let young = EarnedIncomeInputs {
            filer_age: Some(22),
            ..inputs(dec!(9000), &[])
        };

        let (result, reasons) = evaluate(&young);

        assert_eq!(result.amount, Decimal::ZERO);
        assert_eq!(reasons.len(), 1);
    }

    #[test]
    fn missing_birth_date_denies_childless_credit() {
        let unknown = EarnedIncomeInputs {
            filer_age: None,
            ..inputs(dec!(9000), &[])
        };

        let (result, reasons) = evaluate(&unknown);

        assert_eq!(result.amount, Decimal::ZERO);
        assert!(reasons[0].reason.contains("Date of birth"));
    }

    #[test]
    fn investment_income_over_limit_denies() {
        let rich = EarnedIncomeInputs {
            investment_income: dec!(12000),
            ..inputs(dec!(9000), &[])
        };

        let (result, reasons) = evaluate(&rich);

        assert_eq!(result.amount, Decimal::ZERO);
        assert!(reasons[0].reason.contains("Investment income"));
    }

    #[test]
    fn married_filing_separately_is_denied() {
        let mfs = EarnedIncomeInputs {
            filing_status: FilingStatusCode::MarriedFilingSeparately,
            ..inputs(dec!(9000), &[])
        };

        let (result, _) = evaluate(&mfs);

        assert_eq!(result.amount, Decimal::ZERO);
    }

    #[test]
    fn student_under_twenty_four_qualifies() {
        let student = Dependent {
            is_full_time_student: true,
            ..kid(2004)
        };
        let dependents = [student];

        let (result, _) = evaluate(&inputs(dec!(15000), &dependents));

        assert_eq!(result.qualifying_children, 1);
    }

    #[test]
    fn no_earned_income_is_not_evaluated() {
        let (result, reasons) = evaluate(&inputs(Decimal::ZERO, &[]));

        assert_eq!(result, EarnedIncomeCreditResult::default());
        assert!(reasons.is_empty());
    }
}
