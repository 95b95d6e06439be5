//! American Opportunity (AOTC) and Lifetime Learning (LLC) credits.
//!
//! Both credits are computed for every return with education activity; only
//! one may be applied. The engine recommends the one with the higher
//! after-phase-out value and honors an explicit user choice over that
//! recommendation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CreditFamily, IneligibilityReason};
use crate::calculations::common::{floor_zero, sum_amounts};
use crate::models::{
    ByFilingStatus, Education, EducationCreditChoice, FilingStatusCode, PhaseOutRange,
    StudentProfile,
};
use crate::tables::{TablesError, check_non_negative, check_rate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AotcLimits {
    /// Expenses credited at 100%.
    pub full_credit_expenses: Decimal,
    /// Further expenses credited at `partial_rate`.
    pub partial_credit_expenses: Decimal,
    pub partial_rate: Decimal,
    pub max_credit: Decimal,
    /// Share of the credit that is refundable.
    pub refundable_rate: Decimal,
    pub max_refundable: Decimal,
    /// The credit covers only the first this-many post-secondary years.
    pub max_years_completed: u8,
    /// `None` means the filing status cannot claim the credit.
    pub phase_out: ByFilingStatus<Option<PhaseOutRange>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlcLimits {
    pub max_expenses: Decimal,
    pub rate: Decimal,
    pub max_credit: Decimal,
    pub phase_out: ByFilingStatus<Option<PhaseOutRange>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationCreditLimits {
    pub aotc: AotcLimits,
    pub llc: LlcLimits,
}

fn validate_phase_out(
    section: &str,
    phase_out: &ByFilingStatus<Option<PhaseOutRange>>,
) -> Result<(), TablesError> {
    for (status, range) in phase_out.iter() {
        if let Some(range) = range {
            range.validate(&format!("{section} phase-out {}", status.as_str()))?;
        }
    }
    Ok(())
}

impl EducationCreditLimits {
    pub fn validate(&self) -> Result<(), TablesError> {
        let aotc = &self.aotc;
        check_non_negative("aotc full credit expenses", aotc.full_credit_expenses)?;
        check_non_negative("aotc partial credit expenses", aotc.partial_credit_expenses)?;
        check_rate("aotc partial rate", aotc.partial_rate)?;
        check_non_negative("aotc max credit", aotc.max_credit)?;
        check_rate("aotc refundable rate", aotc.refundable_rate)?;
        check_non_negative("aotc max refundable", aotc.max_refundable)?;
        validate_phase_out("aotc", &aotc.phase_out)?;

        let llc = &self.llc;
        check_non_negative("llc max expenses", llc.max_expenses)?;
        check_rate("llc rate", llc.rate)?;
        check_non_negative("llc max credit", llc.max_credit)?;
        validate_phase_out("llc", &llc.phase_out)
    }
}

/// Totals drawn from the 1098-T forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationExpenses {
    pub tuition: Decimal,
    pub scholarships: Decimal,
    pub books_and_supplies: Decimal,
    /// `max(0, tuition − scholarships)`.
    pub qualified_expenses: Decimal,
    /// Scholarship in excess of tuition plus books; may be taxable income.
    /// Informational only, never added to income by the engine.
    pub potentially_taxable_scholarship: Decimal,
}

impl EducationExpenses {
    pub fn from_forms(education: &Education) -> Self {
        let forms = &education.forms_1098t;
        let tuition = sum_amounts(forms, "1098t.tuition_paid", |f| f.tuition_paid);
        let scholarships = sum_amounts(forms, "1098t.scholarships", |f| f.scholarships);
        let books_and_supplies =
            sum_amounts(forms, "1098t.books_and_supplies", |f| f.books_and_supplies);

        Self {
            tuition,
            scholarships,
            books_and_supplies,
            qualified_expenses: floor_zero(tuition - scholarships),
            potentially_taxable_scholarship: floor_zero(
                scholarships - (tuition + books_and_supplies),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AotcComputation {
    pub eligible: bool,
    pub amount_before_phase_out: Decimal,
    /// After phase-out; zero when ineligible.
    pub amount: Decimal,
    pub refundable: Decimal,
    pub nonrefundable: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlcComputation {
    pub eligible: bool,
    pub amount_before_phase_out: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationCreditResult {
    pub expenses: EducationExpenses,
    pub aotc: AotcComputation,
    pub llc: LlcComputation,
    pub recommended: EducationCreditChoice,
    pub selected: EducationCreditChoice,
    /// The selection came from the user rather than the recommendation.
    pub user_override: bool,
}

impl Default for EducationCreditResult {
    fn default() -> Self {
        Self {
            expenses: EducationExpenses::default(),
            aotc: AotcComputation::default(),
            llc: LlcComputation::default(),
            recommended: EducationCreditChoice::None,
            selected: EducationCreditChoice::None,
            user_override: false,
        }
    }
}

impl EducationCreditResult {
    /// Refundable part of the selected credit.
    pub fn selected_refundable(&self) -> Decimal {
        match self.selected {
            EducationCreditChoice::Aotc => self.aotc.refundable,
            EducationCreditChoice::Llc | EducationCreditChoice::None => Decimal::ZERO,
        }
    }

    /// Non-refundable part of the selected credit, before the tax
    /// liability limit.
    pub fn selected_nonrefundable(&self) -> Decimal {
        match self.selected {
            EducationCreditChoice::Aotc => self.aotc.nonrefundable,
            EducationCreditChoice::Llc => self.llc.amount,
            EducationCreditChoice::None => Decimal::ZERO,
        }
    }
}

/// What the education calculator needs from the return.
#[derive(Debug, Clone, Copy)]
pub struct EducationInputs<'a> {
    pub filing_status: FilingStatusCode,
    pub adjusted_gross_income: Decimal,
    pub can_be_claimed_as_dependent: bool,
    pub student: &'a StudentProfile,
    pub education: &'a Education,
    pub choice: Option<EducationCreditChoice>,
}

#[derive(Debug, Clone)]
pub struct EducationCredits<'a> {
    limits: &'a EducationCreditLimits,
}

impl<'a> EducationCredits<'a> {
    pub fn new(limits: &'a EducationCreditLimits) -> Self {
        Self { limits }
    }

    /// Evaluates both credits, recommends one and applies the selection.
    ///
    /// Reasons for ineligibility are appended to `reasons`. A return with no
    /// 1098-T and no student profile is not evaluated and adds no reasons.
    pub fn evaluate(
        &self,
        inputs: &EducationInputs<'_>,
        reasons: &mut Vec<IneligibilityReason>,
    ) -> EducationCreditResult {
        let expenses = EducationExpenses::from_forms(inputs.education);

        let has_activity = !inputs.education.forms_1098t.is_empty() || inputs.student.is_student;
        if !has_activity {
            return EducationCreditResult {
                expenses,
                selected: inputs.choice.unwrap_or(EducationCreditChoice::None),
                user_override: inputs.choice.is_some(),
                ..Default::default()
            };
        }

        let aotc = self.aotc(inputs, &expenses, reasons);
        let llc = self.llc(inputs, &expenses, reasons);
        let recommended = recommend(&aotc, &llc);
        let selected = inputs.choice.unwrap_or(recommended);

        debug!(
            qualified_expenses = %expenses.qualified_expenses,
            aotc = %aotc.amount,
            llc = %llc.amount,
            ?recommended,
            ?selected,
            "Evaluated education credits"
        );

        EducationCreditResult {
            expenses,
            aotc,
            llc,
            recommended,
            selected,
            user_override: inputs.choice.is_some(),
        }
    }

    fn aotc(
        &self,
        inputs: &EducationInputs<'_>,
        expenses: &EducationExpenses,
        reasons: &mut Vec<IneligibilityReason>,
    ) -> AotcComputation {
        let limits = &self.limits.aotc;
        let student = inputs.student;
        let before = reasons.len();
        let mut deny = |reason: String| {
            reasons.push(IneligibilityReason::new(CreditFamily::AmericanOpportunity, reason))
        };

        if expenses.qualified_expenses <= Decimal::ZERO {
            deny("No qualified education expenses after scholarships".to_string());
        }
        if inputs.can_be_claimed_as_dependent {
            deny("Can be claimed as a dependent on another return".to_string());
        }
        if student.is_graduate_student || student.years_completed >= limits.max_years_completed {
            deny(format!(
                "Already completed the first {} years of post-secondary education",
                limits.max_years_completed
            ));
        }
        if !student.at_least_half_time {
            deny("Not enrolled at least half-time".to_string());
        }
        if !student.pursuing_degree {
            deny("Not pursuing a degree or other recognized credential".to_string());
        }
        let phase_out = limits.phase_out.get(inputs.filing_status);
        match phase_out {
            None => deny(format!(
                "Not available when filing as {}",
                inputs.filing_status.label()
            )),
            Some(range) if range.fully_phased_out(inputs.adjusted_gross_income) => deny(format!(
                "AGI {} is at or above the phase-out limit of {}",
                inputs.adjusted_gross_income, range.end
            )),
            Some(_) => {}
        }

        let amount_before_phase_out = self.aotc_amount(expenses.qualified_expenses);
        let eligible = reasons.len() == before;
        let amount = match (eligible, phase_out) {
            (true, Some(range)) => {
                amount_before_phase_out * range.remaining_fraction(inputs.adjusted_gross_income)
            }
            _ => Decimal::ZERO,
        };
        let refundable = (amount * limits.refundable_rate).min(limits.max_refundable);

        AotcComputation {
            eligible,
            amount_before_phase_out,
            amount,
            refundable,
            nonrefundable: amount - refundable,
        }
    }

    /// 100% of the first tier plus `partial_rate` of the second, capped.
    fn aotc_amount(
        &self,
        qualified_expenses: Decimal,
    ) -> Decimal {
        let limits = &self.limits.aotc;
        let first = qualified_expenses.min(limits.full_credit_expenses);
        let second = floor_zero(qualified_expenses - limits.full_credit_expenses)
            .min(limits.partial_credit_expenses);
        (first + second * limits.partial_rate).min(limits.max_credit)
    }

    fn llc(
        &self,
        inputs: &EducationInputs<'_>,
        expenses: &EducationExpenses,
        reasons: &mut Vec<IneligibilityReason>,
    ) -> LlcComputation {
        let limits = &self.limits.llc;
        let before = reasons.len();
        let mut deny = |reason: String| {
            reasons.push(IneligibilityReason::new(CreditFamily::LifetimeLearning, reason))
        };

        if expenses.qualified_expenses <= Decimal::ZERO {
            deny("No qualified education expenses after scholarships".to_string());
        }
        if inputs.can_be_claimed_as_dependent {
            deny("Can be claimed as a dependent on another return".to_string());
        }
        let phase_out = limits.phase_out.get(inputs.filing_status);
        match phase_out {
            None => deny(format!(
                "Not available when filing as {}",
                inputs.filing_status.label()
            )),
            Some(range) if range.fully_phased_out(inputs.adjusted_gross_income) => deny(format!(
                "AGI {} is at or above the phase-out limit of {}",
                inputs.adjusted_gross_income, range.end
            )),
            Some(_) => {}
        }

        let amount_before_phase_out =
            (expenses.qualified_expenses.min(limits.max_expenses) * limits.rate).min(limits.max_credit);
        let eligible = reasons.len() == before;
        let amount = match (eligible, phase_out) {
            (true, Some(range)) => {
                amount_before_phase_out * range.remaining_fraction(inputs.adjusted_gross_income)
            }
            _ => Decimal::ZERO,
        };

        LlcComputation {
            eligible,
            amount_before_phase_out,
            amount,
        }
    }
}

/// Higher after-phase-out value wins; AOTC wins ties because part of it is
/// refundable.
fn recommend(
    aotc: &AotcComputation,
    llc: &LlcComputation,
) -> EducationCreditChoice {
    if aotc.amount <= Decimal::ZERO && llc.amount <= Decimal::ZERO {
        EducationCreditChoice::None
    } else if aotc.amount >= llc.amount {
        EducationCreditChoice::Aotc
    } else {
        EducationCreditChoice::Llc
    }
}
