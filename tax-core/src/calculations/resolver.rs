//! Return resolver.
//!
//! Runs every calculation module over one [`TaxReturn`] in a single pass:
//!
//! | Step | Result |
//! |------|--------|
//! | 1 | Income totals |
//! | 2 | Self-employment tax and its deductible half |
//! | 3 | AGI = wages + interest + ordinary dividends + net SE earnings − SE deduction |
//! | 4 | Deduction and taxable income |
//! | 5 | Income tax from the federal brackets |
//! | 6 | Credits |
//! | 7 | Total tax = income tax after non-refundable credits + SE tax |
//! | 8 | Payments = withholding + estimated payments + prior-year overpayment + refundable credits |
//! | 9 | Refund (positive) or amount owed (negative) |
//!
//! State tax runs off the same AGI. Intermediate values are never rounded;
//! the presented amounts on [`ComputationResult`] are rounded half-up to
//! cents once, at the end. The breakdown structs (`income`, `se`,
//! `deduction`, `credits`) keep their unrounded values.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::brackets::FederalBracketCalculator;
use crate::calculations::common::{amount, floor_zero, round_half_up};
use crate::calculations::credits::{CreditEngine, CreditInputs, CreditResult};
use crate::calculations::deduction::{DeductionContext, DeductionResolver, DeductionResult};
use crate::calculations::income::{IncomeTotals, aggregate_income};
use crate::calculations::self_emp::{SeTaxResult, SelfEmploymentTax};
use crate::calculations::state::{StateTaxCalculator, StateTaxResult, StateTaxSummary};
use crate::models::{FilingStatusCode, TaxReturn};
use crate::tables::TaxYearTables;

/// Everything the review step presents for one return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationResult {
    pub tax_year: i32,
    pub filing_status: FilingStatusCode,
    pub adjusted_gross_income: Decimal,
    pub taxable_income: Decimal,
    pub tax_before_credits: Decimal,
    pub marginal_rate: Decimal,
    pub self_employment_tax: Decimal,
    /// Income tax plus SE tax.
    pub total_tax_before_credits: Decimal,
    /// Non-refundable credits used against income tax.
    pub credits_applied: Decimal,
    pub total_tax: Decimal,
    pub federal_withholding: Decimal,
    pub estimated_payments: Decimal,
    pub refundable_credits: Decimal,
    pub total_payments: Decimal,
    /// Positive is a refund, negative is owed.
    pub refund_or_owed: Decimal,
    pub is_refund: bool,
    pub income: IncomeTotals,
    pub se: SeTaxResult,
    pub deduction: DeductionResult,
    pub credits: CreditResult,
    pub state: StateTaxSummary,
}

impl ComputationResult {
    /// Amount owed as a positive number, zero when refunded.
    pub fn amount_owed(&self) -> Decimal {
        floor_zero(-self.refund_or_owed)
    }

    pub fn refund(&self) -> Decimal {
        floor_zero(self.refund_or_owed)
    }
}

/// Computes the full result for `tax_return` under `tables`.
///
/// Never fails: blank inputs count as zero, a missing filing status is
/// treated as Single, and ineligible credits are reported with reasons.
/// Calling it twice on the same snapshot yields equal results.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{FilingStatusCode, TaxReturn, TaxYearTables, W2, resolve_return};
///
/// let mut tax_return = TaxReturn::default();
/// tax_return.personal_info.filing_status = Some(FilingStatusCode::Single);
/// tax_return.income.w2.push(W2 {
///     wages: Some(dec!(55000)),
///     federal_withheld: Some(dec!(6500)),
///     ..Default::default()
/// });
///
/// let result = resolve_return(&tax_return, &TaxYearTables::y2025());
///
/// assert_eq!(result.taxable_income, dec!(40000));
/// assert_eq!(result.total_tax, dec!(4561.50));
/// assert_eq!(result.refund_or_owed, dec!(1938.50));
/// assert!(result.is_refund);
/// ```
pub fn resolve_return(
    tax_return: &TaxReturn,
    tables: &TaxYearTables,
) -> ComputationResult {
    if tax_return.tax_year != tables.tax_year {
        warn!(
            return_year = tax_return.tax_year,
            tables_year = tables.tax_year,
            "Return and tables are for different tax years"
        );
    }

    let filing_status = tax_return.personal_info.filing_status.unwrap_or_else(|| {
        warn!("No filing status selected; computing as Single");
        FilingStatusCode::Single
    });
    let year_end = year_end(tax_return, tables);

    // Steps 1-3
    let income = aggregate_income(&tax_return.income, tables.mileage_rate);
    let se = SelfEmploymentTax::new(&tables.self_employment).calculate(income.net_self_employment);
    let adjusted_gross_income = income.wages
        + income.interest
        + income.ordinary_dividends
        + income.net_self_employment
        - se.se_tax_deduction;
    let earned_income = floor_zero(income.wages + income.net_self_employment - se.se_tax_deduction);

    // Step 4
    let deduction = DeductionResolver::new(
        &tables.standard_deduction,
        &tables.dependent_deduction,
        &tables.itemized,
    )
    .resolve(
        &DeductionContext {
            filing_status,
            adjusted_gross_income,
            can_be_claimed_as_dependent: tax_return.personal_info.can_be_claimed_as_dependent,
            earned_income,
        },
        &tax_return.deductions,
    );

    // Step 5
    let brackets = FederalBracketCalculator::new(tables.federal_brackets.get(filing_status));
    let income_tax = brackets.tax(deduction.taxable_income);
    let marginal_rate = brackets.marginal_rate(deduction.taxable_income);

    // Step 6
    let credits = CreditEngine::from_tables(tables).evaluate(&CreditInputs {
        tax_return,
        filing_status,
        adjusted_gross_income,
        earned_income,
        investment_income: income.investment_income(),
        income_tax,
        year_end,
    });

    // Steps 7-9
    let total_tax = floor_zero(income_tax - credits.nonrefundable_applied) + se.self_employment_tax;
    let estimated_payments = amount(
        tax_return.payments.estimated_tax_payments,
        "payments.estimated_tax_payments",
    ) + amount(
        tax_return.payments.prior_year_overpayment_applied,
        "payments.prior_year_overpayment_applied",
    );
    let total_payments = income.federal_withheld + estimated_payments + credits.refundable_total;
    let refund_or_owed = round_half_up(total_payments - total_tax);

    let state = StateTaxCalculator::new(&tables.states).compute(
        &tax_return.state_info,
        &tax_return.income.w2,
        adjusted_gross_income,
    );

    debug!(
        ?filing_status,
        agi = %adjusted_gross_income,
        taxable_income = %deduction.taxable_income,
        total_tax = %total_tax,
        refund_or_owed = %refund_or_owed,
        "Resolved return"
    );

    ComputationResult {
        tax_year: tax_return.tax_year,
        filing_status,
        adjusted_gross_income: round_half_up(adjusted_gross_income),
        taxable_income: round_half_up(deduction.taxable_income),
        tax_before_credits: round_half_up(income_tax),
        marginal_rate,
        self_employment_tax: round_half_up(se.self_employment_tax),
        total_tax_before_credits: round_half_up(income_tax + se.self_employment_tax),
        credits_applied: round_half_up(credits.nonrefundable_applied),
        total_tax: round_half_up(total_tax),
        federal_withholding: round_half_up(income.federal_withheld),
        estimated_payments: round_half_up(estimated_payments),
        refundable_credits: round_half_up(credits.refundable_total),
        total_payments: round_half_up(total_payments),
        refund_or_owed,
        is_refund: refund_or_owed >= Decimal::ZERO,
        income,
        se,
        deduction,
        credits,
        state: present_state(state),
    }
}

fn year_end(
    tax_return: &TaxReturn,
    tables: &TaxYearTables,
) -> NaiveDate {
    tax_return
        .year_end()
        .or_else(|| NaiveDate::from_ymd_opt(tables.tax_year, 12, 31))
        .unwrap_or_default()
}

fn present_state(summary: StateTaxSummary) -> StateTaxSummary {
    fn round(result: StateTaxResult) -> StateTaxResult {
        StateTaxResult {
            taxable_income: round_half_up(result.taxable_income),
            tax: round_half_up(result.tax),
            withholding: round_half_up(result.withholding),
            refund_or_owed: round_half_up(result.refund_or_owed),
            ..result
        }
    }

    StateTaxSummary {
        residence: round(summary.residence),
        work: summary.work.map(round),
        multi_state: summary.multi_state,
    }
}
