//! Income aggregation.
//!
//! Sums every income-bearing line item into canonical totals. This is the
//! normalization boundary: blank boxes become zero and negative entries are
//! clamped here, so downstream modules only ever see plain decimals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{amount, floor_zero, sum_amounts};
use crate::models::{Income, ScheduleCExpenses};

/// Canonical income totals for one return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTotals {
    /// Sum of W-2 box 1.
    pub wages: Decimal,
    /// Sum of 1099-NEC box 1.
    pub nonemployee_compensation: Decimal,
    /// Sum of 1099-INT box 1.
    pub interest: Decimal,
    /// Sum of 1099-DIV box 1a.
    pub ordinary_dividends: Decimal,
    /// Sum of 1099-DIV box 1b (a subset of ordinary dividends).
    pub qualified_dividends: Decimal,
    /// Sum of 1099-K box 1a.
    pub payment_app_gross: Decimal,
    /// Mileage deduction plus itemized business expenses.
    pub business_expenses: Decimal,
    /// NEC + 1099-K − business expenses, floored at zero.
    pub net_self_employment: Decimal,
    /// Federal withholding across W-2 and all 1099 forms.
    pub federal_withheld: Decimal,
}

impl IncomeTotals {
    /// Interest plus ordinary dividends, the investment income the earned
    /// income credit limits.
    pub fn investment_income(&self) -> Decimal {
        self.interest + self.ordinary_dividends
    }

    /// Wages, investment income and net self-employment earnings, before
    /// any adjustment.
    pub fn gross_income(&self) -> Decimal {
        self.wages + self.investment_income() + self.net_self_employment
    }
}

/// Aggregates the `income` section of a return.
///
/// `mileage_rate` comes from the tax-year tables and prices Schedule C
/// business miles.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::income::aggregate_income;
/// use tax_core::{Form1099Nec, Income, ScheduleCExpenses, W2};
///
/// let income = Income {
///     w2: vec![W2 { wages: Some(dec!(30000)), ..Default::default() }],
///     nec: vec![Form1099Nec {
///         nonemployee_compensation: Some(dec!(5000)),
///         ..Default::default()
///     }],
///     schedule_c: Some(ScheduleCExpenses {
///         business_miles: Some(dec!(1000)),
///         expenses: vec![],
///     }),
///     ..Default::default()
/// };
///
/// let totals = aggregate_income(&income, dec!(0.70));
///
/// assert_eq!(totals.wages, dec!(30000));
/// assert_eq!(totals.net_self_employment, dec!(4300));
/// ```
pub fn aggregate_income(
    income: &Income,
    mileage_rate: Decimal,
) -> IncomeTotals {
    let wages = sum_amounts(&income.w2, "w2.wages", |w| w.wages);
    let nonemployee_compensation = sum_amounts(&income.nec, "1099nec.nonemployee_compensation", |f| {
        f.nonemployee_compensation
    });
    let interest = sum_amounts(&income.interest, "1099int.interest", |f| f.interest);
    let ordinary_dividends =
        sum_amounts(&income.dividends, "1099div.ordinary_dividends", |f| f.ordinary_dividends);
    let qualified_dividends = sum_amounts(&income.dividends, "1099div.qualified_dividends", |f| {
        f.qualified_dividends
    });
    let payment_app_gross =
        sum_amounts(&income.payment_apps, "1099k.gross_amount", |f| f.gross_amount);

    let business_expenses = income
        .schedule_c
        .as_ref()
        .map(|schedule| schedule_c_expenses(schedule, mileage_rate))
        .unwrap_or_default();

    let net_self_employment =
        floor_zero(nonemployee_compensation + payment_app_gross - business_expenses);

    let federal_withheld = sum_amounts(&income.w2, "w2.federal_withheld", |f| f.federal_withheld)
        + sum_amounts(&income.nec, "1099nec.federal_withheld", |f| f.federal_withheld)
        + sum_amounts(&income.interest, "1099int.federal_withheld", |f| f.federal_withheld)
        + sum_amounts(&income.dividends, "1099div.federal_withheld", |f| f.federal_withheld)
        + sum_amounts(&income.payment_apps, "1099k.federal_withheld", |f| f.federal_withheld);

    let totals = IncomeTotals {
        wages,
        nonemployee_compensation,
        interest,
        ordinary_dividends,
        qualified_dividends,
        payment_app_gross,
        business_expenses,
        net_self_employment,
        federal_withheld,
    };

    debug!(
        line_items = income.len(),
        wages = %totals.wages,
        net_self_employment = %totals.net_self_employment,
        "Aggregated income"
    );

    totals
}

/// Recognized Schedule C expenses: miles at the standard rate plus every
/// itemized business expense.
pub fn schedule_c_expenses(
    schedule: &ScheduleCExpenses,
    mileage_rate: Decimal,
) -> Decimal {
    let mileage = amount(schedule.business_miles, "schedule_c.business_miles") * mileage_rate;
    let itemized = sum_amounts(&schedule.expenses, "schedule_c.expense", |e| e.amount);
    mileage + itemized
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{BusinessExpense, Form1099Div, Form1099Int, Form1099K, Form1099Nec, W2};

    const MILEAGE: Decimal = dec!(0.70);

    #[test]
    fn empty_income_is_all_zero() {
        let totals = aggregate_income(&Income::default(), MILEAGE);

        assert_eq!(totals, IncomeTotals::default());
    }

    #[test]
    fn sums_wages_across_w2s() {
        let income = Income {
            w2: vec![
                W2 {
                    wages: Some(dec!(40000)),
                    federal_withheld: Some(dec!(4000)),
                    ..Default::default()
                },
                W2 {
                    wages: Some(dec!(15000.50)),
                    federal_withheld: None,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let totals = aggregate_income(&income, MILEAGE);

        assert_eq!(totals.wages, dec!(55000.50));
        assert_eq!(totals.federal_withheld, dec!(4000));
    }

    #[test]
    fn investment_income_includes_interest_and_ordinary_dividends() {
        let income = Income {
            interest: vec![Form1099Int {
                interest: Some(dec!(120)),
                ..Default::default()
            }],
            dividends: vec![Form1099Div {
                ordinary_dividends: Some(dec!(300)),
                qualified_dividends: Some(dec!(200)),
                ..Default::default()
            }],
            ..Default::default()
        };

        let totals = aggregate_income(&income, MILEAGE);

        assert_eq!(totals.interest, dec!(120));
        assert_eq!(totals.ordinary_dividends, dec!(300));
        assert_eq!(totals.qualified_dividends, dec!(200));
        assert_eq!(totals.investment_income(), dec!(420));
    }

    #[test]
    fn net_self_employment_subtracts_schedule_c_expenses() {
        let income = Income {
            nec: vec![Form1099Nec {
                nonemployee_compensation: Some(dec!(8000)),
                ..Default::default()
            }],
            payment_apps: vec![Form1099K {
                gross_amount: Some(dec!(2000)),
                ..Default::default()
            }],
            schedule_c: Some(ScheduleCExpenses {
                business_miles: Some(dec!(500)),
                expenses: vec![
                    BusinessExpense {
                        category: "supplies".to_string(),
                        amount: Some(dec!(650)),
                    },
                    BusinessExpense {
                        category: "phone".to_string(),
                        amount: None,
                    },
                ],
            }),
            ..Default::default()
        };

        let totals = aggregate_income(&income, MILEAGE);

        // 500 miles × 0.70 = 350, plus 650 of supplies
        assert_eq!(totals.business_expenses, dec!(1000));
        assert_eq!(totals.net_self_employment, dec!(9000));
    }

    #[test]
    fn net_self_employment_floors_at_zero() {
        let income = Income {
            nec: vec![Form1099Nec {
                nonemployee_compensation: Some(dec!(500)),
                ..Default::default()
            }],
            schedule_c: Some(ScheduleCExpenses {
                business_miles: None,
                expenses: vec![BusinessExpense {
                    category: "equipment".to_string(),
                    amount: Some(dec!(2500)),
                }],
            }),
            ..Default::default()
        };

        let totals = aggregate_income(&income, MILEAGE);

        assert_eq!(totals.net_self_employment, Decimal::ZERO);
    }

    #[test]
    fn gross_income_adds_wages_investment_and_self_employment() {
        let income = Income {
            w2: vec![W2 {
                wages: Some(dec!(30000)),
                ..Default::default()
            }],
            interest: vec![Form1099Int {
                interest: Some(dec!(250)),
                ..Default::default()
            }],
            nec: vec![Form1099Nec {
                nonemployee_compensation: Some(dec!(4000)),
                ..Default::default()
            }],
            ..Default::default()
        };

        let totals = aggregate_income(&income, MILEAGE);

        assert_eq!(totals.gross_income(), dec!(34250));
    }

    #[test]
    fn backup_withholding_on_1099s_counts_as_federal_withholding() {
        let income = Income {
            nec: vec![Form1099Nec {
                federal_withheld: Some(dec!(240)),
                ..Default::default()
            }],
            payment_apps: vec![Form1099K {
                federal_withheld: Some(dec!(60)),
                ..Default::default()
            }],
            ..Default::default()
        };

        let totals = aggregate_income(&income, MILEAGE);

        assert_eq!(totals.federal_withheld, dec!(300));
    }
}
