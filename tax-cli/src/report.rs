//! Plain-text rendering of a [`ComputationResult`] for the review step.

use std::fmt;

use rust_decimal::Decimal;
use tax_core::ComputationResult;
use tax_core::calculations::DeductionMethod;
use tax_core::calculations::common::round_half_up;
use tax_core::calculations::state::{RegimeResolution, StateRole, StateTaxResult};

/// Format decimal as currency string.
fn fmt_currency(val: Decimal) -> String {
    format!("${:.2}", round_half_up(val))
}

fn fmt_percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// Review-step summary. `Display` renders the full report.
pub struct Summary<'a> {
    result: &'a ComputationResult,
}

impl<'a> Summary<'a> {
    pub fn new(result: &'a ComputationResult) -> Self {
        Self { result }
    }

    fn write_federal(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.result;
        let method = match r.deduction.method {
            DeductionMethod::Standard => "standard",
            DeductionMethod::Itemized => "itemized",
        };

        writeln!(f, "Tax year {} ({})", r.tax_year, r.filing_status.label())?;
        writeln!(f)?;
        writeln!(f, "Wages:                 {:>14}", fmt_currency(r.income.wages))?;
        writeln!(
            f,
            "Interest & dividends:  {:>14}",
            fmt_currency(r.income.investment_income())
        )?;
        writeln!(
            f,
            "Self-employment (net): {:>14}",
            fmt_currency(r.income.net_self_employment)
        )?;
        writeln!(
            f,
            "Total income:          {:>14}",
            fmt_currency(r.income.gross_income())
        )?;
        writeln!(f, "AGI:                   {:>14}", fmt_currency(r.adjusted_gross_income))?;
        writeln!(
            f,
            "{:<23}{:>14}",
            format!("Deduction ({method}):"),
            fmt_currency(r.deduction.selected_deduction)
        )?;
        writeln!(f, "Taxable income:        {:>14}", fmt_currency(r.taxable_income))?;
        writeln!(
            f,
            "Income tax:            {:>14}   marginal rate {}",
            fmt_currency(r.tax_before_credits),
            fmt_percent(r.marginal_rate)
        )?;
        writeln!(f, "Credits applied:       {:>14}", fmt_currency(r.credits_applied))?;
        writeln!(f, "Self-employment tax:   {:>14}", fmt_currency(r.self_employment_tax))?;
        writeln!(f, "Total tax:             {:>14}", fmt_currency(r.total_tax))?;
        writeln!(f, "Payments:              {:>14}", fmt_currency(r.total_payments))?;
        writeln!(f)?;
        if r.is_refund {
            writeln!(f, "REFUND:                {:>14}", fmt_currency(r.refund()))
        } else {
            writeln!(f, "AMOUNT OWED:           {:>14}", fmt_currency(r.amount_owed()))
        }
    }

    fn write_credits(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let credits = &self.result.credits;
        let education = &credits.education;

        writeln!(f)?;
        writeln!(f, "Credits")?;
        writeln!(
            f,
            "  Child Tax Credit:    {:>14}   refundable {}",
            fmt_currency(credits.child_tax_credit.nonrefundable),
            fmt_currency(credits.child_tax_credit.refundable)
        )?;
        writeln!(
            f,
            "  Earned Income:       {:>14}",
            fmt_currency(credits.earned_income_credit.amount)
        )?;
        writeln!(
            f,
            "  AOTC:                {:>14}   refundable {}",
            fmt_currency(education.aotc.amount),
            fmt_currency(education.aotc.refundable)
        )?;
        writeln!(f, "  LLC:                 {:>14}", fmt_currency(education.llc.amount))?;
        writeln!(
            f,
            "  Education credit: {:?} (recommended {:?}{})",
            education.selected,
            education.recommended,
            if education.user_override {
                ", your choice"
            } else {
                ""
            }
        )?;
        if education.expenses.potentially_taxable_scholarship > Decimal::ZERO {
            writeln!(
                f,
                "  Scholarships above tuition and books may be taxable: {}",
                fmt_currency(education.expenses.potentially_taxable_scholarship)
            )?;
        }
        for reason in &credits.ineligibility {
            writeln!(f, "  - {}: {}", reason.family.label(), reason.reason)?;
        }
        Ok(())
    }

    fn write_state(
        f: &mut fmt::Formatter<'_>,
        state: &StateTaxResult,
    ) -> fmt::Result {
        let role = match state.role {
            StateRole::Residence => "residence",
            StateRole::Work => "work",
        };
        let code = if state.state_code.is_empty() {
            "(none)"
        } else {
            state.state_code.as_str()
        };

        match state.resolution {
            RegimeResolution::Unsupported => {
                writeln!(f, "  {code} ({role}): not supported, no state tax computed")
            }
            resolution => {
                writeln!(
                    f,
                    "  {code} ({role}): tax {}, withheld {}, {} {}{}",
                    fmt_currency(state.tax),
                    fmt_currency(state.withholding),
                    if state.refund_or_owed >= Decimal::ZERO {
                        "refund"
                    } else {
                        "owed"
                    },
                    fmt_currency(state.refund_or_owed.abs()),
                    if resolution == RegimeResolution::Approximate {
                        " (estimate)"
                    } else {
                        ""
                    }
                )?;
                if !state.filing_required {
                    writeln!(f, "    no state return required")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        self.write_federal(f)?;
        self.write_credits(f)?;

        writeln!(f)?;
        writeln!(f, "State")?;
        let state = &self.result.state;
        for result in state.results() {
            Self::write_state(f, result)?;
        }
        if state.multi_state {
            let total = state.total_refund_or_owed();
            writeln!(
                f,
                "  All states: tax {}, {} {}",
                fmt_currency(state.total_tax()),
                if total >= Decimal::ZERO { "refund" } else { "owed" },
                fmt_currency(total.abs())
            )?;
        }
        Ok(())
    }
}
