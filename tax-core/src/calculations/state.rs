//! State income tax.
//!
//! State-taxable income is federal AGI. Each state code resolves to one of
//! three outcomes:
//!
//! | Resolution | When | Tax |
//! |------------|------|-----|
//! | `Exact` | Code is in the state table | Per the state's regime |
//! | `Approximate` | Valid US state or DC code missing from the table | AGI × the table's estimate rate |
//! | `Unsupported` | Blank or unknown code | Zero, flagged |
//!
//! A work state different from the residence state is computed on the same
//! income and flagged as multi-state. Credits for taxes paid to other
//! states and income apportionment are not modeled.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::brackets::tax_from_brackets;
use crate::calculations::common::{amount, floor_zero};
use crate::models::{BracketTable, StateInfo, W2};
use crate::tables::{TablesError, check_rate};

/// Postal codes of the fifty states and the District of Columbia.
pub const US_STATE_CODES: [&str; 51] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM",
    "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

/// Trimmed, upper-case form of a user-entered state code.
pub fn normalize_state_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn is_us_state_code(code: &str) -> bool {
    US_STATE_CODES.contains(&code)
}

/// How a state taxes wage income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "regime", rename_all = "snake_case")]
pub enum StateTaxRule {
    /// No broad-based income tax.
    None,
    Flat { rate: Decimal },
    Progressive { brackets: BracketTable },
}

impl StateTaxRule {
    fn tax(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        match self {
            Self::None => Decimal::ZERO,
            Self::Flat { rate } => floor_zero(taxable_income) * *rate,
            Self::Progressive { brackets } => tax_from_brackets(brackets, taxable_income),
        }
    }

    fn requires_filing(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Per-state rules for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTable {
    /// Keyed by upper-case postal code.
    pub rules: BTreeMap<String, StateTaxRule>,
    /// Flat rate used to estimate states missing from `rules`.
    pub estimate_rate: Decimal,
}

impl StateTable {
    /// # Errors
    ///
    /// Returns [`TablesError::UnknownStateCode`] for a key that is not a US
    /// state or DC postal code, or the first rate or bracket error found.
    pub fn validate(&self) -> Result<(), TablesError> {
        check_rate("state estimate rate", self.estimate_rate)?;
        for (code, rule) in &self.rules {
            if !is_us_state_code(code) {
                return Err(TablesError::UnknownStateCode(code.clone()));
            }
            let section = format!("state {code}");
            match rule {
                StateTaxRule::None => {}
                StateTaxRule::Flat { rate } => check_rate(&section, *rate)?,
                StateTaxRule::Progressive { brackets } => brackets.validate(&section)?,
            }
        }
        Ok(())
    }

    /// Resolves a user-entered code to a rule.
    pub fn resolve(
        &self,
        code: &str,
    ) -> (RegimeResolution, Option<StateTaxRule>) {
        let code = normalize_state_code(code);
        if let Some(rule) = self.rules.get(&code) {
            return (RegimeResolution::Exact, Some(rule.clone()));
        }
        if is_us_state_code(&code) {
            return (
                RegimeResolution::Approximate,
                Some(StateTaxRule::Flat {
                    rate: self.estimate_rate,
                }),
            );
        }
        (RegimeResolution::Unsupported, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeResolution {
    Exact,
    Approximate,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateRole {
    Residence,
    Work,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxResult {
    pub state_code: String,
    pub role: StateRole,
    pub resolution: RegimeResolution,
    /// Rule actually applied; the estimate for `Approximate`, absent for
    /// `Unsupported`.
    pub rule: Option<StateTaxRule>,
    pub taxable_income: Decimal,
    pub tax: Decimal,
    pub withholding: Decimal,
    /// Positive is a refund.
    pub refund_or_owed: Decimal,
    pub filing_required: bool,
}

impl StateTaxResult {
    pub fn is_approximate(&self) -> bool {
        self.resolution == RegimeResolution::Approximate
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxSummary {
    pub residence: StateTaxResult,
    pub work: Option<StateTaxResult>,
    pub multi_state: bool,
}

impl StateTaxSummary {
    pub fn results(&self) -> impl Iterator<Item = &StateTaxResult> {
        std::iter::once(&self.residence).chain(self.work.as_ref())
    }

    pub fn total_tax(&self) -> Decimal {
        self.results().map(|result| result.tax).sum()
    }

    pub fn total_refund_or_owed(&self) -> Decimal {
        self.results().map(|result| result.refund_or_owed).sum()
    }
}

#[derive(Debug, Clone)]
pub struct StateTaxCalculator<'a> {
    table: &'a StateTable,
}

impl<'a> StateTaxCalculator<'a> {
    pub fn new(table: &'a StateTable) -> Self {
        Self { table }
    }

    pub fn compute(
        &self,
        state_info: &StateInfo,
        w2s: &[W2],
        adjusted_gross_income: Decimal,
    ) -> StateTaxSummary {
        let residence_code = normalize_state_code(&state_info.residence_state);
        let work_code = state_info.distinct_work_state().map(normalize_state_code);

        let mut residence_withholding =
            amount(state_info.state_withholding, "state_info.state_withholding");
        let mut work_withholding = Decimal::ZERO;
        for w2 in w2s {
            let withheld = amount(w2.state_withheld, "w2.state_withheld");
            if withheld == Decimal::ZERO {
                continue;
            }
            let code = w2
                .state_code
                .as_deref()
                .map(normalize_state_code)
                .filter(|code| !code.is_empty())
                .unwrap_or_else(|| residence_code.clone());
            if code == residence_code {
                residence_withholding += withheld;
            } else if work_code.as_deref() == Some(code.as_str()) {
                work_withholding += withheld;
            } else {
                warn!(
                    state = %code,
                    employer = %w2.employer_name,
                    "W-2 state withholding is for a state not on this return; ignored"
                );
            }
        }

        let residence = self.compute_state(
            &residence_code,
            StateRole::Residence,
            adjusted_gross_income,
            residence_withholding,
        );
        let work = work_code.map(|code| {
            self.compute_state(&code, StateRole::Work, adjusted_gross_income, work_withholding)
        });

        StateTaxSummary {
            multi_state: work.is_some(),
            residence,
            work,
        }
    }

    fn compute_state(
        &self,
        state_code: &str,
        role: StateRole,
        adjusted_gross_income: Decimal,
        withholding: Decimal,
    ) -> StateTaxResult {
        let taxable_income = floor_zero(adjusted_gross_income);
        let (resolution, rule) = self.table.resolve(state_code);

        match resolution {
            RegimeResolution::Exact => {}
            RegimeResolution::Approximate => warn!(
                state = %state_code,
                rate = %self.table.estimate_rate,
                "No rules for state; using flat estimate"
            ),
            RegimeResolution::Unsupported => warn!(
                state = %state_code,
                "Unrecognized state code; state tax not computed"
            ),
        }

        let tax = rule
            .as_ref()
            .map_or(Decimal::ZERO, |rule| rule.tax(taxable_income));
        let filing_required = rule.as_ref().is_some_and(StateTaxRule::requires_filing);

        debug!(state = %state_code, ?role, ?resolution, tax = %tax, "Computed state tax");

        StateTaxResult {
            state_code: state_code.to_string(),
            role,
            resolution,
            rule,
            taxable_income,
            tax,
            withholding,
            refund_or_owed: withholding - tax,
            filing_required,
        }
    }
}
