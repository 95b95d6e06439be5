//! Income line items as entered in the walkthrough.
//!
//! Numeric boxes are `Option<Decimal>` because the record is read while the
//! user is still typing; a blank box is `None`. Nothing here is used in
//! arithmetic directly: the income aggregator normalizes every box exactly
//! once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier generated by the caller when a line item is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub String);

impl LineItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Form W-2, Wage and Tax Statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct W2 {
    pub id: LineItemId,
    pub employer_name: String,
    pub employer_ein: String,
    /// Box 1: wages, tips, other compensation.
    pub wages: Option<Decimal>,
    /// Box 2: federal income tax withheld.
    pub federal_withheld: Option<Decimal>,
    /// Box 15: state code. Blank means the residence state.
    pub state_code: Option<String>,
    /// Box 16: state wages.
    pub state_wages: Option<Decimal>,
    /// Box 17: state income tax withheld.
    pub state_withheld: Option<Decimal>,
}

/// Form 1099-NEC, Nonemployee Compensation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Form1099Nec {
    pub id: LineItemId,
    pub payer_name: String,
    /// Box 1.
    pub nonemployee_compensation: Option<Decimal>,
    /// Box 4: backup withholding.
    pub federal_withheld: Option<Decimal>,
}

/// Form 1099-INT, Interest Income.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Form1099Int {
    pub id: LineItemId,
    pub payer_name: String,
    /// Box 1.
    pub interest: Option<Decimal>,
    /// Box 4.
    pub federal_withheld: Option<Decimal>,
}

/// Form 1099-DIV, Dividends and Distributions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Form1099Div {
    pub id: LineItemId,
    pub payer_name: String,
    /// Box 1a: total ordinary dividends.
    pub ordinary_dividends: Option<Decimal>,
    /// Box 1b: the qualified portion of box 1a.
    pub qualified_dividends: Option<Decimal>,
    /// Box 4.
    pub federal_withheld: Option<Decimal>,
}

/// Form 1099-K, Payment Card and Third Party Network Transactions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Form1099K {
    pub id: LineItemId,
    pub payer_name: String,
    /// Box 1a: gross amount of payment transactions.
    pub gross_amount: Option<Decimal>,
    /// Box 4.
    pub federal_withheld: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessExpense {
    pub category: String,
    pub amount: Option<Decimal>,
}

/// Schedule C expense summary for the self-employment income above.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleCExpenses {
    /// Business miles driven; deducted at the tax year's mileage rate.
    pub business_miles: Option<Decimal>,
    pub expenses: Vec<BusinessExpense>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Income {
    pub w2: Vec<W2>,
    pub nec: Vec<Form1099Nec>,
    pub interest: Vec<Form1099Int>,
    pub dividends: Vec<Form1099Div>,
    pub payment_apps: Vec<Form1099K>,
    pub schedule_c: Option<ScheduleCExpenses>,
}

impl Income {
    /// Removes the line item with `id` from whichever list holds it.
    ///
    /// Returns `true` if something was removed.
    pub fn remove(
        &mut self,
        id: &LineItemId,
    ) -> bool {
        let before = self.len();
        self.w2.retain(|item| &item.id != id);
        self.nec.retain(|item| &item.id != id);
        self.interest.retain(|item| &item.id != id);
        self.dividends.retain(|item| &item.id != id);
        self.payment_apps.retain(|item| &item.id != id);
        self.len() != before
    }

    /// Total number of income line items across all forms.
    pub fn len(&self) -> usize {
        self.w2.len()
            + self.nec.len()
            + self.interest.len()
            + self.dividends.len()
            + self.payment_apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
