mod completeness;
mod filing_status;
mod income;
mod phase_out;
mod tax_bracket;
mod tax_return;

pub use completeness::CompletenessIssue;
pub use filing_status::{ByFilingStatus, FilingStatusCode};
pub use income::{
    BusinessExpense, Form1099Div, Form1099Int, Form1099K, Form1099Nec, Income, LineItemId,
    ScheduleCExpenses, W2,
};
pub use phase_out::PhaseOutRange;
pub use tax_bracket::{BracketTable, TaxBracket};
pub use tax_return::{
    CreditSelections, Deductions, Dependent, Education, EducationCreditChoice, Form1098T,
    Payments, PersonalInfo, StateInfo, StudentProfile, TaxReturn, age_on,
};
