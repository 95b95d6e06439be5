use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::filing_status::FilingStatusCode;
use super::income::Income;

/// A complete (or in-progress) tax return as collected by the walkthrough.
///
/// Every section defaults, so a record that is missing whole sections still
/// deserializes and computes to zero-valued results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxReturn {
    pub tax_year: i32,
    pub personal_info: PersonalInfo,
    pub income: Income,
    pub deductions: Deductions,
    pub education: Education,
    pub credits: CreditSelections,
    pub state_info: StateInfo,
    pub payments: Payments,
}

impl Default for TaxReturn {
    fn default() -> Self {
        Self {
            tax_year: 2025,
            personal_info: PersonalInfo::default(),
            income: Income::default(),
            deductions: Deductions::default(),
            education: Education::default(),
            credits: CreditSelections::default(),
            state_info: StateInfo::default(),
            payments: Payments::default(),
        }
    }
}

impl TaxReturn {
    /// Last day of the tax year; ages are measured on this date.
    pub fn year_end(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.tax_year, 12, 31)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub filing_status: Option<FilingStatusCode>,
    pub date_of_birth: Option<NaiveDate>,
    /// Someone else can claim the filer as a dependent.
    pub can_be_claimed_as_dependent: bool,
    pub student: StudentProfile,
    pub dependents: Vec<Dependent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentProfile {
    pub is_student: bool,
    pub pursuing_degree: bool,
    pub at_least_half_time: bool,
    /// Post-secondary years finished before the start of the tax year.
    pub years_completed: u8,
    pub is_graduate_student: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependent {
    pub first_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Relationship, residency and support tests for a qualifying child
    /// were answered "yes" in the dependents step.
    pub is_qualifying_child: bool,
    pub is_full_time_student: bool,
    pub has_ssn: bool,
}

impl Default for Dependent {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            date_of_birth: None,
            is_qualifying_child: false,
            is_full_time_student: false,
            has_ssn: true,
        }
    }
}

/// Whole years between `born` and `on`, or `None` if `born` is after `on`.
pub fn age_on(
    born: NaiveDate,
    on: NaiveDate,
) -> Option<u32> {
    let mut years = on.year() - born.year();
    if (on.month(), on.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

impl Dependent {
    /// Age at the end of the tax year, if a birth date was entered.
    pub fn age_at(
        &self,
        year_end: NaiveDate,
    ) -> Option<u32> {
        self.date_of_birth.and_then(|born| age_on(born, year_end))
    }
}

/// Itemizable deduction categories (Schedule A).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Deductions {
    pub medical: Option<Decimal>,
    pub state_local_taxes: Option<Decimal>,
    pub mortgage_interest: Option<Decimal>,
    pub charitable: Option<Decimal>,
    pub other: Option<Decimal>,
}

/// Form 1098-T, Tuition Statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Form1098T {
    pub institution_name: String,
    /// Box 1: payments received for qualified tuition and related expenses.
    pub tuition_paid: Option<Decimal>,
    /// Box 5: scholarships or grants.
    pub scholarships: Option<Decimal>,
    /// Required course materials bought outside the institution.
    pub books_and_supplies: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub forms_1098t: Vec<Form1098T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationCreditChoice {
    Aotc,
    Llc,
    None,
}

/// Credit choices recorded by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditSelections {
    /// `None` until the user picks; the engine's recommendation applies
    /// meanwhile.
    pub education_choice: Option<EducationCreditChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateInfo {
    pub residence_state: String,
    /// Blank or `None` means the residence state.
    pub work_state: Option<String>,
    pub state_withholding: Option<Decimal>,
}

impl StateInfo {
    /// The work state if one was entered and differs from residence.
    pub fn distinct_work_state(&self) -> Option<&str> {
        self.work_state
            .as_deref()
            .map(str::trim)
            .filter(|work| !work.is_empty() && !work.eq_ignore_ascii_case(self.residence_state.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Payments {
    pub estimated_tax_payments: Option<Decimal>,
    pub prior_year_overpayment_applied: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_on_counts_birthday_on_the_day() {
        assert_eq!(age_on(date(2008, 12, 31), date(2025, 12, 31)), Some(17));
    }

    #[test]
    fn age_on_before_birthday_is_one_less() {
        assert_eq!(age_on(date(2009, 6, 1), date(2025, 5, 31)), Some(15));
    }

    #[test]
    fn age_on_future_birth_is_none() {
        assert_eq!(age_on(date(2026, 1, 1), date(2025, 12, 31)), None);
    }

    #[test]
    fn distinct_work_state_ignores_same_state_and_blank() {
        let mut info = StateInfo {
            residence_state: "CA".to_string(),
            work_state: Some("ca".to_string()),
            state_withholding: None,
        };
        assert_eq!(info.distinct_work_state(), None);

        info.work_state = Some("  ".to_string());
        assert_eq!(info.distinct_work_state(), None);

        info.work_state = Some("NV".to_string());
        assert_eq!(info.distinct_work_state(), Some("NV"));
    }

    #[test]
    fn empty_json_object_deserializes_to_default_return() {
        let parsed: TaxReturn = serde_json::from_str("{}").unwrap();

        assert_eq!(parsed, TaxReturn::default());
    }

    #[test]
    fn dependent_defaults_to_having_ssn() {
        let parsed: Dependent = serde_json::from_str(r#"{"first_name":"Ada"}"#).unwrap();

        assert!(parsed.has_ssn);
        assert!(!parsed.is_qualifying_child);
    }
}
