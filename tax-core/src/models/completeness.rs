//! Caller-side completeness check.
//!
//! The resolver computes on any record, however partial. The review step
//! uses this check to decide whether the result may be shown as final.

use serde::{Deserialize, Serialize};

use super::tax_return::TaxReturn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessIssue {
    MissingFilingStatus,
    MissingDateOfBirth,
    MissingResidenceState,
    /// A W-2 was added but box 1 is blank.
    BlankWages { employer_name: String },
    /// A 1098-T was added but box 1 is blank.
    BlankTuition { institution_name: String },
    DependentMissingBirthDate { first_name: String },
}

impl TaxReturn {
    /// Lists everything a reviewer would ask the user to fill in.
    pub fn completeness_issues(&self) -> Vec<CompletenessIssue> {
        let mut issues = Vec::new();
        let info = &self.personal_info;

        if info.filing_status.is_none() {
            issues.push(CompletenessIssue::MissingFilingStatus);
        }
        if info.date_of_birth.is_none() {
            issues.push(CompletenessIssue::MissingDateOfBirth);
        }
        if self.state_info.residence_state.trim().is_empty() {
            issues.push(CompletenessIssue::MissingResidenceState);
        }

        issues.extend(
            self.income
                .w2
                .iter()
                .filter(|w2| w2.wages.is_none())
                .map(|w2| CompletenessIssue::BlankWages {
                    employer_name: w2.employer_name.clone(),
                }),
        );
        issues.extend(
            self.education
                .forms_1098t
                .iter()
                .filter(|form| form.tuition_paid.is_none())
                .map(|form| CompletenessIssue::BlankTuition {
                    institution_name: form.institution_name.clone(),
                }),
        );
        issues.extend(
            info.dependents
                .iter()
                .filter(|dependent| dependent.date_of_birth.is_none())
                .map(|dependent| CompletenessIssue::DependentMissingBirthDate {
                    first_name: dependent.first_name.clone(),
                }),
        );

        issues
    }

    pub fn is_complete(&self) -> bool {
        self.completeness_issues().is_empty()
    }
}
