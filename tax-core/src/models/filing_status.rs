use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatusCode {
    #[default]
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
    QualifyingSurvivingSpouse,
}

impl FilingStatusCode {
    pub fn all() -> &'static [FilingStatusCode] {
        &[
            Self::Single,
            Self::MarriedFilingJointly,
            Self::MarriedFilingSeparately,
            Self::HeadOfHousehold,
            Self::QualifyingSurvivingSpouse,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
            Self::QualifyingSurvivingSpouse => "QSS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "S" => Some(Self::Single),
            "MFJ" => Some(Self::MarriedFilingJointly),
            "MFS" => Some(Self::MarriedFilingSeparately),
            "HOH" => Some(Self::HeadOfHousehold),
            "QSS" => Some(Self::QualifyingSurvivingSpouse),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedFilingJointly => "Married Filing Jointly",
            Self::MarriedFilingSeparately => "Married Filing Separately",
            Self::HeadOfHousehold => "Head of Household",
            Self::QualifyingSurvivingSpouse => "Qualifying Surviving Spouse",
        }
    }
}

/// One value per filing status.
///
/// Tax-year tables key most of their amounts by filing status; this keeps
/// the five variants together so a table can never be missing one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ByFilingStatus<T> {
    pub single: T,
    pub married_filing_jointly: T,
    pub married_filing_separately: T,
    pub head_of_household: T,
    pub qualifying_surviving_spouse: T,
}

impl<T> ByFilingStatus<T> {
    /// Returns the value for `status`.
    pub fn get(
        &self,
        status: FilingStatusCode,
    ) -> &T {
        match status {
            FilingStatusCode::Single => &self.single,
            FilingStatusCode::MarriedFilingJointly => &self.married_filing_jointly,
            FilingStatusCode::MarriedFilingSeparately => &self.married_filing_separately,
            FilingStatusCode::HeadOfHousehold => &self.head_of_household,
            FilingStatusCode::QualifyingSurvivingSpouse => &self.qualifying_surviving_spouse,
        }
    }

    /// Mutable access, used by loaders that replace a single schedule.
    pub fn get_mut(
        &mut self,
        status: FilingStatusCode,
    ) -> &mut T {
        match status {
            FilingStatusCode::Single => &mut self.single,
            FilingStatusCode::MarriedFilingJointly => &mut self.married_filing_jointly,
            FilingStatusCode::MarriedFilingSeparately => &mut self.married_filing_separately,
            FilingStatusCode::HeadOfHousehold => &mut self.head_of_household,
            FilingStatusCode::QualifyingSurvivingSpouse => &mut self.qualifying_surviving_spouse,
        }
    }

    /// Iterates `(status, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FilingStatusCode, &T)> {
        FilingStatusCode::all()
            .iter()
            .map(move |status| (*status, self.get(*status)))
    }
}

impl<T: Clone> ByFilingStatus<T> {
    /// Builds a table where single-like statuses share one value and
    /// joint-like statuses (MFJ, QSS) share another.
    pub fn split(
        single: T,
        joint: T,
    ) -> Self {
        Self {
            single: single.clone(),
            married_filing_jointly: joint.clone(),
            married_filing_separately: single.clone(),
            head_of_household: single,
            qualifying_surviving_spouse: joint,
        }
    }
}
