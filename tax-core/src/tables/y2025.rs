//! Built-in constants for tax year 2025 (Rev. Proc. 2024-40 amounts).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::TaxYearTables;
use crate::calculations::credits::{
    AotcLimits, ChildTaxCreditConfig, EarnedIncomeCreditTable, EducationCreditLimits,
    EicSchedule, LlcLimits,
};
use crate::calculations::deduction::{DependentDeductionLimit, ItemizedLimits};
use crate::calculations::self_emp::SeTaxConfig;
use crate::calculations::state::{StateTable, StateTaxRule};
use crate::models::{BracketTable, ByFilingStatus, PhaseOutRange};

const FEDERAL_RATES: [Decimal; 7] = [
    dec!(0.10),
    dec!(0.12),
    dec!(0.22),
    dec!(0.24),
    dec!(0.32),
    dec!(0.35),
    dec!(0.37),
];

impl TaxYearTables {
    /// Tables for tax year 2025.
    pub fn y2025() -> Self {
        Self {
            tax_year: 2025,
            federal_brackets: federal_brackets(),
            standard_deduction: ByFilingStatus {
                single: dec!(15000),
                married_filing_jointly: dec!(30000),
                married_filing_separately: dec!(15000),
                head_of_household: dec!(22500),
                qualifying_surviving_spouse: dec!(30000),
            },
            dependent_deduction: DependentDeductionLimit {
                minimum: dec!(1350),
                earned_income_addition: dec!(450),
            },
            itemized: ItemizedLimits {
                salt_cap: ByFilingStatus {
                    married_filing_separately: dec!(5000),
                    ..ByFilingStatus::split(dec!(10000), dec!(10000))
                },
                medical_agi_floor: dec!(0.075),
                charitable_agi_limit: dec!(0.60),
            },
            self_employment: SeTaxConfig {
                net_earnings_factor: dec!(0.9235),
                se_tax_rate: dec!(0.153),
                deduction_factor: dec!(0.50),
            },
            mileage_rate: dec!(0.70),
            education: education(),
            child_tax_credit: child_tax_credit(),
            earned_income_credit: earned_income_credit(),
            states: states(),
        }
    }
}

fn schedule(bounds: [Decimal; 7]) -> BracketTable {
    let pairs: Vec<(Decimal, Decimal)> = bounds.into_iter().zip(FEDERAL_RATES).collect();
    BracketTable::from_pairs(&pairs)
}

fn federal_brackets() -> ByFilingStatus<BracketTable> {
    let joint = schedule([
        dec!(0),
        dec!(23850),
        dec!(96950),
        dec!(206700),
        dec!(394600),
        dec!(501050),
        dec!(751600),
    ]);

    ByFilingStatus {
        single: schedule([
            dec!(0),
            dec!(11925),
            dec!(48475),
            dec!(103350),
            dec!(197300),
            dec!(250525),
            dec!(626350),
        ]),
        married_filing_jointly: joint.clone(),
        married_filing_separately: schedule([
            dec!(0),
            dec!(11925),
            dec!(48475),
            dec!(103350),
            dec!(197300),
            dec!(250525),
            dec!(375800),
        ]),
        head_of_household: schedule([
            dec!(0),
            dec!(17000),
            dec!(64850),
            dec!(103350),
            dec!(197300),
            dec!(250500),
            dec!(626350),
        ]),
        qualifying_surviving_spouse: joint,
    }
}

/// AOTC and LLC share the same 2025 phase-out; neither is available to a
/// married filer filing separately.
fn education_phase_out() -> ByFilingStatus<Option<PhaseOutRange>> {
    ByFilingStatus {
        married_filing_separately: None,
        ..ByFilingStatus::split(
            Some(PhaseOutRange::new(dec!(80000), dec!(90000))),
            Some(PhaseOutRange::new(dec!(160000), dec!(180000))),
        )
    }
}

fn education() -> EducationCreditLimits {
    EducationCreditLimits {
        aotc: AotcLimits {
            full_credit_expenses: dec!(2000),
            partial_credit_expenses: dec!(2000),
            partial_rate: dec!(0.25),
            max_credit: dec!(2500),
            refundable_rate: dec!(0.40),
            max_refundable: dec!(1000),
            max_years_completed: 4,
            phase_out: education_phase_out(),
        },
        llc: LlcLimits {
            max_expenses: dec!(10000),
            rate: dec!(0.20),
            max_credit: dec!(2000),
            phase_out: education_phase_out(),
        },
    }
}

fn child_tax_credit() -> ChildTaxCreditConfig {
    ChildTaxCreditConfig {
        per_child: dec!(2000),
        age_limit: 17,
        other_dependent: dec!(500),
        refundable_per_child: dec!(1700),
        refundable_earned_income_threshold: dec!(2500),
        refundable_rate: dec!(0.15),
        phase_out_threshold: ByFilingStatus::split(dec!(200000), dec!(400000)),
        phase_out_step: dec!(1000),
        phase_out_reduction: dec!(50),
    }
}

fn eic_schedule(
    phase_in_rate: Decimal,
    earned_income_amount: Decimal,
    max_credit: Decimal,
    phase_out_rate: Decimal,
    phase_out_start: Decimal,
    phase_out_start_joint: Decimal,
) -> EicSchedule {
    EicSchedule {
        phase_in_rate,
        earned_income_amount,
        max_credit,
        phase_out_rate,
        // QSS files with single-like EIC thresholds; only MFJ gets the
        // higher start.
        phase_out_start: ByFilingStatus {
            married_filing_jointly: phase_out_start_joint,
            ..ByFilingStatus::split(phase_out_start, phase_out_start)
        },
    }
}

fn earned_income_credit() -> EarnedIncomeCreditTable {
    EarnedIncomeCreditTable {
        schedules: vec![
            eic_schedule(dec!(0.0765), dec!(8490), dec!(649), dec!(0.0765), dec!(10620), dec!(17730)),
            eic_schedule(dec!(0.34), dec!(12730), dec!(4328), dec!(0.1598), dec!(23350), dec!(30470)),
            eic_schedule(dec!(0.40), dec!(17880), dec!(7152), dec!(0.2106), dec!(23350), dec!(30470)),
            eic_schedule(dec!(0.45), dec!(17880), dec!(8046), dec!(0.2106), dec!(23350), dec!(30470)),
        ],
        investment_income_limit: dec!(11950),
        min_age_without_children: 25,
        max_age_without_children: 64,
        child_age_limit: 19,
        student_age_limit: 24,
    }
}

fn flat(rate: Decimal) -> StateTaxRule {
    StateTaxRule::Flat { rate }
}

fn progressive(pairs: &[(Decimal, Decimal)]) -> StateTaxRule {
    StateTaxRule::Progressive {
        brackets: BracketTable::from_pairs(pairs),
    }
}

/// Single-filer schedules, applied to every filing status.
fn states() -> StateTable {
    let mut rules = BTreeMap::new();

    for code in ["AK", "FL", "NV", "NH", "SD", "TN", "TX", "WA", "WY"] {
        rules.insert(code.to_string(), StateTaxRule::None);
    }

    let flat_rates = [
        ("AZ", dec!(0.025)),
        ("CO", dec!(0.044)),
        ("GA", dec!(0.0539)),
        ("ID", dec!(0.05695)),
        ("IL", dec!(0.0495)),
        ("IN", dec!(0.03)),
        ("IA", dec!(0.038)),
        ("KY", dec!(0.04)),
        ("LA", dec!(0.03)),
        ("MI", dec!(0.0425)),
        ("MS", dec!(0.044)),
        ("NC", dec!(0.0425)),
        ("PA", dec!(0.0307)),
        ("UT", dec!(0.045)),
    ];
    for (code, rate) in flat_rates {
        rules.insert(code.to_string(), flat(rate));
    }

    rules.insert(
        "CA".to_string(),
        progressive(&[
            (dec!(0), dec!(0.01)),
            (dec!(10756), dec!(0.02)),
            (dec!(25499), dec!(0.04)),
            (dec!(40245), dec!(0.06)),
            (dec!(55866), dec!(0.08)),
            (dec!(70606), dec!(0.093)),
            (dec!(360659), dec!(0.103)),
            (dec!(432787), dec!(0.113)),
            (dec!(721314), dec!(0.123)),
            (dec!(1000000), dec!(0.133)),
        ]),
    );
    rules.insert(
        "NY".to_string(),
        progressive(&[
            (dec!(0), dec!(0.04)),
            (dec!(8500), dec!(0.045)),
            (dec!(11700), dec!(0.0525)),
            (dec!(13900), dec!(0.055)),
            (dec!(80650), dec!(0.06)),
            (dec!(215400), dec!(0.0685)),
            (dec!(1077550), dec!(0.0965)),
            (dec!(5000000), dec!(0.103)),
            (dec!(25000000), dec!(0.109)),
        ]),
    );
    rules.insert(
        "NJ".to_string(),
        progressive(&[
            (dec!(0), dec!(0.014)),
            (dec!(20000), dec!(0.0175)),
            (dec!(35000), dec!(0.035)),
            (dec!(40000), dec!(0.05525)),
            (dec!(75000), dec!(0.0637)),
            (dec!(500000), dec!(0.0897)),
            (dec!(1000000), dec!(0.1075)),
        ]),
    );
    rules.insert(
        "OR".to_string(),
        progressive(&[
            (dec!(0), dec!(0.0475)),
            (dec!(4400), dec!(0.0675)),
            (dec!(11050), dec!(0.0875)),
            (dec!(125000), dec!(0.099)),
        ]),
    );
    rules.insert(
        "VA".to_string(),
        progressive(&[
            (dec!(0), dec!(0.02)),
            (dec!(3000), dec!(0.03)),
            (dec!(5000), dec!(0.05)),
            (dec!(17000), dec!(0.0575)),
        ]),
    );

    StateTable {
        rules,
        estimate_rate: dec!(0.05),
    }
}
