//! Self-employment tax.
//!
//! Follows the short Schedule SE computation:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Net profit from self-employment (1099-NEC + 1099-K − Schedule C expenses) |
//! | 2    | Net earnings: Step 1 × 92.35% (net earnings factor) |
//! | 3    | Self-employment tax: Step 2 × 15.3% |
//! | 4    | Deductible part of SE tax: Step 3 × 50%, an adjustment to income |
//!
//! The simulation applies no social security wage base and no filing
//! threshold, so SE tax is linear in net profit.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::self_emp::{SeTaxConfig, SelfEmploymentTax};
//!
//! let config = SeTaxConfig {
//!     net_earnings_factor: dec!(0.9235),
//!     se_tax_rate: dec!(0.153),
//!     deduction_factor: dec!(0.50),
//! };
//!
//! let result = SelfEmploymentTax::new(&config).calculate(dec!(10000));
//!
//! assert_eq!(result.net_earnings, dec!(9235));
//! assert_eq!(result.self_employment_tax, dec!(1412.955));
//! assert_eq!(result.se_tax_deduction, dec!(706.4775));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tables::{TablesError, check_rate};

/// Rates for the self-employment tax computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeTaxConfig {
    /// Share of net profit treated as net earnings (Step 2 multiplier).
    ///
    /// Models the employer-equivalent adjustment; 92.35% for 2025.
    pub net_earnings_factor: Decimal,

    /// Combined social security and Medicare rate (Step 3 multiplier).
    ///
    /// 12.4% + 2.9% = 15.3%.
    pub se_tax_rate: Decimal,

    /// Deductible share of SE tax (Step 4 multiplier), typically 50%.
    pub deduction_factor: Decimal,
}

impl SeTaxConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`TablesError`] if:
    /// - `net_earnings_factor` is not in (0, 1]
    /// - `se_tax_rate` is not in [0, 1]
    /// - `deduction_factor` is not in [0, 1]
    pub fn validate(&self) -> Result<(), TablesError> {
        if self.net_earnings_factor <= Decimal::ZERO || self.net_earnings_factor > Decimal::ONE {
            return Err(TablesError::InvalidNetEarningsFactor(
                self.net_earnings_factor,
            ));
        }
        check_rate("self-employment tax rate", self.se_tax_rate)?;
        check_rate("self-employment deduction factor", self.deduction_factor)?;
        Ok(())
    }
}

/// Informational notices raised by the SE computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeNotice {
    /// Schedule SE must be attached to the return.
    ScheduleSeRequired,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeTaxResult {
    /// Net profit the computation started from (Step 1).
    pub se_income: Decimal,

    /// Step 2.
    pub net_earnings: Decimal,

    /// Step 3.
    pub self_employment_tax: Decimal,

    /// Step 4. Reduces AGI.
    pub se_tax_deduction: Decimal,

    pub notices: Vec<SeNotice>,
}

/// Calculator for self-employment tax.
#[derive(Debug, Clone)]
pub struct SelfEmploymentTax<'a> {
    config: &'a SeTaxConfig,
}

impl<'a> SelfEmploymentTax<'a> {
    pub fn new(config: &'a SeTaxConfig) -> Self {
        Self { config }
    }

    /// Computes SE tax and its deductible half from net self-employment
    /// profit. Zero or negative profit yields an all-zero result with no
    /// notices.
    pub fn calculate(
        &self,
        se_income: Decimal,
    ) -> SeTaxResult {
        if se_income <= Decimal::ZERO {
            if se_income < Decimal::ZERO {
                warn!(
                    se_income = %se_income,
                    "Self-employment income is negative; SE tax will be zero"
                );
            }
            return SeTaxResult::default();
        }

        let net_earnings = self.net_earnings(se_income);
        let self_employment_tax = self.self_employment_tax(net_earnings);
        let se_tax_deduction = self.se_tax_deduction(self_employment_tax);

        debug!(
            se_income = %se_income,
            net_earnings = %net_earnings,
            self_employment_tax = %self_employment_tax,
            "Computed self-employment tax"
        );

        SeTaxResult {
            se_income,
            net_earnings,
            self_employment_tax,
            se_tax_deduction,
            notices: vec![SeNotice::ScheduleSeRequired],
        }
    }

    /// Step 2: net profit × net earnings factor.
    fn net_earnings(
        &self,
        se_income: Decimal,
    ) -> Decimal {
        se_income * self.config.net_earnings_factor
    }

    /// Step 3: net earnings × combined rate.
    fn self_employment_tax(
        &self,
        net_earnings: Decimal,
    ) -> Decimal {
        net_earnings * self.config.se_tax_rate
    }

    /// Step 4: SE tax × deduction factor.
    fn se_tax_deduction(
        &self,
        self_employment_tax: Decimal,
    ) -> Decimal {
        self_employment_tax * self.config.deduction_factor
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;

    fn test_config() -> SeTaxConfig {
        SeTaxConfig {
            net_earnings_factor: dec!(0.9235),
            se_tax_rate: dec!(0.153),
            deduction_factor: dec!(0.50),
        }
    }

    /// Initializes tracing subscriber for tests that verify log output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // SeTaxConfig::validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_valid_config() {
        assert_eq!(test_config().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_zero_net_earnings_factor() {
        let config = SeTaxConfig {
            net_earnings_factor: dec!(0.00),
            ..test_config()
        };

        assert_eq!(
            config.validate(),
            Err(TablesError::InvalidNetEarningsFactor(dec!(0.00)))
        );
    }

    #[test]
    fn validate_rejects_net_earnings_factor_greater_than_one() {
        let config = SeTaxConfig {
            net_earnings_factor: dec!(1.5),
            ..test_config()
        };

        assert_eq!(
            config.validate(),
            Err(TablesError::InvalidNetEarningsFactor(dec!(1.5)))
        );
    }

    #[test]
    fn validate_rejects_negative_se_rate() {
        let config = SeTaxConfig {
            se_tax_rate: dec!(-0.1),
            ..test_config()
        };

        assert_eq!(
            config.validate(),
            Err(TablesError::InvalidRate {
                section: "self-employment tax rate".to_string(),
                value: dec!(-0.1),
            })
        );
    }

    #[test]
    fn validate_rejects_deduction_factor_greater_than_one() {
        let config = SeTaxConfig {
            deduction_factor: dec!(1.5),
            ..test_config()
        };

        assert_eq!(
            config.validate(),
            Err(TablesError::InvalidRate {
                section: "self-employment deduction factor".to_string(),
                value: dec!(1.5),
            })
        );
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn calculate_applies_factor_then_rate() {
        let config = test_config();

        let result = SelfEmploymentTax::new(&config).calculate(dec!(10000));

        assert_eq!(result.se_income, dec!(10000));
        assert_eq!(result.net_earnings, dec!(9235));
        assert_eq!(result.self_employment_tax, dec!(1412.955));
        assert_eq!(result.se_tax_deduction, dec!(706.4775));
        assert_eq!(result.notices, vec![SeNotice::ScheduleSeRequired]);
    }

    #[test]
    fn calculate_zero_income_yields_zero_and_no_notices() {
        let config = test_config();

        let result = SelfEmploymentTax::new(&config).calculate(Decimal::ZERO);

        assert_eq!(result, SeTaxResult::default());
        assert!(result.notices.is_empty());
    }

    #[test]
    fn calculate_negative_income_yields_zero() {
        let _guard = init_test_tracing();
        let config = test_config();

        let result = SelfEmploymentTax::new(&config).calculate(dec!(-1500));

        assert_eq!(result.self_employment_tax, Decimal::ZERO);
        assert_eq!(result.se_tax_deduction, Decimal::ZERO);
    }

    #[test]
    fn se_tax_is_linear_in_income() {
        let config = test_config();
        let calculator = SelfEmploymentTax::new(&config);
        let base = calculator.calculate(dec!(12345.67)).self_employment_tax;

        for k in [dec!(0), dec!(0.5), dec!(2), dec!(3.75), dec!(10)] {
            let scaled = calculator.calculate(dec!(12345.67) * k).self_employment_tax;
            assert_eq!(scaled, base * k, "k = {k}");
        }
    }

    #[test]
    fn deduction_is_half_of_se_tax() {
        let config = test_config();

        let result = SelfEmploymentTax::new(&config).calculate(dec!(87654.32));

        assert_eq!(result.se_tax_deduction * dec!(2), result.self_employment_tax);
    }

    #[test]
    fn large_income_has_no_wage_base_cap() {
        let config = test_config();

        let result = SelfEmploymentTax::new(&config).calculate(dec!(500000));

        assert_eq!(result.self_employment_tax, dec!(70647.75));
    }
}
