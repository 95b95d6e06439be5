use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tables::TablesError;

/// AGI band over which a credit shrinks linearly from its full amount to
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOutRange {
    pub start: Decimal,
    pub end: Decimal,
}

impl PhaseOutRange {
    pub fn new(
        start: Decimal,
        end: Decimal,
    ) -> Self {
        Self { start, end }
    }

    /// Fraction of the credit that survives at `agi`, in `[0, 1]`.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::PhaseOutRange;
    ///
    /// let range = PhaseOutRange::new(dec!(80000), dec!(90000));
    ///
    /// assert_eq!(range.remaining_fraction(dec!(70000)), dec!(1));
    /// assert_eq!(range.remaining_fraction(dec!(85000)), dec!(0.5));
    /// assert_eq!(range.remaining_fraction(dec!(95000)), dec!(0));
    /// ```
    pub fn remaining_fraction(
        &self,
        agi: Decimal,
    ) -> Decimal {
        if agi <= self.start {
            return Decimal::ONE;
        }
        if agi >= self.end {
            return Decimal::ZERO;
        }
        (self.end - agi) / (self.end - self.start)
    }

    /// True once `agi` has reached the end of the band.
    pub fn fully_phased_out(
        &self,
        agi: Decimal,
    ) -> bool {
        agi >= self.end
    }

    pub fn validate(
        &self,
        section: &str,
    ) -> Result<(), TablesError> {
        crate::tables::check_non_negative(section, self.start)?;
        if self.start >= self.end {
            return Err(TablesError::InvalidPhaseOut {
                section: section.to_string(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}
