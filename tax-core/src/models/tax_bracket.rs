use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tables::TablesError;

/// A single marginal-rate bracket: income above `min_income` (up to the next
/// bracket's lower bound) is taxed at `tax_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            tax_rate,
        }
    }
}

/// Ordered, non-overlapping bracket schedule.
///
/// Lower bounds start at zero and strictly increase; the last bracket is
/// unbounded. Use [`BracketTable::validate`] on tables that did not come
/// from the built-in constants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BracketTable(Vec<TaxBracket>);

impl BracketTable {
    pub fn new(brackets: Vec<TaxBracket>) -> Self {
        Self(brackets)
    }

    /// Builds a table from `(min_income, rate)` pairs.
    pub fn from_pairs(pairs: &[(Decimal, Decimal)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(min_income, rate)| TaxBracket::new(*min_income, *rate))
                .collect(),
        )
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates each bracket together with the next bracket's lower bound
    /// (`None` for the unbounded top bracket).
    pub fn bands(&self) -> impl Iterator<Item = (&TaxBracket, Option<Decimal>)> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, bracket)| (bracket, self.0.get(i + 1).map(|next| next.min_income)))
    }

    /// Checks the structural invariants of the schedule.
    ///
    /// `section` names the table in error messages (e.g. `"federal S"`).
    ///
    /// # Errors
    ///
    /// Returns [`TablesError`] if the table is empty, does not start at
    /// zero, has bounds that do not strictly increase, or has a rate
    /// outside `[0, 1]`.
    pub fn validate(
        &self,
        section: &str,
    ) -> Result<(), TablesError> {
        let first = self.0.first().ok_or_else(|| TablesError::EmptyBrackets {
            section: section.to_string(),
        })?;

        if first.min_income != Decimal::ZERO {
            return Err(TablesError::FirstBracketNotZero {
                section: section.to_string(),
                value: first.min_income,
            });
        }

        for pair in self.0.windows(2) {
            if pair[1].min_income <= pair[0].min_income {
                return Err(TablesError::UnorderedBrackets {
                    section: section.to_string(),
                    previous: pair[0].min_income,
                    next: pair[1].min_income,
                });
            }
        }

        for bracket in &self.0 {
            crate::tables::check_rate(section, bracket.tax_rate)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn sample() -> BracketTable {
        BracketTable::from_pairs(&[
            (dec!(0), dec!(0.10)),
            (dec!(10000), dec!(0.20)),
            (dec!(50000), dec!(0.30)),
        ])
    }

    #[test]
    fn bands_pair_each_bracket_with_next_bound() {
        let table = sample();

        let bounds: Vec<Option<Decimal>> = table.bands().map(|(_, next)| next).collect();

        assert_eq!(bounds, vec![Some(dec!(10000)), Some(dec!(50000)), None]);
    }

    #[test]
    fn validate_accepts_well_formed_table() {
        assert_eq!(sample().validate("test"), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_table() {
        let result = BracketTable::default().validate("test");

        assert_eq!(
            result,
            Err(TablesError::EmptyBrackets {
                section: "test".to_string()
            })
        );
    }

    #[test]
    fn validate_rejects_nonzero_first_bound() {
        let table = BracketTable::from_pairs(&[(dec!(100), dec!(0.10))]);

        assert_eq!(
            table.validate("test"),
            Err(TablesError::FirstBracketNotZero {
                section: "test".to_string(),
                value: dec!(100),
            })
        );
    }

    #[test]
    fn validate_rejects_repeated_bound() {
        let table = BracketTable::from_pairs(&[
            (dec!(0), dec!(0.10)),
            (dec!(5000), dec!(0.12)),
            (dec!(5000), dec!(0.22)),
        ]);

        assert_eq!(
            table.validate("test"),
            Err(TablesError::UnorderedBrackets {
                section: "test".to_string(),
                previous: dec!(5000),
                next: dec!(5000),
            })
        );
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let table = BracketTable::from_pairs(&[(dec!(0), dec!(1.5))]);

        assert_eq!(
            table.validate("test"),
            Err(TablesError::InvalidRate {
                section: "test".to_string(),
                value: dec!(1.5),
            })
        );
    }
}
