//! Progressive bracket arithmetic.
//!
//! Used for the federal rate schedules and for every state with a
//! progressive regime. Only the slice of income inside a bracket is taxed at
//! that bracket's rate, so the result is continuous at every boundary.

use rust_decimal::Decimal;

use crate::models::BracketTable;

/// Tax on `taxable_income` under `table`, unrounded.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::BracketTable;
/// use tax_core::calculations::brackets::tax_from_brackets;
///
/// let table = BracketTable::from_pairs(&[
///     (dec!(0), dec!(0.10)),
///     (dec!(11925), dec!(0.12)),
///     (dec!(48475), dec!(0.22)),
/// ]);
///
/// // 11,925 × 10% + (40,000 − 11,925) × 12%
/// assert_eq!(tax_from_brackets(&table, dec!(40000)), dec!(4561.50));
/// ```
pub fn tax_from_brackets(
    table: &BracketTable,
    taxable_income: Decimal,
) -> Decimal {
    if taxable_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    table
        .bands()
        .take_while(|(bracket, _)| bracket.min_income < taxable_income)
        .map(|(bracket, next_bound)| {
            let top = next_bound.map_or(taxable_income, |bound| bound.min(taxable_income));
            (top - bracket.min_income) * bracket.tax_rate
        })
        .sum()
}

/// Rate applied to the last dollar of `taxable_income`.
pub fn marginal_rate(
    table: &BracketTable,
    taxable_income: Decimal,
) -> Decimal {
    table
        .brackets()
        .iter()
        .take_while(|bracket| bracket.min_income < taxable_income)
        .last()
        .or_else(|| table.brackets().first())
        .map_or(Decimal::ZERO, |bracket| bracket.tax_rate)
}

/// Federal income tax before credits for one filing status.
#[derive(Debug, Clone)]
pub struct FederalBracketCalculator<'a> {
    table: &'a BracketTable,
}

impl<'a> FederalBracketCalculator<'a> {
    pub fn new(table: &'a BracketTable) -> Self {
        Self { table }
    }

    pub fn tax(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        tax_from_brackets(self.table, taxable_income)
    }

    pub fn marginal_rate(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        marginal_rate(self.table, taxable_income)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::FilingStatusCode;
    use crate::tables::TaxYearTables;

    fn single() -> BracketTable {
        TaxYearTables::y2025()
            .federal_brackets
            .get(FilingStatusCode::Single)
            .clone()
    }

    // =========================================================================
    // tax_from_brackets tests
    // =========================================================================

    #[test]
    fn zero_income_is_zero_tax() {
        assert_eq!(tax_from_brackets(&single(), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn negative_income_is_zero_tax() {
        assert_eq!(tax_from_brackets(&single(), dec!(-500)), Decimal::ZERO);
    }

    #[test]
    fn first_bracket_only() {
        assert_eq!(tax_from_brackets(&single(), dec!(10000)), dec!(1000.00));
    }

    #[test]
    fn exactly_at_boundary_taxes_lower_bracket_only() {
        assert_eq!(tax_from_brackets(&single(), dec!(11925)), dec!(1192.50));
    }

    #[test]
    fn third_bracket() {
        // 1192.50 + 4386 + (85000 − 48475) × 0.22 = 13614
        assert_eq!(tax_from_brackets(&single(), dec!(85000)), dec!(13614.00));
    }

    #[test]
    fn top_bracket() {
        // 188769.75 + (700000 − 626350) × 0.37
        assert_eq!(tax_from_brackets(&single(), dec!(700000)), dec!(216020.25));
    }

    #[test]
    fn married_filing_jointly_schedule() {
        let tables = TaxYearTables::y2025();
        let table = tables
            .federal_brackets
            .get(FilingStatusCode::MarriedFilingJointly);

        // 2385 + (55000 − 23850) × 0.12
        assert_eq!(tax_from_brackets(table, dec!(55000)), dec!(6123.00));
    }

    #[test]
    fn tax_is_continuous_across_boundaries() {
        let table = single();
        let cent = dec!(0.01);

        for bracket in table.brackets().iter().skip(1) {
            let below = tax_from_brackets(&table, bracket.min_income - cent);
            let at = tax_from_brackets(&table, bracket.min_income);
            let above = tax_from_brackets(&table, bracket.min_income + cent);

            assert!(at - below <= cent, "jump below {}", bracket.min_income);
            assert!(above - at <= cent, "jump above {}", bracket.min_income);
        }
    }

    #[test]
    fn tax_is_non_decreasing_for_every_status() {
        let tables = TaxYearTables::y2025();

        for (status, table) in tables.federal_brackets.iter() {
            let mut previous = Decimal::ZERO;
            let mut income = Decimal::ZERO;
            while income <= dec!(900000) {
                let tax = tax_from_brackets(table, income);
                assert!(tax >= previous, "{status:?} decreased at {income}");
                previous = tax;
                income += dec!(7321.37);
            }
        }
    }

    // =========================================================================
    // marginal_rate tests
    // =========================================================================

    #[test]
    fn marginal_rate_reports_bracket_of_last_dollar() {
        let table = single();

        assert_eq!(marginal_rate(&table, dec!(40000)), dec!(0.12));
        assert_eq!(marginal_rate(&table, dec!(11925)), dec!(0.10));
        assert_eq!(marginal_rate(&table, dec!(11925.01)), dec!(0.12));
    }

    #[test]
    fn marginal_rate_at_zero_is_first_rate() {
        assert_eq!(marginal_rate(&single(), Decimal::ZERO), dec!(0.10));
    }

    #[test]
    fn calculator_delegates_to_table() {
        let table = single();
        let calculator = FederalBracketCalculator::new(&table);

        assert_eq!(calculator.tax(dec!(40000)), dec!(4561.50));
        assert_eq!(calculator.marginal_rate(dec!(40000)), dec!(0.12));
    }
}
