use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::calculations::brackets::tax_from_brackets;
use tax_core::{BracketTable, ByFilingStatus, FilingStatusCode, TaxBracket, TaxYearTables};
use tracing::debug;

use crate::TablesLoaderError;

/// IRS rate schedules in the order they are checked.
pub const SCHEDULES: [&str; 4] = ["X", "Y-1", "Y-2", "Z"];

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single
/// - Schedule Y-1 → Married Filing Jointly and Qualifying Surviving Spouse
/// - Schedule Y-2 → Married Filing Separately
/// - Schedule Z → Head of Household
fn schedule_to_filing_statuses(
    schedule: &str
) -> Result<&'static [FilingStatusCode], TablesLoaderError> {
    match schedule {
        "X" => Ok(&[FilingStatusCode::Single]),
        "Y-1" => Ok(&[
            FilingStatusCode::MarriedFilingJointly,
            FilingStatusCode::QualifyingSurvivingSpouse,
        ]),
        "Y-2" => Ok(&[FilingStatusCode::MarriedFilingSeparately]),
        "Z" => Ok(&[FilingStatusCode::HeadOfHousehold]),
        _ => Err(TablesLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from the tax brackets CSV file.
///
/// The CSV format uses IRS schedule designations:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: The minimum income for this bracket
/// - `max_income`: The maximum income for this bracket (empty for unlimited)
/// - `base_tax`: Tax on all income below `min_income`
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for federal bracket schedules published as CSV.
///
/// The CSV carries the IRS presentation (`min`, `max`, `base_tax`, `rate`);
/// the engine only needs `(min_income, rate)` pairs. The redundant columns
/// are used to check the schedule: every bracket must end where the next
/// one starts, the top bracket must be unbounded, and `base_tax` must equal
/// the tax on income up to `min_income`.
pub struct BracketCsvLoader;

impl BracketCsvLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, TablesLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Builds the per-filing-status bracket tables for `tax_year`.
    ///
    /// Records for other years are ignored. All four schedules must be
    /// present; Y-1 fills both MFJ and QSS.
    pub fn to_tables(
        records: &[BracketRecord],
        tax_year: i32,
    ) -> Result<ByFilingStatus<BracketTable>, TablesLoaderError> {
        let mut groups: BTreeMap<&str, Vec<&BracketRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            // Reject unknown codes before grouping.
            schedule_to_filing_statuses(&record.schedule)?;
            groups.entry(record.schedule.as_str()).or_default().push(record);
        }

        let mut tables = ByFilingStatus::<BracketTable>::default();
        for schedule in SCHEDULES {
            let Some(mut group) = groups.remove(schedule) else {
                return Err(TablesLoaderError::MissingSchedule {
                    schedule: schedule.to_string(),
                    tax_year,
                });
            };
            group.sort_by(|a, b| a.min_income.cmp(&b.min_income));

            let table = schedule_table(schedule, &group)?;
            for status in schedule_to_filing_statuses(schedule)? {
                *tables.get_mut(*status) = table.clone();
            }
            debug!(schedule, brackets = group.len(), "Loaded bracket schedule");
        }

        Ok(tables)
    }

    /// Replaces the federal brackets of `tables` with the CSV schedules for
    /// the same tax year.
    pub fn apply(
        records: &[BracketRecord],
        tables: &mut TaxYearTables,
    ) -> Result<(), TablesLoaderError> {
        tables.federal_brackets = Self::to_tables(records, tables.tax_year)?;
        Ok(())
    }
}

/// Checks one sorted schedule and converts it to a [`BracketTable`].
fn schedule_table(
    schedule: &str,
    group: &[&BracketRecord],
) -> Result<BracketTable, TablesLoaderError> {
    for pair in group.windows(2) {
        if pair[0].max_income != Some(pair[1].min_income) {
            return Err(TablesLoaderError::GapInSchedule {
                schedule: schedule.to_string(),
                max_income: pair[0]
                    .max_income
                    .map_or_else(|| "unbounded".to_string(), |max| max.to_string()),
                next_min: pair[1].min_income,
            });
        }
    }
    if let Some(max_income) = group.last().and_then(|top| top.max_income) {
        return Err(TablesLoaderError::BoundedTopBracket {
            schedule: schedule.to_string(),
            max_income,
        });
    }

    let table = BracketTable::new(
        group
            .iter()
            .map(|record| TaxBracket::new(record.min_income, record.rate))
            .collect(),
    );

    for record in group {
        let expected = tax_from_brackets(&table, record.min_income);
        if expected != record.base_tax {
            return Err(TablesLoaderError::BaseTaxMismatch {
                schedule: schedule.to_string(),
                min_income: record.min_income,
                expected,
                found: record.base_tax,
            });
        }
    }

    Ok(table)
}
