//! Integration tests for loading tax-year tables from the files under
//! `test-data/`.

use std::path::Path;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_core::{FilingStatusCode, TaxBracket, TaxYearTables};
use tax_data::{BracketCsvLoader, TablesLoaderError, TaxYearLoader};

const TEST_CSV_2025: &str = include_str!("../test-data/tax_brackets_2025.csv");
const TEST_TOML_2025: &str = include_str!("../test-data/tax_year_2025.toml");

fn test_data(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data").join(name)
}

#[test]
fn test_parse_all_2025_brackets() {
    let records = BracketCsvLoader::parse(TEST_CSV_2025.as_bytes()).expect("Failed to parse CSV");

    // 7 brackets for each of the 4 IRS schedules
    assert_eq!(records.len(), 28);
}

#[test]
fn test_csv_brackets_match_builtin_tables() {
    let records = BracketCsvLoader::parse(TEST_CSV_2025.as_bytes()).expect("Failed to parse CSV");

    let brackets = BracketCsvLoader::to_tables(&records, 2025).expect("Failed to build tables");

    assert_eq!(brackets, TaxYearTables::y2025().federal_brackets);
}

#[test]
fn test_csv_single_top_bracket() {
    let records = BracketCsvLoader::parse(TEST_CSV_2025.as_bytes()).unwrap();
    let brackets = BracketCsvLoader::to_tables(&records, 2025).unwrap();

    let single = brackets.get(FilingStatusCode::Single).brackets();

    assert_eq!(single.len(), 7);
    assert_eq!(single[6], TaxBracket::new(dec!(626350), dec!(0.37)));
}

#[test]
fn test_csv_for_unknown_year_is_missing_schedules() {
    let records = BracketCsvLoader::parse(TEST_CSV_2025.as_bytes()).unwrap();

    let result = BracketCsvLoader::to_tables(&records, 2026);

    assert!(matches!(
        result,
        Err(TablesLoaderError::MissingSchedule { tax_year: 2026, .. })
    ));
}

#[test]
fn test_toml_tables_match_builtin_tables() {
    let tables = TaxYearLoader::from_toml_str(TEST_TOML_2025).expect("Failed to load TOML");

    assert_eq!(tables, TaxYearTables::y2025());
}

#[test]
fn test_toml_omitted_phase_out_is_unavailable() {
    let tables = TaxYearLoader::from_toml_str(TEST_TOML_2025).unwrap();

    assert_eq!(
        *tables
            .education
            .aotc
            .phase_out
            .get(FilingStatusCode::MarriedFilingSeparately),
        None
    );
}

#[test]
fn test_load_tables_and_brackets_from_files() {
    let tables = TaxYearLoader::from_path(&test_data("tax_year_2025.toml")).unwrap();

    let tables = TaxYearLoader::with_brackets(tables, &test_data("tax_brackets_2025.csv")).unwrap();

    assert_eq!(tables, TaxYearTables::y2025());
}

#[test]
fn test_unordered_state_brackets_fail_validation() {
    let broken = TEST_TOML_2025.replacen(
        "[[states.rules.VA.brackets]]\nmin_income = \"3000\"",
        "[[states.rules.VA.brackets]]\nmin_income = \"30000\"",
        1,
    );
    assert_ne!(broken, TEST_TOML_2025);

    let err = TaxYearLoader::from_toml_str(&broken).expect_err("should fail validation");

    match err {
        TablesLoaderError::Invalid { tax_year, source } => {
            assert_eq!(tax_year, 2025);
            assert_eq!(
                source.to_string(),
                "state VA: bracket bounds must strictly increase (30000 then 5000)"
            );
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn test_unknown_state_code_fails_validation() {
    let broken = format!("{TEST_TOML_2025}\n[states.rules.ZZ]\nregime = \"none\"\n");

    let err = TaxYearLoader::from_toml_str(&broken).expect_err("should fail validation");

    assert!(
        matches!(err, TablesLoaderError::Invalid { ref source, .. } if source.to_string().contains("ZZ")),
        "got {err:?}"
    );
}
