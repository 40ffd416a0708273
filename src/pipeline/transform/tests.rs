use super::*;
use serde_json::json;

fn batch(columns: &[&str], rows: Vec<Vec<Value>>) -> RowBatch {
    RowBatch {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

#[test]
fn nulls_become_the_empty_string_sentinel() {
    let cleaned = clean_person_rows(batch(
        &["siren", "nom"],
        vec![vec![Value::Null, Value::String("dupont".to_string())]],
    ))
    .unwrap();
    assert_eq!(cleaned.rows[0][0], Value::String(String::new()));
}

#[test]
fn string_fields_are_trimmed() {
    let cleaned = clean_person_rows(batch(
        &["siren", "nom"],
        vec![vec![
            Value::String(" 000000001 ".to_string()),
            Value::String("  dupont".to_string()),
        ]],
    ))
    .unwrap();
    assert_eq!(cleaned.rows[0][0], Value::String("000000001".to_string()));
    assert_eq!(cleaned.rows[0][1], Value::String("dupont".to_string()));
}

#[test]
fn numeric_fields_pass_through_untouched() {
    let cleaned = clean_person_rows(batch(&["siren", "n"], vec![vec![json!("1"), json!(3)]]))
        .unwrap();
    assert_eq!(cleaned.rows[0][1], json!(3));
}

#[test]
fn company_names_are_uppercased() {
    let cleaned = clean_company_rows(batch(
        &["siren", "denomination"],
        vec![vec![
            Value::String("000000001".to_string()),
            Value::String("boulangerie du coin".to_string()),
        ]],
    ))
    .unwrap();
    assert_eq!(
        cleaned.rows[0][1],
        Value::String("BOULANGERIE DU COIN".to_string())
    );
}

#[test]
fn company_cleaner_tolerates_missing_denomination_column() {
    let cleaned = clean_company_rows(batch(
        &["siren"],
        vec![vec![Value::String("000000001".to_string())]],
    ))
    .unwrap();
    assert_eq!(cleaned.rows.len(), 1);
}

#[test]
fn cleaners_are_total_over_empty_batches() {
    assert!(clean_person_rows(RowBatch::default()).unwrap().is_empty());
    assert!(clean_company_rows(RowBatch::default()).unwrap().is_empty());
}
