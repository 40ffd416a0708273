//! Row cleaners injected into the chunked builder. Pure and total: a
//! missing or null field becomes the empty-string sentinel, never an error.

use serde_json::Value;

use crate::materializer::models::RowBatch;

#[cfg(test)]
mod tests;

fn scrub_value(value: Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::String(text) => Value::String(text.trim().to_string()),
        other => other,
    }
}

fn scrub(batch: RowBatch) -> RowBatch {
    RowBatch {
        columns: batch.columns,
        rows: batch
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(scrub_value).collect())
            .collect(),
    }
}

/// Cleaner for natural-person rows (directors, beneficial owners).
pub fn clean_person_rows(batch: RowBatch) -> Result<RowBatch, String> {
    Ok(scrub(batch))
}

/// Cleaner for legal-entity rows: same scrubbing, plus company names
/// normalized to upper case for downstream search.
pub fn clean_company_rows(batch: RowBatch) -> Result<RowBatch, String> {
    let mut batch = scrub(batch);
    let denomination_index = batch
        .columns
        .iter()
        .position(|column| column == "denomination");

    if let Some(index) = denomination_index {
        for row in &mut batch.rows {
            if let Some(Value::String(name)) = row.get_mut(index) {
                *name = name.to_uppercase();
            }
        }
    }

    Ok(batch)
}
