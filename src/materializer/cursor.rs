use crate::error::EtlError;
use crate::sqlite::{distinct_count_query, quote_ident, SqliteHandle};

use super::models::RowBatch;


/// Number of extraction windows needed to cover `distinct_keys` keys.
///
/// Integer division plus one: the trailing window is allocated even when the
/// key count divides evenly, so every table gets at least one window and the
/// final window may legitimately extract zero rows.
pub fn window_count(distinct_keys: i64, window_size: usize) -> usize {
    let keys = if distinct_keys > 0 {
        distinct_keys as usize
    } else {
        0
    };
    keys / window_size.max(1) + 1
}

/// Extraction statement for one window: every row whose key falls in one
/// ordered block of distinct keys. The block bounds are bound parameters
/// (LIMIT, then OFFSET), never spliced literals.
pub fn chunk_query(table: &str, key_column: &str) -> String {
    let table = quote_ident(table);
    let key = quote_ident(key_column);
    format!(
        "SELECT * FROM {table} WHERE {key} IN \
         (SELECT DISTINCT {key} FROM {table} ORDER BY {key} LIMIT ? OFFSET ?)"
    )
}

pub async fn distinct_key_count(
    source: &mut SqliteHandle,
    table: &str,
    key_column: &str,
) -> Result<i64, EtlError> {
    source
        .fetch_scalar(&distinct_count_query(table, key_column))
        .await
        .map_err(|e| {
            EtlError::Extraction(format!(
                "Failed to count distinct '{}' values in '{}': {}",
                key_column, table, e
            ))
        })
}

pub async fn fetch_window(
    source: &mut SqliteHandle,
    table: &str,
    key_column: &str,
    window_size: usize,
    window_index: usize,
) -> Result<RowBatch, EtlError> {
    let query = chunk_query(table, key_column);
    let limit = window_size as i64;
    let offset = (window_size * window_index) as i64;

    source.fetch_bound(&query, &[limit, offset]).await.map_err(|e| {
        EtlError::Extraction(format!(
            "Failed to extract window {} from '{}': {}",
            window_index, table, e
        ))
    })
}
