use crate::error::EtlError;
use crate::sqlite::SqliteHandle;

use super::models::ReplaceOutcome;


/// Re-derives a destination table's content with a single
/// `REPLACE INTO ... SELECT` statement over source tables in the same
/// logical database: rows whose key already exists are overwritten in
/// place, new keys are inserted. Idempotent whether the destination was
/// empty or already held stale rows for the same key space; constraint
/// violations surface as-is, with no retry here.
pub async fn replace(
    conn: &mut SqliteHandle,
    replace_query: &str,
) -> Result<ReplaceOutcome, EtlError> {
    let affected_rows = conn
        .execute_raw(replace_query)
        .await
        .map_err(|e| EtlError::Query(format!("Replace statement failed: {}", e)))?;

    log::info!("Replace statement affected {} rows", affected_rows);
    Ok(ReplaceOutcome { affected_rows })
}
