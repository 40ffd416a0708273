use crate::error::EtlError;
use crate::sqlite::SqliteHandle;

use super::models::{BuildOutcome, BuildSpec, RowTransformer};
use super::{cursor, lifecycle};

#[cfg(test)]
mod tests;

/// Fully (re)populates one destination table from one source table across
/// two independent connections.
///
/// The destination is dropped, created from its DDL, and indexed before the
/// first row lands; windows are then processed strictly in increasing index
/// order, each extracted from `source`, run through `transform`, and
/// appended to `dest` in its own transaction. Any failure aborts the build
/// and leaves the destination invalid; re-running is safe because the next
/// run starts from the drop. The caller commits and closes both handles on
/// every exit path.
pub async fn build(
    source: &mut SqliteHandle,
    dest: &mut SqliteHandle,
    spec: &BuildSpec,
    transform: &RowTransformer,
) -> Result<BuildOutcome, EtlError> {
    spec.validate().map_err(EtlError::Schema)?;

    lifecycle::drop_if_exists(dest, &spec.dest_table).await?;
    lifecycle::create(dest, &spec.dest_table, &spec.dest_ddl).await?;
    lifecycle::create_index(dest, &spec.dest_table, &spec.index).await?;

    let distinct_keys =
        cursor::distinct_key_count(source, &spec.source_table, &spec.key_column).await?;
    let window_count = cursor::window_count(distinct_keys, spec.window_size);
    log::info!(
        "Building '{}' from '{}': {} distinct keys, {} windows of {}",
        spec.dest_table,
        spec.source_table,
        distinct_keys,
        window_count,
        spec.window_size
    );

    let mut written_rows = 0u64;
    for window_index in 0..window_count {
        let extracted = cursor::fetch_window(
            source,
            &spec.source_table,
            &spec.key_column,
            spec.window_size,
            window_index,
        )
        .await?;
        let extracted_len = extracted.len();

        let cleaned = transform(extracted).map_err(|e| {
            EtlError::Transform(format!(
                "Transformer failed on window {} of '{}': {}",
                window_index, spec.source_table, e
            ))
        })?;

        let appended = dest
            .append_rows(&spec.dest_table, &cleaned)
            .await
            .map_err(|e| {
                EtlError::Query(format!(
                    "Failed to append window {} into '{}': {}",
                    window_index, spec.dest_table, e
                ))
            })?;
        written_rows = written_rows.saturating_add(appended);

        log::info!(
            "Window {}/{}: extracted {} rows, appended {} to '{}'",
            window_index + 1,
            window_count,
            extracted_len,
            appended,
            spec.dest_table
        );
    }

    Ok(BuildOutcome {
        dest_table: spec.dest_table.clone(),
        distinct_keys,
        window_count,
        written_rows,
    })
}
