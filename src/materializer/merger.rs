use serde_json::Value;

use crate::error::EtlError;
use crate::sqlite::{quote_ident, SqliteHandle};

use super::models::{MergeOutcome, MergeSpec};


/// Folds a secondary registry database into the primary one.
///
/// The secondary file is attached under the spec's alias, then two passes
/// run as independently committed statements: the update pass refreshes
/// fields of primary rows that match a secondary key, and the
/// insert-remainder pass inserts secondary rows whose key is still absent,
/// silently skipping key collisions (`INSERT OR IGNORE` leniency is part of
/// the contract). A unique-key violation during the update pass means the
/// two sources disagree and must be investigated: it is re-raised as a
/// `MergeIntegrity` error carrying the conflicting key values, which the
/// merger looks up itself in the attached secondary. The attachment is
/// released when the caller closes the connection, which it must do on
/// every path.
pub async fn merge(
    primary: &mut SqliteHandle,
    secondary_location: &str,
    spec: &MergeSpec,
) -> Result<MergeOutcome, EtlError> {
    spec.validate().map_err(EtlError::Merge)?;

    primary
        .attach(secondary_location, &spec.alias)
        .await
        .map_err(|e| EtlError::Merge(format!("Failed to attach secondary database: {}", e)))?;

    let updated_rows = match primary.execute_raw(&spec.update_query).await {
        Ok(count) => count,
        Err(e) if is_unique_violation(&e) => {
            let keys = conflicting_keys(primary, spec).await;
            log::error!(
                "Integrity failure updating '{}' from {}.'{}'; conflicting '{}' values: {:?}",
                spec.primary_table,
                spec.alias,
                spec.secondary_table,
                spec.key_column,
                keys
            );
            return Err(EtlError::MergeIntegrity {
                keys,
                message: e.to_string(),
            });
        }
        Err(e) => {
            log::error!("Merge update pass failed: {}", e);
            return Err(EtlError::Merge(format!("Update pass failed: {}", e)));
        }
    };
    log::info!(
        "Merge update pass refreshed {} rows in '{}'",
        updated_rows,
        spec.primary_table
    );

    let inserted_rows = primary
        .execute_raw(&spec.insert_remainder_query)
        .await
        .map_err(|e| {
            log::error!("Merge insert-remainder pass failed: {}", e);
            EtlError::Merge(format!("Insert-remainder pass failed: {}", e))
        })?;
    log::info!(
        "Merge insert-remainder pass added {} rows to '{}'",
        inserted_rows,
        spec.primary_table
    );

    Ok(MergeOutcome {
        updated_rows,
        inserted_rows,
    })
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
        .unwrap_or(false)
}

/// Key values in the attached secondary that appear more than once, which is
/// what makes an update pass collide on a unique-indexed primary. Best
/// effort: diagnostics only, an empty list never masks the original error.
async fn conflicting_keys(primary: &mut SqliteHandle, spec: &MergeSpec) -> Vec<String> {
    let key = quote_ident(&spec.key_column);
    let query = format!(
        "SELECT {key} FROM {}.{} GROUP BY {key} HAVING COUNT(*) > 1",
        quote_ident(&spec.alias),
        quote_ident(&spec.secondary_table),
    );

    match primary.fetch(&query).await {
        Ok(batch) => batch
            .rows
            .iter()
            .filter_map(|row| row.first())
            .map(value_to_text)
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
