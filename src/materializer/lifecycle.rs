//! Destination-table schema management. No data rows are touched here;
//! the builder owns population.

use crate::error::EtlError;
use crate::sqlite::{quote_ident, SqliteHandle};

use super::models::IndexSpec;


pub async fn drop_if_exists(dest: &mut SqliteHandle, table: &str) -> Result<(), EtlError> {
    dest.execute_raw(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
        .await
        .map_err(|e| EtlError::Schema(format!("Failed to drop table '{}': {}", table, e)))?;
    Ok(())
}

/// Creates the table from its DDL. Fails if the DDL is malformed or the
/// table still exists; callers drop first.
pub async fn create(dest: &mut SqliteHandle, table: &str, ddl: &str) -> Result<(), EtlError> {
    dest.execute_raw(ddl)
        .await
        .map_err(|e| EtlError::Schema(format!("Failed to create table '{}': {}", table, e)))?;
    Ok(())
}

/// Creates the index before population begins. Re-creation on a populated
/// table is not supported; a duplicate index name is a schema error.
pub async fn create_index(
    dest: &mut SqliteHandle,
    table: &str,
    index: &IndexSpec,
) -> Result<(), EtlError> {
    let uniqueness = if index.unique { "UNIQUE " } else { "" };
    let statement = format!(
        "CREATE {}INDEX {} ON {} ({})",
        uniqueness,
        quote_ident(&index.name),
        quote_ident(table),
        quote_ident(&index.column)
    );
    dest.execute_raw(&statement).await.map_err(|e| {
        EtlError::Schema(format!(
            "Failed to create index '{}' on '{}': {}",
            index.name, table, e
        ))
    })?;
    Ok(())
}
