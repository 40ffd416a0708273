// =====================================================
// SQLITE SPECIFIC DATABASE OPERATIONS
// =====================================================

use crate::error::EtlError;
use crate::materializer::models::RowBatch;
use futures::StreamExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Either, Row};


/// Double-quotes an identifier for interpolation into SQL text. Identifiers
/// cannot be bound as parameters, so every table/column/alias name that
/// reaches a statement goes through here.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn table_count_query(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_ident(table))
}

pub fn distinct_count_query(table: &str, column: &str) -> String {
    format!(
        "SELECT COUNT(DISTINCT {}) FROM {}",
        quote_ident(column),
        quote_ident(table)
    )
}

fn build_connect_options(db_path: &str) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .log_statements(log::LevelFilter::Debug)
}

/// Single exclusive connection to one SQLite database file. Each load
/// operation opens the handles it needs, runs to completion, and closes
/// them explicitly on every exit path; attached auxiliary databases are
/// detached implicitly when the handle is closed.
pub struct SqliteHandle {
    conn: SqliteConnection,
    location: String,
}

impl SqliteHandle {
    pub async fn open(db_path: &str) -> Result<Self, EtlError> {
        if db_path.is_empty() {
            return Err(EtlError::Connection(
                "Database file path is required".to_string(),
            ));
        }

        let conn = build_connect_options(db_path).connect().await.map_err(|e| {
            EtlError::Connection(format!(
                "Failed to connect to SQLite database '{}': {}",
                db_path, e
            ))
        })?;

        Ok(SqliteHandle {
            conn,
            location: db_path.to_string(),
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Makes a second database file addressable from this connection under
    /// `alias`, for cross-database statements.
    pub async fn attach(&mut self, db_path: &str, alias: &str) -> Result<(), EtlError> {
        let statement = format!(
            "ATTACH DATABASE '{}' AS {}",
            db_path.replace('\'', "''"),
            quote_ident(alias)
        );
        sqlx::raw_sql(&statement)
            .execute(&mut self.conn)
            .await
            .map_err(|e| {
                EtlError::Connection(format!(
                    "Failed to attach '{}' as '{}': {}",
                    db_path, alias, e
                ))
            })?;
        Ok(())
    }

    /// Runs one or more statements, returning the affected row count of the
    /// last one. Callers that need to classify the failure keep the raw
    /// driver error.
    pub(crate) async fn execute_raw(&mut self, query: &str) -> Result<u64, sqlx::Error> {
        let done = sqlx::raw_sql(query).execute(&mut self.conn).await?;
        Ok(done.rows_affected())
    }

    pub async fn execute(&mut self, query: &str) -> Result<u64, EtlError> {
        self.execute_raw(query)
            .await
            .map_err(|e| EtlError::Query(format!("Query execution failed: {}", e)))
    }

    /// Fetches a full result set into memory as column names plus JSON
    /// values, one decode attempt per native SQLite type.
    pub async fn fetch(&mut self, query: &str) -> Result<RowBatch, sqlx::Error> {
        let mut columns = Vec::new();
        let mut rows = Vec::new();

        let mut stream = sqlx::raw_sql(query).fetch_many(&mut self.conn);
        while let Some(result) = stream.next().await {
            match result? {
                Either::Left(_done) => {}
                Either::Right(row) => {
                    if columns.is_empty() {
                        columns = row
                            .columns()
                            .iter()
                            .map(|c| c.name().to_string())
                            .collect();
                    }
                    rows.push(decode_row(&row));
                }
            }
        }

        Ok(RowBatch { columns, rows })
    }

    /// Fetches a single statement with positional integer binds. Used for
    /// window extraction, where the bounds are parameters rather than
    /// spliced-in literals.
    pub async fn fetch_bound(
        &mut self,
        query: &str,
        binds: &[i64],
    ) -> Result<RowBatch, sqlx::Error> {
        let mut prepared = sqlx::query(query);
        for bind in binds {
            prepared = prepared.bind(*bind);
        }
        let fetched = prepared.fetch_all(&mut self.conn).await?;

        let mut columns = Vec::new();
        let mut rows = Vec::with_capacity(fetched.len());
        for row in &fetched {
            if columns.is_empty() {
                columns = row
                    .columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect();
            }
            rows.push(decode_row(row));
        }

        Ok(RowBatch { columns, rows })
    }

    pub async fn fetch_scalar(&mut self, query: &str) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(query).fetch_one(&mut self.conn).await?;
        row.try_get::<i64, _>(0)
    }

    pub async fn table_count(&mut self, table: &str) -> Result<i64, sqlx::Error> {
        self.fetch_scalar(&table_count_query(table)).await
    }

    /// Appends one batch of rows into `table` inside a single transaction,
    /// so a failed window never leaves a half-written batch behind.
    pub async fn append_rows(
        &mut self,
        table: &str,
        batch: &RowBatch,
    ) -> Result<u64, sqlx::Error> {
        if batch.rows.is_empty() {
            return Ok(0);
        }

        let column_list = batch
            .columns
            .iter()
            .map(|column| quote_ident(column))
            .collect::<Vec<String>>()
            .join(", ");
        let placeholders = vec!["?"; batch.columns.len()].join(", ");
        let statement = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            column_list,
            placeholders
        );

        let mut tx = self.conn.begin().await?;
        for row in &batch.rows {
            let mut insert = sqlx::query(&statement);
            for value in row {
                insert = bind_value(insert, value);
            }
            insert.execute(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(batch.rows.len() as u64)
    }

    pub async fn commit_and_close(self) -> Result<(), EtlError> {
        self.conn.close().await.map_err(|e| {
            EtlError::Connection(format!("Failed to close SQLite connection: {}", e))
        })
    }
}

// Decodes through Option so SQL NULL maps to Value::Null instead of the
// driver's zero value for whichever type happens to decode first.
fn decode_row(row: &SqliteRow) -> Vec<Value> {
    let mut values = Vec::with_capacity(row.columns().len());
    for (index, _column) in row.columns().iter().enumerate() {
        let value = if let Ok(Some(v)) = row.try_get::<Option<String>, _>(index) {
            Value::String(v)
        } else if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(index) {
            serde_json::json!(v)
        } else if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(index) {
            serde_json::json!(v)
        } else if let Ok(Some(v)) = row.try_get::<Option<bool>, _>(index) {
            Value::Bool(v)
        } else {
            Value::Null
        };
        values.push(value);
    }
    values
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    value: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(flag) => query.bind(*flag),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                query.bind(int)
            } else {
                query.bind(number.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(text) => query.bind(text.as_str()),
        other => query.bind(other.to_string()),
    }
}
