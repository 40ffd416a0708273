use serde::{Deserialize, Serialize};
use serde_json::Value;


/// Default number of distinct keys covered by one extraction window.
pub const DEFAULT_WINDOW_SIZE: usize = 100_000;

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

/// One window's worth of extracted (or transformed) rows: column names plus
/// row values. Lives only for the duration of one window iteration, which
/// bounds peak memory regardless of source table size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Injected per-dataset row cleaner. Must be pure and total over any
/// well-formed extraction; missing fields map to a sentinel value, never to
/// an error.
pub type RowTransformer = dyn Fn(RowBatch) -> Result<RowBatch, String> + Send + Sync;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSpec {
    pub name: String,
    pub column: String,
    #[serde(default)]
    pub unique: bool,
}

/// Full description of one destination-table build: where the rows come
/// from, how the destination is shaped, and how wide each extraction
/// window is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    pub source_table: String,
    pub key_column: String,
    pub dest_table: String,
    pub dest_ddl: String,
    pub index: IndexSpec,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

impl BuildSpec {
    pub fn validate(&self) -> Result<(), String> {
        if self.source_table.trim().is_empty() {
            return Err("sourceTable is required".to_string());
        }
        if self.key_column.trim().is_empty() {
            return Err("keyColumn is required".to_string());
        }
        if self.dest_table.trim().is_empty() {
            return Err("destTable is required".to_string());
        }
        if self.dest_ddl.trim().is_empty() {
            return Err("destTable DDL is required".to_string());
        }
        if self.index.name.trim().is_empty() || self.index.column.trim().is_empty() {
            return Err("index name and column are required".to_string());
        }
        if self.window_size == 0 {
            return Err("windowSize must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutcome {
    pub dest_table: String,
    pub distinct_keys: i64,
    pub window_count: usize,
    pub written_rows: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOutcome {
    pub affected_rows: u64,
}

/// The (primary, secondary) relationship consumed by the cross-database
/// merger. `update_query` refreshes fields of existing primary rows from the
/// attached secondary; `insert_remainder_query` inserts secondary rows whose
/// key is still absent, with insert-or-ignore semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSpec {
    pub alias: String,
    pub primary_table: String,
    pub secondary_table: String,
    pub key_column: String,
    pub update_query: String,
    pub insert_remainder_query: String,
}

impl MergeSpec {
    pub fn validate(&self) -> Result<(), String> {
        if self.alias.trim().is_empty() {
            return Err("alias is required".to_string());
        }
        if self.primary_table.trim().is_empty() || self.secondary_table.trim().is_empty() {
            return Err("primaryTable and secondaryTable are required".to_string());
        }
        if self.key_column.trim().is_empty() {
            return Err("keyColumn is required".to_string());
        }
        if self.update_query.trim().is_empty() || self.insert_remainder_query.trim().is_empty() {
            return Err("updateQuery and insertRemainderQuery are required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub updated_rows: u64,
    pub inserted_rows: u64,
}
