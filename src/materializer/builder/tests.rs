use super::*;
use crate::materializer::models::{BuildSpec, IndexSpec, RowBatch};
use crate::sqlite::SqliteHandle;
use serde_json::Value;

fn passthrough(batch: RowBatch) -> Result<RowBatch, String> {
    Ok(batch)
}

fn directors_spec(window_size: usize) -> BuildSpec {
    BuildSpec {
        source_table: "dirigeant_pp".to_string(),
        key_column: "siren".to_string(),
        dest_table: "dirigeant_pp".to_string(),
        dest_ddl: "CREATE TABLE dirigeant_pp (siren TEXT, nom TEXT)".to_string(),
        index: IndexSpec {
            name: "siren_pp".to_string(),
            column: "siren".to_string(),
            unique: false,
        },
        window_size,
    }
}

async fn seeded_source(keys: usize) -> SqliteHandle {
    let mut source = SqliteHandle::open(":memory:").await.unwrap();
    source
        .execute("CREATE TABLE dirigeant_pp (siren TEXT, nom TEXT)")
        .await
        .unwrap();

    let mut inserts = String::new();
    for key in 0..keys {
        inserts.push_str(&format!(
            "INSERT INTO dirigeant_pp VALUES ('{:09}', 'nom{}');",
            key, key
        ));
    }
    if !inserts.is_empty() {
        source.execute(&inserts).await.unwrap();
    }
    source
}

#[tokio::test]
async fn build_materializes_every_source_row() {
    let mut source = seeded_source(250).await;
    let mut dest = SqliteHandle::open(":memory:").await.unwrap();

    let outcome = build(&mut source, &mut dest, &directors_spec(100), &passthrough)
        .await
        .unwrap();

    assert_eq!(outcome.distinct_keys, 250);
    assert_eq!(outcome.window_count, 3);
    assert_eq!(outcome.written_rows, 250);
    assert_eq!(dest.table_count("dirigeant_pp").await.unwrap(), 250);
}

#[tokio::test]
async fn rebuilding_yields_identical_content() {
    let mut source = seeded_source(25).await;
    let mut dest = SqliteHandle::open(":memory:").await.unwrap();
    let spec = directors_spec(10);

    let first = build(&mut source, &mut dest, &spec, &passthrough)
        .await
        .unwrap();
    let first_rows = dest
        .fetch("SELECT siren, nom FROM dirigeant_pp ORDER BY siren")
        .await
        .unwrap();

    let second = build(&mut source, &mut dest, &spec, &passthrough)
        .await
        .unwrap();
    let second_rows = dest
        .fetch("SELECT siren, nom FROM dirigeant_pp ORDER BY siren")
        .await
        .unwrap();

    assert_eq!(first.written_rows, second.written_rows);
    assert_eq!(first_rows, second_rows);
}

#[tokio::test]
async fn empty_source_builds_an_empty_indexed_table() {
    let mut source = seeded_source(0).await;
    let mut dest = SqliteHandle::open(":memory:").await.unwrap();

    let outcome = build(&mut source, &mut dest, &directors_spec(100), &passthrough)
        .await
        .unwrap();

    assert_eq!(outcome.window_count, 1);
    assert_eq!(outcome.written_rows, 0);
    assert_eq!(dest.table_count("dirigeant_pp").await.unwrap(), 0);
    let indexed = dest
        .fetch_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='siren_pp'")
        .await
        .unwrap();
    assert_eq!(indexed, 1);
}

#[tokio::test]
async fn transformer_shapes_the_destination_rows() {
    let mut source = seeded_source(5).await;
    let mut dest = SqliteHandle::open(":memory:").await.unwrap();

    let uppercase = |mut batch: RowBatch| -> Result<RowBatch, String> {
        for row in &mut batch.rows {
            if let Some(Value::String(nom)) = row.get_mut(1) {
                *nom = nom.to_uppercase();
            }
        }
        Ok(batch)
    };

    build(&mut source, &mut dest, &directors_spec(100), &uppercase)
        .await
        .unwrap();

    let rows = dest
        .fetch("SELECT nom FROM dirigeant_pp ORDER BY siren")
        .await
        .unwrap();
    assert_eq!(rows.rows[0][0], Value::String("NOM0".to_string()));
}

#[tokio::test]
async fn transformer_failure_aborts_the_build() {
    let mut source = seeded_source(5).await;
    let mut dest = SqliteHandle::open(":memory:").await.unwrap();

    let failing = |_batch: RowBatch| -> Result<RowBatch, String> { Err("bad row".to_string()) };
    let result = build(&mut source, &mut dest, &directors_spec(100), &failing).await;

    assert!(matches!(result, Err(EtlError::Transform(_))));
    // the half-built destination holds nothing from the failed run
    assert_eq!(dest.table_count("dirigeant_pp").await.unwrap(), 0);
}

#[tokio::test]
async fn missing_source_table_aborts_with_extraction_error() {
    let mut source = SqliteHandle::open(":memory:").await.unwrap();
    let mut dest = SqliteHandle::open(":memory:").await.unwrap();

    let result = build(&mut source, &mut dest, &directors_spec(100), &passthrough).await;
    assert!(matches!(result, Err(EtlError::Extraction(_))));
}

#[tokio::test]
async fn invalid_spec_is_rejected_before_any_schema_change() {
    let mut source = seeded_source(1).await;
    let mut dest = SqliteHandle::open(":memory:").await.unwrap();

    let mut spec = directors_spec(100);
    spec.window_size = 0;
    let result = build(&mut source, &mut dest, &spec, &passthrough).await;
    assert!(matches!(result, Err(EtlError::Schema(_))));

    let tables = dest
        .fetch_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type='table'")
        .await
        .unwrap();
    assert_eq!(tables, 0);
}
