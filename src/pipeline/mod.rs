//! Per-dataset task entry points. Each function is invoked by the external
//! scheduler as one step: it opens the handles it needs, runs exactly one
//! materializer operation, closes the handles on every exit path, and
//! threads an explicit outcome value back to the step graph.

pub mod queries;
pub mod transform;


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::archive::ArchiveStore;
use crate::config::Settings;
use crate::error::EtlError;
use crate::materializer::models::{BuildSpec, IndexSpec, MergeSpec, RowTransformer};
use crate::materializer::{build, merge, replace};
use crate::sqlite::SqliteHandle;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutcome {
    pub operation_id: String,
    pub task: String,
    pub written_rows: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TaskOutcome {
    fn new(task: &str, written_rows: u64, started_at: DateTime<Utc>) -> Self {
        TaskOutcome {
            operation_id: uuid::Uuid::new_v4().to_string(),
            task: task.to_string(),
            written_rows,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Shared shape of the RNE-to-SIRENE builds: source table in the RNE file,
/// destination table of the same name in the SIRENE file, keyed and indexed
/// on `siren`.
async fn build_from_rne(
    settings: &Settings,
    spec: BuildSpec,
    transformer: &RowTransformer,
    task: &str,
) -> Result<TaskOutcome, EtlError> {
    let started_at = Utc::now();

    let mut sirene = SqliteHandle::open(&settings.sirene_database).await?;
    let mut rne = match SqliteHandle::open(&settings.rne_database).await {
        Ok(handle) => handle,
        Err(e) => {
            let _ = sirene.commit_and_close().await;
            return Err(e);
        }
    };

    let built = build(&mut rne, &mut sirene, &spec, transformer).await;

    let close_sirene = sirene.commit_and_close().await;
    let close_rne = rne.commit_and_close().await;
    let built = built?;
    close_sirene?;
    close_rne?;

    log::info!(
        "Task '{}' wrote {} rows into '{}'",
        task,
        built.written_rows,
        built.dest_table
    );
    Ok(TaskOutcome::new(task, built.written_rows, started_at))
}

pub async fn create_dirigeant_pp_table(settings: &Settings) -> Result<TaskOutcome, EtlError> {
    let spec = BuildSpec {
        source_table: "dirigeant_pp".to_string(),
        key_column: "siren".to_string(),
        dest_table: "dirigeant_pp".to_string(),
        dest_ddl: queries::CREATE_TABLE_DIRIGEANT_PP.to_string(),
        index: IndexSpec {
            name: "siren_pp".to_string(),
            column: "siren".to_string(),
            unique: false,
        },
        window_size: settings.window_size,
    };
    build_from_rne(
        settings,
        spec,
        &transform::clean_person_rows,
        "create_dirigeant_pp_table",
    )
    .await
}

pub async fn create_dirigeant_pm_table(settings: &Settings) -> Result<TaskOutcome, EtlError> {
    let spec = BuildSpec {
        source_table: "dirigeant_pm".to_string(),
        key_column: "siren".to_string(),
        dest_table: "dirigeant_pm".to_string(),
        dest_ddl: queries::CREATE_TABLE_DIRIGEANT_PM.to_string(),
        index: IndexSpec {
            name: "siren_pm".to_string(),
            column: "siren".to_string(),
            unique: false,
        },
        window_size: settings.window_size,
    };
    build_from_rne(
        settings,
        spec,
        &transform::clean_company_rows,
        "create_dirigeant_pm_table",
    )
    .await
}

pub async fn create_beneficiaire_table(settings: &Settings) -> Result<TaskOutcome, EtlError> {
    let spec = BuildSpec {
        source_table: "beneficiaire".to_string(),
        key_column: "siren".to_string(),
        dest_table: "beneficiaire".to_string(),
        dest_ddl: queries::CREATE_TABLE_BENEFICIAIRE.to_string(),
        index: IndexSpec {
            name: "siren_benef".to_string(),
            column: "siren".to_string(),
            unique: false,
        },
        window_size: settings.window_size,
    };
    build_from_rne(
        settings,
        spec,
        &transform::clean_person_rows,
        "create_beneficiaire_table",
    )
    .await
}

/// Re-derives the headquarters-only establishment table from the flux.
pub async fn replace_siege_only_table(settings: &Settings) -> Result<TaskOutcome, EtlError> {
    let started_at = Utc::now();

    let mut sirene = SqliteHandle::open(&settings.sirene_database).await?;
    let replaced = replace(&mut sirene, queries::REPLACE_TABLE_SIRET_SIEGE).await;
    let closed = sirene.commit_and_close().await;
    let replaced = replaced?;
    closed?;

    Ok(TaskOutcome::new(
        "replace_siege_only_table",
        replaced.affected_rows,
        started_at,
    ))
}

/// Folds RNE legal units into the main SIRENE legal-unit table: update pass
/// for units present in both registries, insert-or-ignore pass for the
/// remainder.
pub async fn add_rne_data_to_unite_legale_table(
    settings: &Settings,
) -> Result<TaskOutcome, EtlError> {
    let started_at = Utc::now();
    let spec = MergeSpec {
        alias: queries::RNE_ALIAS.to_string(),
        primary_table: "unite_legale".to_string(),
        secondary_table: "unites_legales".to_string(),
        key_column: "siren".to_string(),
        update_query: queries::UPDATE_UNITE_LEGALE_FROM_RNE.to_string(),
        insert_remainder_query: queries::INSERT_REMAINING_RNE_UNITE_LEGALE.to_string(),
    };

    let mut sirene = SqliteHandle::open(&settings.sirene_database).await?;
    let merged = merge(&mut sirene, &settings.rne_database, &spec).await;
    let closed = sirene.commit_and_close().await;
    let merged = merged?;
    closed?;

    Ok(TaskOutcome::new(
        "add_rne_data_to_unite_legale_table",
        merged.updated_rows.saturating_add(merged.inserted_rows),
        started_at,
    ))
}

/// Pulls an archived source file into the working data directory so the
/// load tasks can read it locally, and returns the staged path. The file
/// keeps the last segment of its object key as its name.
pub async fn stage_source_file(
    settings: &Settings,
    store: &dyn ArchiveStore,
    object_key: &str,
) -> Result<String, String> {
    let body = store.download(object_key).await?;

    let file_name = object_key.rsplit('/').next().unwrap_or(object_key);
    let destination = Path::new(&settings.data_dir).join(file_name);
    tokio::fs::write(&destination, &body)
        .await
        .map_err(|e| format!("Failed to stage '{}': {}", destination.display(), e))?;

    log::info!(
        "Staged '{}' into '{}' ({} bytes)",
        object_key,
        destination.display(),
        body.len()
    );
    Ok(destination.display().to_string())
}
