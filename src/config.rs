use crate::materializer::models::DEFAULT_WINDOW_SIZE;

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Runtime settings for the load tasks, resolved once from the environment
/// by the scheduled step that invokes them.
#[derive(Debug, Clone)]
pub struct Settings {
    /// On-disk location of the main SIRENE database file.
    pub sirene_database: String,
    /// On-disk location of the RNE database file.
    pub rne_database: String,
    /// Working directory for downloaded and exported files.
    pub data_dir: String,
    /// Distinct-key window size used by chunked builds.
    pub window_size: usize,
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            sirene_database: env_or_default("SIRENE_DATABASE_LOCATION", "sirene.db"),
            rne_database: env_or_default("RNE_DATABASE_LOCATION", "rne.db"),
            data_dir: env_or_default("ETL_DATA_DIR", "."),
            window_size: std::env::var("ETL_WINDOW_SIZE")
                .ok()
                .and_then(|value| value.trim().parse::<usize>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(DEFAULT_WINDOW_SIZE),
        }
    }
}
