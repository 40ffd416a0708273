// Database modules
pub mod archive;
pub mod config;
pub mod error;
pub mod materializer;
pub mod pipeline;
pub mod sqlite;

pub use error::EtlError;
pub use sqlite::SqliteHandle;
