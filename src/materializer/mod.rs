//! Cross-database chunked table materialization: bounded-window extraction
//! from a source database, injected row transformation, append into a
//! destination database, plus replace-semantics re-derivation and the
//! two-pass RNE-style cross-database merge.

pub mod builder;
pub mod cursor;
pub mod lifecycle;
pub mod merger;
pub mod models;
pub mod replacer;

pub use builder::build;
pub use merger::merge;
pub use replacer::replace;
