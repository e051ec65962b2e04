//! Gridwalk database layer
//!
//! Embedded migrations for the `gridwalk` schemas and the repositories that read
//! and write `gridwalk.layers`.

pub mod db;
pub mod migrations;

pub use db::{LayerRepository, LayerStore, SourceRepository, SourceStore};
pub use gridwalk_core::DbErrorKind;
pub use migrations::{migrate, migration_status, MigrationInfo, MIGRATOR};
