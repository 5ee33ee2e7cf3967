//! Storage infrastructure - backend selection, pooling and migrations

mod factory;
pub mod migrations;
mod postgres;

pub use factory::StorageType;
pub use migrations::{revert_last_migration, run_migrations, Migration, PostgresMigrator};
pub use postgres::{create_pool, is_unique_violation, ping, PostgresConfig};
