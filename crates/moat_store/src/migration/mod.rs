use sea_orm_migration::prelude::*;

mod m20250301_000001_init;
mod m20250301_000002_acct;

/// Schema of the default aggregate database.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_init::Migration)]
    }
}

/// Schema of the flow-accounting database. Kept separate so the two logical
/// databases can live on different servers.
pub struct AcctMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AcctMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000002_acct::Migration)]
    }
}
