pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250301_000001_clicks;
mod m20250301_000002_devotionals;
mod m20250301_000003_payments;
mod m20250301_000004_users;

/// analytics 库：clicks, daily_stats, devotionals, payments
pub struct AnalyticsMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AnalyticsMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_clicks::Migration),
            Box::new(m20250301_000002_devotionals::Migration),
            Box::new(m20250301_000003_payments::Migration),
        ]
    }
}

/// users 库：users
pub struct UsersMigrator;

#[async_trait::async_trait]
impl MigratorTrait for UsersMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000004_users::Migration)]
    }
}
