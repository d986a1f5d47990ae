use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, instrument};

use crate::configuration::DatabaseSettings;
use crate::migration::{Migrator, MigratorTrait};

#[instrument(skip(settings))]
pub async fn init_db(settings: &DatabaseSettings) -> anyhow::Result<DatabaseConnection> {
    info!("데이터베이스 연결 설정 중...");

    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .connect_timeout(settings.connect_timeout)
        .acquire_timeout(settings.connect_timeout)
        .sqlx_logging(settings.sqlx_logging);

    if let Some(idle_timeout) = settings.idle_timeout {
        options.idle_timeout(idle_timeout);
    }
    if let Some(max_lifetime) = settings.max_lifetime {
        options.max_lifetime(max_lifetime);
    }

    info!("데이터베이스에 연결 시도 중...");
    let db = Database::connect(options).await?;
    info!("데이터베이스 연결 완료");

    Ok(db)
}

/// Connects and applies every pending migration.
pub async fn init_db_with_migrations(settings: &DatabaseSettings) -> anyhow::Result<DatabaseConnection> {
    let db = init_db(settings).await?;

    info!("데이터베이스 마이그레이션 실행 중...");
    Migrator::up(&db, None).await?;
    info!("마이그레이션 완료");

    Ok(db)
}
