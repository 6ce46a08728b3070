// 数据库模块
// Postgres 行类型与各仓储实现

pub mod models;
pub mod repositories;

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Executor, migrate::MigrateError};

use crate::repository::StoreError;

pub use repositories::{
    PgActivityRepository, PgArticleRepository, PgParticipationRepository, PgRecipeRepository,
    PgUserRepository,
};

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'saberes_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// 把约束冲突从普通数据库错误中区分出来
pub(crate) fn map_db_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        let constraint = db.constraint().unwrap_or_default().to_string();
        if db.is_unique_violation() {
            return StoreError::UniqueViolation(constraint);
        }
        if db.is_foreign_key_violation() {
            return StoreError::ForeignKeyViolation(constraint);
        }
    }
    StoreError::Database(e)
}
