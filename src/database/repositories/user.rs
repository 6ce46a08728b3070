// 用户存储库

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::map_db_error;
use crate::database::models::UserRow;
use crate::ids::RecordId;
use crate::models::{ListFilter, NewUser, Page, User, UserChanges};
use crate::repository::{StoreError, StoreResult, UserRepository};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, active";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role, active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.active)
            .fetch_one(&self.pool)
            .await
            .map(User::from)
            .map_err(map_db_error)
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(User::from))
    }

    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<User>> {
        let condition = "($1::TEXT IS NULL OR name ILIKE $1 OR email ILIKE $1)
                         AND ($2::BOOLEAN IS NULL OR active = $2)";
        let pattern = filter.search_pattern();

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {condition}"))
            .bind(&pattern)
            .bind(filter.status)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE {condition}
             ORDER BY name ASC, id ASC
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&pattern)
            .bind(filter.status)
            .bind(i64::from(filter.limit))
            .bind(filter.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(
            rows.into_iter().map(User::from).collect(),
            total as u64,
            filter,
        ))
    }

    async fn update(&self, id: RecordId, changes: UserChanges) -> StoreResult<User> {
        // 密码为空时保留原值
        let sql = format!(
            "UPDATE users
             SET name = $2, email = $3, role = $4, active = $5,
                 password_hash = COALESCE($6, password_hash)
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.email)
            .bind(changes.role.as_str())
            .bind(changes.active)
            .bind(&changes.password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(User::from)
            .ok_or(StoreError::NotFound)
    }

    async fn update_password(&self, id: RecordId, password_hash: String) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> StoreResult<()> {
        // 外键级联删除报名记录，食谱作者置空
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> StoreResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(total as u64)
    }
}
