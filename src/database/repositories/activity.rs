// 活动存储库

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;

use crate::database::map_db_error;
use crate::database::models::ActivityRow;
use crate::ids::RecordId;
use crate::models::{Activity, ActivityDraft, ListFilter, Page};
use crate::repository::{ActivityRepository, StoreError, StoreResult};

const ACTIVITY_COLUMNS: &str =
    "id, name, description, date, start_time, end_time, location, photo, active";

#[derive(Clone)]
pub struct PgActivityRepository {
    pool: PgPool,
}

impl PgActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn create(&self, draft: ActivityDraft) -> StoreResult<Activity> {
        let sql = format!(
            "INSERT INTO activities
                (name, description, date, start_time, end_time, location, photo, active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {ACTIVITY_COLUMNS}"
        );
        sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(NaiveDate::from(draft.date))
            .bind(NaiveTime::from(draft.start_time))
            .bind(NaiveTime::from(draft.end_time))
            .bind(&draft.location)
            .bind(&draft.photo)
            .bind(draft.active)
            .fetch_one(&self.pool)
            .await
            .map(Activity::from)
            .map_err(map_db_error)
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Activity>> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1");
        let row = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Activity::from))
    }

    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<Activity>> {
        let condition = "($1::TEXT IS NULL OR name ILIKE $1 OR description ILIKE $1 OR location ILIKE $1)
                         AND ($2::BOOLEAN IS NULL OR active = $2)";
        let pattern = filter.search_pattern();

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM activities WHERE {condition}"))
                .bind(&pattern)
                .bind(filter.status)
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities
             WHERE {condition}
             ORDER BY date DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(&pattern)
            .bind(filter.status)
            .bind(i64::from(filter.limit))
            .bind(filter.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(
            rows.into_iter().map(Activity::from).collect(),
            total as u64,
            filter,
        ))
    }

    async fn list_active(&self) -> StoreResult<Vec<Activity>> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities
             WHERE active
             ORDER BY date ASC, start_time ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Activity::from).collect())
    }

    async fn update(&self, id: RecordId, draft: ActivityDraft) -> StoreResult<Activity> {
        let sql = format!(
            "UPDATE activities
             SET name = $2, description = $3, date = $4, start_time = $5,
                 end_time = $6, location = $7, photo = $8, active = $9
             WHERE id = $1
             RETURNING {ACTIVITY_COLUMNS}"
        );
        sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(NaiveDate::from(draft.date))
            .bind(NaiveTime::from(draft.start_time))
            .bind(NaiveTime::from(draft.end_time))
            .bind(&draft.location)
            .bind(&draft.photo)
            .bind(draft.active)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(Activity::from)
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: RecordId) -> StoreResult<()> {
        // 报名记录由外键级联删除
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
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
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activities")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(total as u64)
    }
}
