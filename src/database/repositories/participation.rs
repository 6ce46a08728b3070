// 活动报名存储库
// (user_id, activity_id) 上的唯一约束保证同一用户不会重复报名

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::map_db_error;
use crate::database::models::{ParticipantRow, ParticipationRow};
use crate::ids::RecordId;
use crate::models::{Participant, Participation};
use crate::repository::{ParticipationRepository, StoreResult};

#[derive(Clone)]
pub struct PgParticipationRepository {
    pool: PgPool,
}

impl PgParticipationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipationRepository for PgParticipationRepository {
    async fn insert(
        &self,
        user_id: RecordId,
        activity_id: RecordId,
    ) -> StoreResult<Participation> {
        sqlx::query_as::<_, ParticipationRow>(
            r#"
            INSERT INTO participations (user_id, activity_id)
            VALUES ($1, $2)
            RETURNING id, user_id, activity_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await
        .map(Participation::from)
        .map_err(map_db_error)
    }

    async fn delete(&self, user_id: RecordId, activity_id: RecordId) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM participations
            WHERE user_id = $1 AND activity_id = $2
            "#,
        )
        .bind(user_id)
        .bind(activity_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, user_id: RecordId, activity_id: RecordId) -> StoreResult<bool> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM participations
                WHERE user_id = $1 AND activity_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_for_activity(&self, activity_id: RecordId) -> StoreResult<Vec<Participant>> {
        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT p.user_id, u.name AS user_name, p.created_at AS registered_at
            FROM participations p
            JOIN users u ON u.id = p.user_id
            WHERE p.activity_id = $1
            ORDER BY p.created_at ASC, p.id ASC
            "#,
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Participant::from).collect())
    }
}
