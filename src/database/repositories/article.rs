// 农业文章存储库

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::map_db_error;
use crate::database::models::ArticleRow;
use crate::ids::RecordId;
use crate::models::{Article, ArticleDraft, ListFilter, Page};
use crate::repository::{ArticleRepository, StoreError, StoreResult};

const ARTICLE_COLUMNS: &str = "id, title, content, photo, author, active, created_at";

#[derive(Clone)]
pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn create(&self, draft: ArticleDraft) -> StoreResult<Article> {
        let sql = format!(
            "INSERT INTO agriculture_articles (title, content, photo, author, active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ARTICLE_COLUMNS}"
        );
        sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(&draft.photo)
            .bind(&draft.author)
            .bind(draft.active)
            .fetch_one(&self.pool)
            .await
            .map(Article::from)
            .map_err(map_db_error)
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM agriculture_articles WHERE id = $1");
        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Article::from))
    }

    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<Article>> {
        let condition = "($1::TEXT IS NULL OR title ILIKE $1 OR content ILIKE $1 OR author ILIKE $1)
                         AND ($2::BOOLEAN IS NULL OR active = $2)";
        let pattern = filter.search_pattern();

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM agriculture_articles WHERE {condition}"
        ))
        .bind(&pattern)
        .bind(filter.status)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM agriculture_articles
             WHERE {condition}
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(&pattern)
            .bind(filter.status)
            .bind(i64::from(filter.limit))
            .bind(filter.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(
            rows.into_iter().map(Article::from).collect(),
            total as u64,
            filter,
        ))
    }

    async fn list_published(&self) -> StoreResult<Vec<Article>> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM agriculture_articles
             WHERE active
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ArticleRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn update(&self, id: RecordId, draft: ArticleDraft) -> StoreResult<Article> {
        let sql = format!(
            "UPDATE agriculture_articles
             SET title = $2, content = $3, photo = $4, author = $5, active = $6
             WHERE id = $1
             RETURNING {ARTICLE_COLUMNS}"
        );
        sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(id)
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(&draft.photo)
            .bind(&draft.author)
            .bind(draft.active)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(Article::from)
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: RecordId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM agriculture_articles WHERE id = $1")
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
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agriculture_articles")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(total as u64)
    }
}
