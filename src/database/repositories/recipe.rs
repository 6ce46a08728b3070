// 食谱存储库，作者名通过 LEFT JOIN users 取得

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::map_db_error;
use crate::database::models::RecipeRow;
use crate::ids::RecordId;
use crate::models::{ListFilter, Page, Recipe, RecipeDraft};
use crate::repository::{RecipeRepository, StoreError, StoreResult};

const RECIPE_SELECT: &str = "SELECT r.id, r.name, r.ingredients, r.preparation, r.photo,
                                    r.author_id, u.name AS author_name, r.created_at
                             FROM recipes r
                             LEFT JOIN users u ON u.id = r.author_id";

#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: PgPool,
}

impl PgRecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_existing(&self, id: RecordId) -> StoreResult<Recipe> {
        self.find_by_id(id).await?.ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn create(&self, draft: RecipeDraft, author_id: RecordId) -> StoreResult<Recipe> {
        let id: RecordId = sqlx::query_scalar(
            r#"
            INSERT INTO recipes (name, ingredients, preparation, photo, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.ingredients)
        .bind(&draft.preparation)
        .bind(&draft.photo)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.fetch_existing(id).await
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Recipe>> {
        let sql = format!("{RECIPE_SELECT} WHERE r.id = $1");
        let row = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Recipe::from))
    }

    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<Recipe>> {
        let condition =
            "$1::TEXT IS NULL OR r.name ILIKE $1 OR r.ingredients ILIKE $1 OR r.preparation ILIKE $1";
        let pattern = filter.search_pattern();

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM recipes r WHERE {condition}"))
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_error)?;

        let sql = format!(
            "{RECIPE_SELECT}
             WHERE {condition}
             ORDER BY r.name ASC, r.id ASC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(&pattern)
            .bind(i64::from(filter.limit))
            .bind(filter.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(
            rows.into_iter().map(Recipe::from).collect(),
            total as u64,
            filter,
        ))
    }

    async fn list_all(&self) -> StoreResult<Vec<Recipe>> {
        let sql = format!("{RECIPE_SELECT} ORDER BY r.name ASC, r.id ASC");
        let rows = sqlx::query_as::<_, RecipeRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    async fn update(&self, id: RecordId, draft: RecipeDraft) -> StoreResult<Recipe> {
        let result = sqlx::query(
            r#"
            UPDATE recipes
            SET name = $2, ingredients = $3, preparation = $4, photo = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.ingredients)
        .bind(&draft.preparation)
        .bind(&draft.photo)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        self.fetch_existing(id).await
    }

    async fn delete(&self, id: RecordId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
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
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(total as u64)
    }
}
