// 每个仓储都有 Postgres 和内存两种实现，约束保持一致：
// 邮箱唯一、同一用户同一活动只能报名一次、删除时级联

use async_trait::async_trait;
use thiserror::Error;

use crate::ids::RecordId;
use crate::models::{
    Activity, ActivityDraft, Article, ArticleDraft, ListFilter, NewUser, Page, Participant,
    Participation, Recipe, RecipeDraft, User, UserChanges,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    // 邮箱重复时返回 UniqueViolation
    async fn create(&self, user: NewUser) -> StoreResult<User>;
    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    // 按姓名排序
    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<User>>;
    async fn update(&self, id: RecordId, changes: UserChanges) -> StoreResult<User>;
    async fn update_password(&self, id: RecordId, password_hash: String) -> StoreResult<()>;
    // 级联删除报名记录，食谱作者置空
    async fn delete(&self, id: RecordId) -> StoreResult<()>;
    async fn count(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn create(&self, draft: ActivityDraft) -> StoreResult<Activity>;
    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Activity>>;
    // 按日期倒序
    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<Activity>>;
    // 会员看到的启用活动，按日期正序
    async fn list_active(&self) -> StoreResult<Vec<Activity>>;
    async fn update(&self, id: RecordId, draft: ActivityDraft) -> StoreResult<Activity>;
    // 级联删除报名记录
    async fn delete(&self, id: RecordId) -> StoreResult<()>;
    async fn count(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait ParticipationRepository: Send + Sync {
    // 重复报名返回 UniqueViolation，用户或活动不存在返回 ForeignKeyViolation
    async fn insert(
        &self,
        user_id: RecordId,
        activity_id: RecordId,
    ) -> StoreResult<Participation>;
    // 返回是否删除了记录
    async fn delete(&self, user_id: RecordId, activity_id: RecordId) -> StoreResult<bool>;
    async fn exists(&self, user_id: RecordId, activity_id: RecordId) -> StoreResult<bool>;
    // 按报名时间正序
    async fn list_for_activity(&self, activity_id: RecordId) -> StoreResult<Vec<Participant>>;
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn create(&self, draft: RecipeDraft, author_id: RecordId) -> StoreResult<Recipe>;
    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Recipe>>;
    // 按名称排序
    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<Recipe>>;
    async fn list_all(&self) -> StoreResult<Vec<Recipe>>;
    async fn update(&self, id: RecordId, draft: RecipeDraft) -> StoreResult<Recipe>;
    async fn delete(&self, id: RecordId) -> StoreResult<()>;
    async fn count(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn create(&self, draft: ArticleDraft) -> StoreResult<Article>;
    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Article>>;
    // 最新的在前
    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<Article>>;
    async fn list_published(&self) -> StoreResult<Vec<Article>>;
    async fn update(&self, id: RecordId, draft: ArticleDraft) -> StoreResult<Article>;
    async fn delete(&self, id: RecordId) -> StoreResult<()>;
    async fn count(&self) -> StoreResult<u64>;
}
