// 数据库行类型，与领域模型之间通过 From 转换

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

use crate::auth::Role;
use crate::ids::RecordId;
use crate::models::{Activity, Article, Participant, Participation, Recipe, User};

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let role = Role::parse(&row.role).unwrap_or_else(|| {
            tracing::warn!("Unknown role {:?} for user {}, treating as STANDARD", row.role, row.id);
            Role::Standard
        });
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            active: row.active,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ActivityRow {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub photo: Option<String>,
    pub active: bool,
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            date: row.date.into(),
            start_time: row.start_time.into(),
            end_time: row.end_time.into(),
            location: row.location,
            photo: row.photo,
            active: row.active,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ParticipationRow {
    pub id: RecordId,
    pub user_id: RecordId,
    pub activity_id: RecordId,
    pub created_at: DateTime<Utc>,
}

impl From<ParticipationRow> for Participation {
    fn from(row: ParticipationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            activity_id: row.activity_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ParticipantRow {
    pub user_id: RecordId,
    pub user_name: String,
    pub registered_at: DateTime<Utc>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Self {
            user_id: row.user_id,
            user_name: row.user_name,
            registered_at: row.registered_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct RecipeRow {
    pub id: RecordId,
    pub name: String,
    pub ingredients: String,
    pub preparation: String,
    pub photo: Option<String>,
    pub author_id: Option<RecordId>,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            ingredients: row.ingredients,
            preparation: row.preparation,
            photo: row.photo,
            author_id: row.author_id,
            author_name: row.author_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ArticleRow {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    pub photo: Option<String>,
    pub author: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            photo: row.photo,
            author: row.author,
            active: row.active,
            created_at: row.created_at,
        }
    }
}
