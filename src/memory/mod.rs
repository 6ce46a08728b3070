use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, MutexGuard};

use crate::ids::RecordId;
use crate::models::{
    Activity, ActivityDraft, Article, ArticleDraft, ListFilter, NewUser, Page, Participant,
    Participation, Recipe, RecipeDraft, User, UserChanges,
};
use crate::repository::{
    ActivityRepository, ArticleRepository, ParticipationRepository, RecipeRepository,
    StoreError, StoreResult, UserRepository,
};

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<RecordId, User>,
    activities: BTreeMap<RecordId, Activity>,
    participations: BTreeMap<RecordId, Participation>,
    recipes: BTreeMap<RecordId, Recipe>,
    articles: BTreeMap<RecordId, Article>,
}

impl Tables {
    fn next_id(&mut self) -> RecordId {
        self.last_id += 1;
        RecordId::new(self.last_id)
    }

    fn email_taken(&self, email: &str, except: Option<RecordId>) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != except)
    }

    fn with_author(&self, mut recipe: Recipe) -> Recipe {
        recipe.author_name = recipe
            .author_id
            .and_then(|id| self.users.get(&id))
            .map(|u| u.name.clone());
        recipe
    }
}

// STORAGE_BACKEND=memory 和测试使用的内存存储
// 所有表共用一把锁，检查和写入在同一个临界区内完成，约束与 Postgres 一致
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables();
        if tables.email_taken(&user.email, None) {
            return Err(StoreError::UniqueViolation("users_email_key".into()));
        }

        let id = tables.next_id();
        let user = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            active: user.active,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<User>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<User>> {
        let tables = self.tables();
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| filter.matches_status(u.active))
            .filter(|u| filter.search.as_deref().is_none_or(|s| u.matches_search(s)))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(filter.paginate(users))
    }

    async fn update(&self, id: RecordId, changes: UserChanges) -> StoreResult<User> {
        let mut tables = self.tables();
        if tables.email_taken(&changes.email, Some(id)) {
            return Err(StoreError::UniqueViolation("users_email_key".into()));
        }

        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.name = changes.name;
        user.email = changes.email;
        user.role = changes.role;
        user.active = changes.active;
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        Ok(user.clone())
    }

    async fn update_password(&self, id: RecordId, password_hash: String) -> StoreResult<()> {
        let mut tables = self.tables();
        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash;
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> StoreResult<()> {
        let mut tables = self.tables();
        if tables.users.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }

        tables.participations.retain(|_, p| p.user_id != id);
        for recipe in tables.recipes.values_mut() {
            if recipe.author_id == Some(id) {
                recipe.author_id = None;
            }
        }
        Ok(())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.tables().users.len() as u64)
    }
}

#[async_trait]
impl ActivityRepository for MemoryStore {
    async fn create(&self, draft: ActivityDraft) -> StoreResult<Activity> {
        let mut tables = self.tables();
        let id = tables.next_id();
        let activity = Activity::from_draft(id, draft);
        tables.activities.insert(id, activity.clone());
        Ok(activity)
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Activity>> {
        Ok(self.tables().activities.get(&id).cloned())
    }

    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<Activity>> {
        let tables = self.tables();
        let mut activities: Vec<Activity> = tables
            .activities
            .values()
            .filter(|a| filter.matches_status(a.active))
            .filter(|a| filter.search.as_deref().is_none_or(|s| a.matches_search(s)))
            .cloned()
            .collect();
        activities.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(filter.paginate(activities))
    }

    async fn list_active(&self) -> StoreResult<Vec<Activity>> {
        let tables = self.tables();
        let mut activities: Vec<Activity> = tables
            .activities
            .values()
            .filter(|a| a.active)
            .cloned()
            .collect();
        activities.sort_by(|a, b| {
            (a.date, a.start_time, a.id).cmp(&(b.date, b.start_time, b.id))
        });
        Ok(activities)
    }

    async fn update(&self, id: RecordId, draft: ActivityDraft) -> StoreResult<Activity> {
        let mut tables = self.tables();
        let activity = tables.activities.get_mut(&id).ok_or(StoreError::NotFound)?;
        *activity = Activity::from_draft(id, draft);
        Ok(activity.clone())
    }

    async fn delete(&self, id: RecordId) -> StoreResult<()> {
        let mut tables = self.tables();
        if tables.activities.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        tables.participations.retain(|_, p| p.activity_id != id);
        Ok(())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.tables().activities.len() as u64)
    }
}

#[async_trait]
impl ParticipationRepository for MemoryStore {
    async fn insert(
        &self,
        user_id: RecordId,
        activity_id: RecordId,
    ) -> StoreResult<Participation> {
        let mut tables = self.tables();
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::ForeignKeyViolation("participations_user_id_fkey".into()));
        }
        if !tables.activities.contains_key(&activity_id) {
            return Err(StoreError::ForeignKeyViolation(
                "participations_activity_id_fkey".into(),
            ));
        }
        if tables
            .participations
            .values()
            .any(|p| p.user_id == user_id && p.activity_id == activity_id)
        {
            return Err(StoreError::UniqueViolation(
                "participations_user_id_activity_id_key".into(),
            ));
        }

        let id = tables.next_id();
        let participation = Participation {
            id,
            user_id,
            activity_id,
            created_at: Utc::now(),
        };
        tables.participations.insert(id, participation.clone());
        Ok(participation)
    }

    async fn delete(&self, user_id: RecordId, activity_id: RecordId) -> StoreResult<bool> {
        let mut tables = self.tables();
        let before = tables.participations.len();
        tables
            .participations
            .retain(|_, p| !(p.user_id == user_id && p.activity_id == activity_id));
        Ok(tables.participations.len() < before)
    }

    async fn exists(&self, user_id: RecordId, activity_id: RecordId) -> StoreResult<bool> {
        Ok(self
            .tables()
            .participations
            .values()
            .any(|p| p.user_id == user_id && p.activity_id == activity_id))
    }

    async fn list_for_activity(&self, activity_id: RecordId) -> StoreResult<Vec<Participant>> {
        let tables = self.tables();
        let mut rows: Vec<&Participation> = tables
            .participations
            .values()
            .filter(|p| p.activity_id == activity_id)
            .collect();
        rows.sort_by_key(|p| (p.created_at, p.id));

        Ok(rows
            .into_iter()
            .filter_map(|p| {
                tables.users.get(&p.user_id).map(|u| Participant {
                    user_id: u.id,
                    user_name: u.name.clone(),
                    registered_at: p.created_at,
                })
            })
            .collect())
    }
}

#[async_trait]
impl RecipeRepository for MemoryStore {
    async fn create(&self, draft: RecipeDraft, author_id: RecordId) -> StoreResult<Recipe> {
        let mut tables = self.tables();
        if !tables.users.contains_key(&author_id) {
            return Err(StoreError::ForeignKeyViolation("recipes_author_id_fkey".into()));
        }

        let id = tables.next_id();
        let recipe = Recipe {
            id,
            name: draft.name,
            ingredients: draft.ingredients,
            preparation: draft.preparation,
            photo: draft.photo,
            author_id: Some(author_id),
            author_name: None,
            created_at: Utc::now(),
        };
        tables.recipes.insert(id, recipe.clone());
        Ok(tables.with_author(recipe))
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Recipe>> {
        let tables = self.tables();
        Ok(tables.recipes.get(&id).cloned().map(|r| tables.with_author(r)))
    }

    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<Recipe>> {
        let tables = self.tables();
        let mut recipes: Vec<Recipe> = tables
            .recipes
            .values()
            .filter(|r| filter.search.as_deref().is_none_or(|s| r.matches_search(s)))
            .cloned()
            .map(|r| tables.with_author(r))
            .collect();
        recipes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(filter.paginate(recipes))
    }

    async fn list_all(&self) -> StoreResult<Vec<Recipe>> {
        let tables = self.tables();
        let mut recipes: Vec<Recipe> = tables
            .recipes
            .values()
            .cloned()
            .map(|r| tables.with_author(r))
            .collect();
        recipes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(recipes)
    }

    async fn update(&self, id: RecordId, draft: RecipeDraft) -> StoreResult<Recipe> {
        let mut tables = self.tables();
        let recipe = tables.recipes.get_mut(&id).ok_or(StoreError::NotFound)?;
        recipe.name = draft.name;
        recipe.ingredients = draft.ingredients;
        recipe.preparation = draft.preparation;
        recipe.photo = draft.photo;
        let recipe = recipe.clone();
        Ok(tables.with_author(recipe))
    }

    async fn delete(&self, id: RecordId) -> StoreResult<()> {
        self.tables()
            .recipes
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.tables().recipes.len() as u64)
    }
}

#[async_trait]
impl ArticleRepository for MemoryStore {
    async fn create(&self, draft: ArticleDraft) -> StoreResult<Article> {
        let mut tables = self.tables();
        let id = tables.next_id();
        let article = Article {
            id,
            title: draft.title,
            content: draft.content,
            photo: draft.photo,
            author: draft.author,
            active: draft.active,
            created_at: Utc::now(),
        };
        tables.articles.insert(id, article.clone());
        Ok(article)
    }

    async fn find_by_id(&self, id: RecordId) -> StoreResult<Option<Article>> {
        Ok(self.tables().articles.get(&id).cloned())
    }

    async fn list(&self, filter: &ListFilter) -> StoreResult<Page<Article>> {
        let tables = self.tables();
        let mut articles: Vec<Article> = tables
            .articles
            .values()
            .filter(|a| filter.matches_status(a.active))
            .filter(|a| filter.search.as_deref().is_none_or(|s| a.matches_search(s)))
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(filter.paginate(articles))
    }

    async fn list_published(&self) -> StoreResult<Vec<Article>> {
        let tables = self.tables();
        let mut articles: Vec<Article> = tables
            .articles
            .values()
            .filter(|a| a.active)
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(articles)
    }

    async fn update(&self, id: RecordId, draft: ArticleDraft) -> StoreResult<Article> {
        let mut tables = self.tables();
        let article = tables.articles.get_mut(&id).ok_or(StoreError::NotFound)?;
        article.title = draft.title;
        article.content = draft.content;
        article.photo = draft.photo;
        article.author = draft.author;
        article.active = draft.active;
        Ok(article.clone())
    }

    async fn delete(&self, id: RecordId) -> StoreResult<()> {
        self.tables()
            .articles
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.tables().articles.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::ListParams;
    use crate::schedule::{parse_calendar_date, parse_time_of_day};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Maria".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::Standard,
            active: true,
        }
    }

    fn draft(date: &str) -> ActivityDraft {
        ActivityDraft {
            name: "Mutirão".into(),
            description: "Plantio".into(),
            date: parse_calendar_date(date).unwrap(),
            start_time: parse_time_of_day("08:00").unwrap(),
            end_time: parse_time_of_day("11:00").unwrap(),
            location: "Horta".into(),
            photo: None,
            active: true,
        }
    }

    #[tokio::test]
    async fn email_is_unique_ignoring_case() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("a@b.com")).await.unwrap();
        let err = UserRepository::create(&store, new_user("A@B.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn deleting_activity_cascades_participations() {
        let store = MemoryStore::new();
        let user = UserRepository::create(&store, new_user("a@b.com")).await.unwrap();
        let activity = ActivityRepository::create(&store, draft("2024-05-01")).await.unwrap();
        store.insert(user.id, activity.id).await.unwrap();

        ActivityRepository::delete(&store, activity.id).await.unwrap();
        assert!(!store.exists(user.id, activity.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_user_keeps_recipe_without_author() {
        let store = MemoryStore::new();
        let user = UserRepository::create(&store, new_user("a@b.com")).await.unwrap();
        let recipe = RecipeRepository::create(
            &store,
            RecipeDraft {
                name: "Pão".into(),
                ingredients: "farinha".into(),
                preparation: "assar".into(),
                photo: None,
            },
            user.id,
        )
        .await
        .unwrap();
        assert_eq!(recipe.author_name.as_deref(), Some("Maria"));

        UserRepository::delete(&store, user.id).await.unwrap();
        let recipe = RecipeRepository::find_by_id(&store, recipe.id).await.unwrap().unwrap();
        assert_eq!(recipe.author_id, None);
        assert_eq!(recipe.author_name, None);
    }

    #[tokio::test]
    async fn activities_list_newest_date_first() {
        let store = MemoryStore::new();
        for date in ["2024-01-10", "2024-03-01", "2024-02-15"] {
            ActivityRepository::create(&store, draft(date)).await.unwrap();
        }
        let filter = ListFilter::from_params(ListParams::default(), 100);
        let page = ActivityRepository::list(&store, &filter).await.unwrap();
        let dates: Vec<String> = page.items.iter().map(|a| a.date.to_string()).collect();
        assert_eq!(dates, ["2024-03-01", "2024-02-15", "2024-01-10"]);

        let active = store.list_active().await.unwrap();
        assert_eq!(active[0].date.to_string(), "2024-01-10");
    }
}
