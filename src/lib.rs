use std::sync::Arc;

use config::Config;
use sqlx::PgPool;

use database::{
    PgActivityRepository, PgArticleRepository, PgParticipationRepository, PgRecipeRepository,
    PgUserRepository,
};
use ledger::ParticipationLedger;
use memory::MemoryStore;
use models::NewUser;
use repository::{
    ActivityRepository, ArticleRepository, ParticipationRepository, RecipeRepository,
    StoreError, UserRepository,
};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod memory;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod router;
pub mod routes;
pub mod schedule;
pub mod utils;

pub use router::create_router;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub participations: Arc<dyn ParticipationRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub articles: Arc<dyn ArticleRepository>,
}

impl AppState {
    pub fn postgres(pool: PgPool, config: Config) -> Self {
        Self {
            config,
            users: Arc::new(PgUserRepository::new(pool.clone())),
            activities: Arc::new(PgActivityRepository::new(pool.clone())),
            participations: Arc::new(PgParticipationRepository::new(pool.clone())),
            recipes: Arc::new(PgRecipeRepository::new(pool.clone())),
            articles: Arc::new(PgArticleRepository::new(pool)),
        }
    }

    pub fn memory(config: Config) -> Self {
        let store = MemoryStore::new();
        Self {
            config,
            users: Arc::new(store.clone()),
            activities: Arc::new(store.clone()),
            participations: Arc::new(store.clone()),
            recipes: Arc::new(store.clone()),
            articles: Arc::new(store),
        }
    }

    pub fn ledger(&self) -> ParticipationLedger {
        ParticipationLedger::new(self.activities.clone(), self.participations.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

/// 配置了 ADMIN_EMAIL/ADMIN_PASSWORD 时，邮箱未被占用则创建管理员
pub async fn ensure_admin(state: &AppState) -> Result<(), SeedError> {
    let Some(seed) = &state.config.admin_seed else {
        return Ok(());
    };

    if state.users.find_by_email(&seed.email).await?.is_some() {
        tracing::debug!("Admin seed {} already present", seed.email);
        return Ok(());
    }

    let password_hash = utils::hash_password(&seed.password, state.config.bcrypt_cost)?;
    match state
        .users
        .create(NewUser {
            name: seed.name.clone(),
            email: seed.email.clone(),
            password_hash,
            role: auth::Role::Admin,
            active: true,
        })
        .await
    {
        Ok(admin) => {
            tracing::info!("Created admin user {} ({})", admin.email, admin.id);
            Ok(())
        }
        // 其他实例同时创建了同一个管理员
        Err(StoreError::UniqueViolation(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
