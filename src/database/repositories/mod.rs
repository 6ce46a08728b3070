mod activity;
mod article;
mod participation;
mod recipe;
mod user;

pub use activity::PgActivityRepository;
pub use article::PgArticleRepository;
pub use participation::PgParticipationRepository;
pub use recipe::PgRecipeRepository;
pub use user::PgUserRepository;
