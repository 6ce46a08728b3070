pub mod activity;
pub mod article;
pub mod page;
pub mod participation;
pub mod recipe;
pub mod user;

pub use activity::{Activity, ActivityDraft};
pub use article::{Article, ArticleDraft};
pub use page::{ListFilter, ListParams, Page, Pagination};
pub use participation::{Participant, Participation};
pub use recipe::{Recipe, RecipeDraft};
pub use user::{NewUser, User, UserChanges};
