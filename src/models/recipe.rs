use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecordId,
    pub name: String,
    pub ingredients: String,
    pub preparation: String,
    pub photo: Option<String>,
    pub author_id: Option<RecordId>,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    pub ingredients: String,
    pub preparation: String,
    pub photo: Option<String>,
}

impl Recipe {
    pub fn matches_search(&self, needle: &str) -> bool {
        super::page::contains_ignore_case(
            &[
                self.name.as_str(),
                self.ingredients.as_str(),
                self.preparation.as_str(),
            ],
            needle,
        )
    }
}
