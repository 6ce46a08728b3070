use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::RecordId;

/// 农业知识文章
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    pub photo: Option<String>,
    pub author: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub photo: Option<String>,
    pub author: String,
    pub active: bool,
}

impl Article {
    pub fn matches_search(&self, needle: &str) -> bool {
        super::page::contains_ignore_case(
            &[
                self.title.as_str(),
                self.content.as_str(),
                self.author.as_str(),
            ],
            needle,
        )
    }
}
