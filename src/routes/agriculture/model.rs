use serde::Deserialize;

use crate::{
    error::AppResult,
    models::ArticleDraft,
    routes::{optional, required},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArticleRequest {
    pub title: String,
    pub content: String,
    pub photo: Option<String>,
    pub author: String,
    pub active: Option<bool>,
}

impl ArticleRequest {
    pub fn into_draft(self) -> AppResult<ArticleDraft> {
        Ok(ArticleDraft {
            title: required(&self.title, "título")?,
            content: required(&self.content, "conteúdo")?,
            photo: optional(self.photo),
            author: required(&self.author, "autor")?,
            active: self.active.unwrap_or(true),
        })
    }
}
