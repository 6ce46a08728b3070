use serde::Deserialize;

use crate::{
    error::AppResult,
    models::RecipeDraft,
    routes::{optional, required},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecipeRequest {
    pub name: String,
    pub ingredients: String,
    pub preparation: String,
    pub photo: Option<String>,
}

impl RecipeRequest {
    pub fn into_draft(self) -> AppResult<RecipeDraft> {
        Ok(RecipeDraft {
            name: required(&self.name, "nome")?,
            ingredients: required(&self.ingredients, "ingredientes")?,
            preparation: required(&self.preparation, "modo de preparo")?,
            photo: optional(self.photo),
        })
    }
}
