use serde::Serialize;

use crate::auth::Role;
use crate::ids::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

/// 管理员编辑用户；`password_hash` 为 None 时保留原密码
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub password_hash: Option<String>,
}

impl User {
    pub fn matches_search(&self, needle: &str) -> bool {
        super::page::contains_ignore_case(&[self.name.as_str(), self.email.as_str()], needle)
    }
}
