use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::ids::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Standard,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Standard => "STANDARD",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "STANDARD" => Some(Role::Standard),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// 当前请求的调用者，由认证中间件放入请求扩展，显式传给每个核心操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: RecordId,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: RecordId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn member(user_id: RecordId) -> Self {
        Self::new(user_id, Role::Standard)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}
