use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub id: RecordId,
    pub user_id: RecordId,
    pub activity_id: RecordId,
    pub created_at: DateTime<Utc>,
}

/// 活动报名名单中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: RecordId,
    pub user_name: String,
    pub registered_at: DateTime<Utc>,
}
