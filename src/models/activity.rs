use serde::Serialize;

use crate::ids::RecordId;
use crate::schedule::{CalendarDate, TimeOfDay};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub date: CalendarDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub location: String,
    pub photo: Option<String>,
    pub active: bool,
}

/// 新建与编辑共用的字段集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub name: String,
    pub description: String,
    pub date: CalendarDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub location: String,
    pub photo: Option<String>,
    pub active: bool,
}

impl Activity {
    pub fn from_draft(id: RecordId, draft: ActivityDraft) -> Self {
        let ActivityDraft {
            name,
            description,
            date,
            start_time,
            end_time,
            location,
            photo,
            active,
        } = draft;
        Self {
            id,
            name,
            description,
            date,
            start_time,
            end_time,
            location,
            photo,
            active,
        }
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        super::page::contains_ignore_case(
            &[
                self.name.as_str(),
                self.description.as_str(),
                self.location.as_str(),
            ],
            needle,
        )
    }
}
