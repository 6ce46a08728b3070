use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    ledger::ParticipationOverview,
    models::{Activity, ActivityDraft, Participant},
    routes::{optional, required},
    schedule::{
        DatePattern, INVALID_DATE_LABEL, INVALID_TIME_LABEL, Parsed, TimeOfDay,
        display_time_range, parse_stored_date, parse_stored_time,
    },
};

/// 新建和编辑活动的请求体，日期和时间按字符串接收
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivityRequest {
    pub name: String,
    pub description: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub photo: Option<String>,
    pub active: Option<bool>,
}

impl ActivityRequest {
    pub fn into_draft(self) -> AppResult<ActivityDraft> {
        let date = match parse_stored_date(&self.date) {
            Parsed::Valid(date) => date,
            Parsed::Unparseable => {
                return Err(AppError::Validation(format!(
                    "{INVALID_DATE_LABEL}: `{}`",
                    self.date
                )));
            }
        };
        let start_time = parse_time_field(&self.start_time)?;
        let end_time = parse_time_field(&self.end_time)?;

        Ok(ActivityDraft {
            name: required(&self.name, "nome")?,
            description: self.description.trim().to_string(),
            date,
            start_time,
            end_time,
            location: required(&self.location, "local")?,
            photo: optional(self.photo),
            active: self.active.unwrap_or(true),
        })
    }
}

fn parse_time_field(raw: &str) -> AppResult<TimeOfDay> {
    parse_stored_time(raw)
        .ok()
        .ok_or_else(|| AppError::Validation(format!("{INVALID_TIME_LABEL}: `{raw}`")))
}

/// 会员活动列表中的一项
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: Activity,
    pub date_label: String,
    pub time_range: String,
    #[serde(flatten)]
    pub participation: ParticipationOverview,
}

impl ActivityView {
    pub fn new(activity: Activity, participation: ParticipationOverview) -> Self {
        Self {
            date_label: activity.date.format(DatePattern::DayMonthYear),
            time_range: display_time_range(activity.start_time, activity.end_time),
            activity,
            participation,
        }
    }
}

/// 管理端活动列表和详情，附带报名名单
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub activity: Activity,
    pub participant_count: usize,
    pub participants: Vec<Participant>,
}

impl ActivityDetail {
    pub fn new(activity: Activity, participants: Vec<Participant>) -> Self {
        Self {
            activity,
            participant_count: participants.len(),
            participants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(date: &str, start: &str, end: &str) -> ActivityRequest {
        ActivityRequest {
            name: "Oficina de Sementes".into(),
            date: date.into(),
            start_time: start.into(),
            end_time: end.into(),
            location: "Casa de Cultura".into(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_strict_and_legacy_forms() {
        let strict = request("2024-03-15", "14:30", "16:00").into_draft().unwrap();
        let legacy = request(
            "2024-03-15T00:00:00.000Z",
            "1970-01-01T14:30:00.000Z",
            "16:00:00",
        )
        .into_draft()
        .unwrap();
        assert_eq!(strict, legacy);
        assert!(strict.active);
        assert_eq!(strict.description, "");
    }

    #[test]
    fn rejects_unparseable_values() {
        assert!(matches!(
            request("2024-02-30", "14:30", "16:00").into_draft(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            request("2024-03-15", "14:65", "16:00").into_draft(),
            Err(AppError::Validation(_))
        ));
    }
}
