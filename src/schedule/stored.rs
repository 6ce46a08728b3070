use chrono::{DateTime, NaiveTime, Utc};

use super::{
    CalendarDate, DatePattern, TimeOfDay, display_time_range, parse_calendar_date,
    parse_time_of_day,
};

pub const INVALID_DATE_LABEL: &str = "Data inválida";
pub const INVALID_TIME_LABEL: &str = "Horário inválido";

/// 已存储或旧格式值的解析结果，解析失败不会报错
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parsed<T> {
    Valid(T),
    Unparseable,
}

impl<T> Parsed<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Parsed::Valid(value) => Some(value),
            Parsed::Unparseable => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Parsed::Valid(_))
    }
}

impl<T> From<Option<T>> for Parsed<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Parsed::Unparseable, Parsed::Valid)
    }
}

// 接受 `YYYY-MM-DD`，或取 ISO 时间戳的日期部分原样使用
// `2024-03-15T00:00:00.000Z` 一定是 15 号
pub fn parse_stored_date(raw: &str) -> Parsed<CalendarDate> {
    let raw = raw.trim();
    if let Ok(date) = parse_calendar_date(raw) {
        return Parsed::Valid(date);
    }

    // 时间戳只取日期前缀，不做时区换算
    match raw.split_once('T') {
        Some((date, _)) => parse_calendar_date(date).ok().into(),
        None => Parsed::Unparseable,
    }
}

// 接受 `HH:MM`、`HH:MM:SS`，或锚定在 1970-01-01 的时间戳，按 UTC 读取
pub fn parse_stored_time(raw: &str) -> Parsed<TimeOfDay> {
    let raw = raw.trim();
    if let Ok(time) = parse_time_of_day(raw) {
        return Parsed::Valid(time);
    }
    if let Ok(time) = NaiveTime::parse_from_str(raw, "%H:%M:%S") {
        return Parsed::Valid(time.into());
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|instant| TimeOfDay::from_anchored_instant(instant.with_timezone(&Utc)))
        .into()
}

pub fn display_stored_date(raw: &str, pattern: DatePattern) -> String {
    parse_stored_date(raw)
        .ok()
        .map_or_else(|| INVALID_DATE_LABEL.to_string(), |d| d.format(pattern))
}

pub fn display_stored_time_range(start: &str, end: &str) -> String {
    match (parse_stored_time(start), parse_stored_time(end)) {
        (Parsed::Valid(start), Parsed::Valid(end)) => display_time_range(start, end),
        _ => INVALID_TIME_LABEL.to_string(),
    }
}
