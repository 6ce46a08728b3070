// 活动的日期和时间：日期只有年月日，时间只有时分，都不经过时区换算

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

mod stored;

pub use stored::{
    INVALID_DATE_LABEL, INVALID_TIME_LABEL, Parsed, display_stored_date, display_stored_time_range,
    parse_stored_date, parse_stored_time,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("data inválida `{0}`, use o formato AAAA-MM-DD")]
    InvalidDate(String),
    #[error("horário inválido `{0}`, use o formato HH:MM")]
    InvalidTime(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// `2024-03-15`
    Iso,
    /// `15/03/2024`
    DayMonthYear,
    /// `15 de março de 2024`
    Long,
}

const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// 解析固定宽度的纯数字字段
fn digits(input: &str) -> Option<u32> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse().ok()
}

pub fn parse_calendar_date(input: &str) -> Result<CalendarDate, ScheduleError> {
    let invalid = || ScheduleError::InvalidDate(input.to_string());
    let bytes = input.as_bytes();
    if !input.is_ascii() || bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(invalid());
    }

    let year = digits(&input[0..4]).ok_or_else(invalid)?;
    let month = digits(&input[5..7]).ok_or_else(invalid)?;
    let day = digits(&input[8..10]).ok_or_else(invalid)?;

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .map(CalendarDate)
        .ok_or_else(invalid)
}

pub fn format_calendar_date(date: CalendarDate, pattern: DatePattern) -> String {
    let (year, month, day) = (date.year(), date.month(), date.day());
    match pattern {
        DatePattern::Iso => format!("{year:04}-{month:02}-{day:02}"),
        DatePattern::DayMonthYear => format!("{day:02}/{month:02}/{year:04}"),
        DatePattern::Long => format!(
            "{day} de {} de {year}",
            MONTHS_PT_BR[(month - 1) as usize]
        ),
    }
}

pub fn parse_time_of_day(input: &str) -> Result<TimeOfDay, ScheduleError> {
    let invalid = || ScheduleError::InvalidTime(input.to_string());
    let bytes = input.as_bytes();
    if !input.is_ascii() || bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid());
    }

    let hour = digits(&input[0..2]).ok_or_else(invalid)?;
    let minute = digits(&input[3..5]).ok_or_else(invalid)?;
    TimeOfDay::new(hour, minute).ok_or_else(invalid)
}

/// `HH:MM - HH:MM`，不检查结束时间是否晚于开始时间
pub fn display_time_range(start: TimeOfDay, end: TimeOfDay) -> String {
    format!("{start} - {end}")
}

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    pub fn format(self, pattern: DatePattern) -> String {
        format_calendar_date(self, pattern)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<CalendarDate> for NaiveDate {
    fn from(date: CalendarDate) -> Self {
        date.0
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_calendar_date(*self, DatePattern::Iso))
    }
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour <= 23 && minute <= 59).then_some(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn hour(self) -> u32 {
        self.hour.into()
    }

    pub fn minute(self) -> u32 {
        self.minute.into()
    }

    /// 兼容只能存时间戳的旧存储：固定锚定在 1970-01-01 UTC
    pub fn to_anchored_instant(self) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
            .date_naive()
            .and_time(self.into())
            .and_utc()
    }

    /// 只取 UTC 下的时和分，日期部分被忽略
    pub fn from_anchored_instant(instant: DateTime<Utc>) -> Self {
        Self {
            hour: instant.hour() as u8,
            minute: instant.minute() as u8,
        }
    }
}

impl From<TimeOfDay> for NaiveTime {
    fn from(time: TimeOfDay) -> Self {
        NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_calendar_date(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_round_trips_through_iso() {
        for s in ["2024-02-29", "1999-12-31", "2025-01-01", "0001-01-01"] {
            let date = parse_calendar_date(s).unwrap();
            assert_eq!(format_calendar_date(date, DatePattern::Iso), s);
        }
    }

    #[test]
    fn rejects_impossible_dates() {
        assert_eq!(
            parse_calendar_date("2024-02-30"),
            Err(ScheduleError::InvalidDate("2024-02-30".into()))
        );
        assert!(parse_calendar_date("2023-02-29").is_err());
        assert!(parse_calendar_date("2024-13-01").is_err());
        assert!(parse_calendar_date("2024-00-10").is_err());
    }

    #[test]
    fn rejects_malformed_dates() {
        for s in ["2024-3-15", "15/03/2024", "2024-03-15T00:00:00Z", "", "abcd-ef-gh", "+202-03-15"] {
            assert!(parse_calendar_date(s).is_err(), "{s} should be rejected");
        }
    }

    #[test]
    fn formats_for_display() {
        let date = parse_calendar_date("2024-03-05").unwrap();
        assert_eq!(date.format(DatePattern::DayMonthYear), "05/03/2024");
        assert_eq!(date.format(DatePattern::Long), "5 de março de 2024");
    }

    #[test]
    fn time_round_trips() {
        for s in ["00:00", "09:05", "14:30", "23:59"] {
            assert_eq!(parse_time_of_day(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert_eq!(
            parse_time_of_day("14:65"),
            Err(ScheduleError::InvalidTime("14:65".into()))
        );
        assert!(parse_time_of_day("24:00").is_err());
        assert!(parse_time_of_day("9:30").is_err());
        assert!(parse_time_of_day("09:30:00").is_err());
        assert!(parse_time_of_day("ab:cd").is_err());
    }

    #[test]
    fn time_range_is_not_ordered() {
        let start = parse_time_of_day("18:00").unwrap();
        let end = parse_time_of_day("08:15").unwrap();
        assert_eq!(display_time_range(start, end), "18:00 - 08:15");
    }

    #[test]
    fn anchored_instant_recovers_time() {
        let time = parse_time_of_day("07:45").unwrap();
        let instant = time.to_anchored_instant();
        assert_eq!(instant.to_rfc3339(), "1970-01-01T07:45:00+00:00");
        assert_eq!(TimeOfDay::from_anchored_instant(instant), time);
    }

    #[test]
    fn serde_uses_canonical_strings() {
        let date = parse_calendar_date("2024-06-01").unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-06-01\"");
        let time: TimeOfDay = serde_json::from_str("\"08:00\"").unwrap();
        assert_eq!(time, TimeOfDay::new(8, 0).unwrap());
        assert!(serde_json::from_str::<TimeOfDay>("\"8:00\"").is_err());
    }
}
