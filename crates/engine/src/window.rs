//! Month windows over the `created_at` index.
//!
//! A window is a pair of inclusive ISO-8601 string bounds. The default
//! bounds end every month on day 31 (`YYYY-MM-31T23:59:59Z`) regardless of
//! its real length; [`MonthBounds::Calendar`] opts into the real last day.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::{EngineError, ResultEngine};

/// How the upper bound of a month is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthBounds {
    /// Every month ends on day 31.
    #[default]
    Fixed,
    /// Months end on their real last day.
    Calendar,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: String,
    pub end: String,
}

impl MonthWindow {
    pub fn for_month(year: i32, month: u32, bounds: MonthBounds) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(EngineError::Validation(format!(
                "year must be between 1 and 9999, got {year}"
            )));
        }

        let last_day = match bounds {
            MonthBounds::Fixed => 31,
            MonthBounds::Calendar => last_day_of_month(year, month)?,
        };

        Ok(Self {
            start: format!("{year:04}-{month:02}-01T00:00:00Z"),
            end: format!("{year:04}-{month:02}-{last_day:02}T23:59:59Z"),
        })
    }

    /// The window of the calendar month `instant` falls in.
    pub fn containing(instant: DateTime<Utc>, bounds: MonthBounds) -> ResultEngine<Self> {
        Self::for_month(instant.year(), instant.month(), bounds)
    }

    /// Build a window from optional query parameters. A window only applies
    /// when both `year` and `month` are present.
    pub fn from_query(
        year: Option<i32>,
        month: Option<u32>,
        bounds: MonthBounds,
    ) -> ResultEngine<Option<Self>> {
        match (year, month) {
            (Some(year), Some(month)) => Self::for_month(year, month, bounds).map(Some),
            _ => Ok(None),
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> ResultEngine<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .ok_or_else(|| EngineError::Validation(format!("invalid month {year}-{month:02}")))
}
