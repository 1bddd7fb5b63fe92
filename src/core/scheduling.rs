//! Cron scheduling for generated workflows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid schedule parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("minute must be in 0..60, got {0}")]
    Minute(u32),

    #[error("hour must be in 0..23, got {0}")]
    Hour(u32),

    #[error("day of month must be in 1..=31, got {0}")]
    DayOfMonth(u32),

    #[error("invalid schedule `{0}` (expected daily, weekly:<day> or monthly:<day>)")]
    Parse(String),
}

/// Day of the week, numbered Monday = 1 through Sunday = 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn number(&self) -> u32 {
        match self {
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
            Weekday::Sunday => 7,
        }
    }
}

impl FromStr for Weekday {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = match s.to_lowercase().as_str() {
            "mon" | "monday" => Weekday::Monday,
            "tue" | "tuesday" => Weekday::Tuesday,
            "wed" | "wednesday" => Weekday::Wednesday,
            "thu" | "thursday" => Weekday::Thursday,
            "fri" | "friday" => Weekday::Friday,
            "sat" | "saturday" => Weekday::Saturday,
            "sun" | "sunday" => Weekday::Sunday,
            _ => return Err(ScheduleError::Parse(s.to_string())),
        };
        Ok(day)
    }
}

/// How often a scheduled workflow runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduling {
    Daily {
        minute: u32,
        hour: u32,
    },
    Weekly {
        minute: u32,
        hour: u32,
        day: Weekday,
    },
    Monthly {
        minute: u32,
        hour: u32,
        day_of_month: u32,
    },
}

fn check_time(minute: u32, hour: u32) -> Result<(), ScheduleError> {
    if minute >= 60 {
        return Err(ScheduleError::Minute(minute));
    }
    if hour >= 23 {
        return Err(ScheduleError::Hour(hour));
    }
    Ok(())
}

impl Scheduling {
    pub fn daily(minute: u32, hour: u32) -> Result<Self, ScheduleError> {
        check_time(minute, hour)?;
        Ok(Scheduling::Daily { minute, hour })
    }

    pub fn weekly(minute: u32, hour: u32, day: Weekday) -> Result<Self, ScheduleError> {
        check_time(minute, hour)?;
        Ok(Scheduling::Weekly { minute, hour, day })
    }

    pub fn monthly(minute: u32, hour: u32, day_of_month: u32) -> Result<Self, ScheduleError> {
        check_time(minute, hour)?;
        if !(1..=31).contains(&day_of_month) {
            return Err(ScheduleError::DayOfMonth(day_of_month));
        }
        if day_of_month > 28 {
            tracing::warn!("Day of month is > 28, may not run on all months");
        }
        Ok(Scheduling::Monthly {
            minute,
            hour,
            day_of_month,
        })
    }

    /// Five-field cron expression.
    pub fn cron(&self) -> String {
        match self {
            Scheduling::Daily { minute, hour } => format!("{} {} * * *", minute, hour),
            Scheduling::Weekly { minute, hour, day } => {
                format!("{} {} * * {}", minute, hour, day.number())
            }
            Scheduling::Monthly {
                minute,
                hour,
                day_of_month,
            } => format!("{} {} {} * *", minute, hour, day_of_month),
        }
    }
}

impl Default for Scheduling {
    /// Weekly, Saturday at midnight.
    fn default() -> Self {
        Scheduling::Weekly {
            minute: 0,
            hour: 0,
            day: Weekday::Saturday,
        }
    }
}

impl fmt::Display for Scheduling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cron())
    }
}

/// Parses `daily`, `weekly:<weekday>` or `monthly:<day>`, at midnight.
impl FromStr for Scheduling {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s, None),
        };

        match (kind.to_lowercase().as_str(), arg) {
            ("daily", None) => Scheduling::daily(0, 0),
            ("weekly", None) => Ok(Scheduling::default()),
            ("weekly", Some(day)) => Scheduling::weekly(0, 0, day.parse()?),
            ("monthly", None) => Scheduling::monthly(0, 0, 1),
            ("monthly", Some(day)) => {
                let day = day
                    .parse()
                    .map_err(|_| ScheduleError::Parse(s.to_string()))?;
                Scheduling::monthly(0, 0, day)
            }
            _ => Err(ScheduleError::Parse(s.to_string())),
        }
    }
}
