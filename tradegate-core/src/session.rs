//! Exchange trading session clock.
//!
//! Kept out of the evaluation path: the engine never reads the clock. Callers
//! (the CLI) use it to decide whether a scan makes sense right now.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConfigError;

/// Regular session hours in exchange-local time, Monday to Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSession {
    /// Exchange offset from UTC (IST = +330).
    pub utc_offset_minutes: i32,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for MarketSession {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Trading; `closes_at` in exchange-local time.
    Open { closes_at: NaiveDateTime },
    /// Not trading; `next_open` in exchange-local time.
    Closed { next_open: NaiveDateTime },
}

impl SessionStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { closes_at } => write!(f, "OPEN (closes {})", closes_at.format("%H:%M")),
            Self::Closed { next_open } => {
                write!(f, "CLOSED (opens {})", next_open.format("%a %Y-%m-%d %H:%M"))
            }
        }
    }
}

impl MarketSession {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-14 * 60..=14 * 60).contains(&self.utc_offset_minutes) {
            return Err(ConfigError::OutOfRange {
                field: "session.utc_offset_minutes",
                min: -840.0,
                max: 840.0,
                value: f64::from(self.utc_offset_minutes),
            });
        }
        if self.open >= self.close {
            return Err(ConfigError::Parse(format!(
                "session open {} must be before close {}",
                self.open, self.close
            )));
        }
        Ok(())
    }

    /// Convert a UTC instant to exchange-local time.
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.naive_utc() + Duration::minutes(i64::from(self.utc_offset_minutes))
    }

    pub fn is_trading_day(date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Session state at `now`. The session is open on `[open, close)`.
    pub fn status(&self, now: DateTime<Utc>) -> SessionStatus {
        let local = self.local_time(now);
        let date = local.date();
        let time = local.time();

        if Self::is_trading_day(date) && time >= self.open && time < self.close {
            return SessionStatus::Open {
                closes_at: date.and_time(self.close),
            };
        }

        let mut day = if Self::is_trading_day(date) && time < self.open {
            date
        } else {
            date + Duration::days(1)
        };
        while !Self::is_trading_day(day) {
            day += Duration::days(1);
        }
        SessionStatus::Closed {
            next_open: day.and_time(self.open),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn midday_tuesday_is_open() {
        // 06:00 UTC = 11:30 IST
        let status = MarketSession::default().status(utc(2024, 1, 2, 6, 0));
        assert_eq!(
            status,
            SessionStatus::Open {
                closes_at: local(2024, 1, 2, 15, 30)
            }
        );
    }

    #[test]
    fn before_open_waits_for_same_day() {
        // 03:00 UTC = 08:30 IST
        let status = MarketSession::default().status(utc(2024, 1, 2, 3, 0));
        assert_eq!(
            status,
            SessionStatus::Closed {
                next_open: local(2024, 1, 2, 9, 15)
            }
        );
    }

    #[test]
    fn close_is_exclusive() {
        // 10:00 UTC = 15:30 IST
        let status = MarketSession::default().status(utc(2024, 1, 2, 10, 0));
        assert!(!status.is_open());
    }

    #[test]
    fn friday_evening_rolls_to_monday() {
        // Fri 2024-01-05 12:00 UTC = 17:30 IST
        let status = MarketSession::default().status(utc(2024, 1, 5, 12, 0));
        assert_eq!(
            status,
            SessionStatus::Closed {
                next_open: local(2024, 1, 8, 9, 15)
            }
        );
    }

    #[test]
    fn offset_crosses_midnight() {
        // Sun 2024-01-07 20:00 UTC = Mon 01:30 IST
        let status = MarketSession::default().status(utc(2024, 1, 7, 20, 0));
        assert_eq!(
            status,
            SessionStatus::Closed {
                next_open: local(2024, 1, 8, 9, 15)
            }
        );
    }

    #[test]
    fn inverted_hours_rejected() {
        let session = MarketSession {
            open: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            ..MarketSession::default()
        };
        assert!(session.validate().is_err());
        assert!(MarketSession::default().validate().is_ok());
    }
}
