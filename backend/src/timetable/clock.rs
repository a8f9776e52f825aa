use std::sync::Mutex;

use chrono::{Datelike, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use time::Time;

use crate::models::common::clock_time;

/// Wall-clock reading in the school's time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalNow {
    /// 1 = Monday .. 7 = Sunday
    pub weekday: u8,
    #[serde(with = "clock_time")]
    pub time: Time,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> LocalNow;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> LocalNow {
        let now = chrono::Utc::now().with_timezone(&self.tz);
        let time = Time::from_hms(now.hour() as u8, now.minute() as u8, now.second() as u8)
            .unwrap_or(Time::MIDNIGHT);
        LocalNow {
            weekday: now.weekday().number_from_monday() as u8,
            time,
        }
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<LocalNow>,
}

impl FixedClock {
    pub fn new(weekday: u8, time: Time) -> Self {
        Self {
            now: Mutex::new(LocalNow { weekday, time }),
        }
    }

    pub fn set(&self, weekday: u8, time: Time) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = LocalNow { weekday, time };
    }
}

impl Clock for FixedClock {
    fn now(&self) -> LocalNow {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
