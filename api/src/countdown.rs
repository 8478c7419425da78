use chrono::{DateTime, Utc};

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Started,
    Remaining {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
}

impl Countdown {
    pub fn label(&self) -> String {
        match self {
            Countdown::Started => "Match started".to_string(),
            Countdown::Remaining { days, hours, minutes, .. } if *days > 0 => {
                format!("{days}d {hours:02}h {minutes:02}m")
            }
            Countdown::Remaining { hours, minutes, seconds, .. } => {
                format!("{hours:02}:{minutes:02}:{seconds:02}")
            }
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, Countdown::Started)
    }
}

/// Time left until `start`, whole seconds, rounded down.
pub fn countdown(now: DateTime<Utc>, start: DateTime<Utc>) -> Countdown {
    let total = (start - now).num_seconds();
    if total <= 0 {
        return Countdown::Started;
    }
    Countdown::Remaining {
        days: total / SECS_PER_DAY,
        hours: (total % SECS_PER_DAY) / SECS_PER_HOUR,
        minutes: (total % SECS_PER_HOUR) / 60,
        seconds: total % 60,
    }
}
