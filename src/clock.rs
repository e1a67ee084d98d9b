use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};

/// Source of "now" for handlers and commands.
///
/// The journal works on naive local date/times; the clock decides which
/// zone those are in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// The machine's local time zone.
    #[default]
    Local,
    /// A fixed offset from UTC, in seconds east.
    Offset(FixedOffset),
    /// Always the given instant (tests).
    Fixed(NaiveDateTime),
}

impl Clock {
    /// Builds a clock from an optional UTC offset in minutes.
    pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
        minutes
            .and_then(|m| FixedOffset::east_opt(m * 60))
            .map(Clock::Offset)
            .unwrap_or(Clock::Local)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.instant().naive_local()
    }

    /// The current instant together with the offset "now" is read in.
    /// A fixed clock is taken to be UTC.
    pub fn instant(&self) -> DateTime<FixedOffset> {
        match self {
            Clock::Local => Local::now().fixed_offset(),
            Clock::Offset(offset) => Utc::now().with_timezone(offset),
            Clock::Fixed(at) => at.and_utc().fixed_offset(),
        }
    }
}
