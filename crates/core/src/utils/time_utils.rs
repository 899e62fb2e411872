use chrono::{Local, NaiveDate, NaiveDateTime, Utc};

/// Source of "today" for rules that depend on the calendar, such as the
/// obligation edit window.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the host's local date.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a fixed date, for tests and replays.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Current UTC timestamp as stored on rows.
pub fn now_naive_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}
