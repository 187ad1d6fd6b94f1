//! Sources of "now" and the calendar boundaries derived from it.

use chrono::{
    DateTime, Datelike, Days, Local, Months, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
};

/// Provides the current time in the time zone the dashboard reports in.
pub trait Clock: Send + Sync {
    /// Time zone used to place day and week boundaries.
    type Tz: TimeZone;

    /// The current instant.
    fn now(&self) -> DateTime<Self::Tz>;
}

/// Clock backed by the system time in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone)]
pub struct FixedClock<Tz: TimeZone> {
    instant: DateTime<Tz>,
}

impl<Tz: TimeZone> FixedClock<Tz> {
    /// Create a clock that always reports `instant`.
    #[must_use]
    pub fn new(instant: DateTime<Tz>) -> Self {
        Self { instant }
    }
}

impl<Tz> Clock for FixedClock<Tz>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Send + Sync,
{
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.instant.clone()
    }
}

/// The two lower bounds an aggregation pass compares record timestamps against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundaries {
    /// Local midnight of the current day.
    pub today: DateTime<Utc>,
    /// Local midnight of the most recent Monday (today when today is Monday).
    pub week: DateTime<Utc>,
}

impl Boundaries {
    /// Compute both boundaries for the local calendar of `now`.
    #[must_use]
    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let today = now.date_naive();
        let monday = today
            .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
            .unwrap_or(today);

        Self {
            today: start_of_day(now, today),
            week: start_of_day(now, monday),
        }
    }
}

/// Start of the query window: the first day of the month five months before
/// the month of `now`, so the window covers six calendar months.
#[must_use]
pub fn query_window_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let today = now.date_naive();
    let first_of_month = today.with_day(1).unwrap_or(today);
    let since = first_of_month
        .checked_sub_months(Months::new(5))
        .unwrap_or(first_of_month);
    start_of_day(now, since)
}

/// Midnight of `date` in the time zone of `now`, as a UTC instant.
///
/// When local midnight is skipped by a DST transition the day starts at the
/// first instant that exists; the current offset of `now` is the last resort.
pub(crate) fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>, date: NaiveDate) -> DateTime<Utc> {
    let zone = now.timezone();
    let midnight = date.and_time(NaiveTime::MIN);

    if let Some(start) = zone.from_local_datetime(&midnight).earliest() {
        return start.with_timezone(&Utc);
    }

    // Midnight fell into a gap; gaps are at most a few hours wide.
    for minutes in (15..=180).step_by(15) {
        let candidate = midnight + chrono::Duration::minutes(minutes);
        if let Some(start) = zone.from_local_datetime(&candidate).earliest() {
            return start.with_timezone(&Utc);
        }
    }

    let offset = now.offset().fix();
    (midnight - chrono::Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}
