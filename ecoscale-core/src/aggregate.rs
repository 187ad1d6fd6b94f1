//! Single-pass reduction of a record snapshot into dashboard totals.

use chrono::{DateTime, Datelike, TimeZone};

use crate::clock::Boundaries;
use crate::model::{DailyTotals, WasteRecord, WeeklyTotals};

/// Reduce `records` into today's and this week's totals as seen at `now`.
///
/// Boundaries are inclusive and computed in the time zone of `now`. A record
/// may count towards both totals, one of them, or neither. General waste never
/// counts. A record without a known category has no daily slot, so it only
/// counts for the week.
#[must_use]
pub fn aggregate<'rec, Tz, I>(records: I, now: &DateTime<Tz>) -> (DailyTotals, WeeklyTotals)
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'rec WasteRecord>,
{
    let bounds = Boundaries::at(now);
    let zone = now.timezone();

    let mut daily = DailyTotals::default();
    let mut weekly = WeeklyTotals::default();

    for record in records {
        if !record.is_aggregated() {
            continue;
        }

        if let Some(category) = record.category
            && record.timestamp >= bounds.today
        {
            daily.add(category, record.weight_kg);
        }

        if record.timestamp >= bounds.week {
            let weekday = record.timestamp.with_timezone(&zone).weekday();
            weekly.add(weekday.num_days_from_monday() as usize, record.weight_kg);
        }
    }

    (daily, weekly)
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;
    use crate::model::WasteCategory::{self, General, Inorganic, Organic, Residual};

    fn zone() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).expect("valid offset")
    }

    fn local(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        zone()
            .with_ymd_and_hms(2026, 10, day, hour, minute, 0)
            .single()
            .expect("valid local time")
    }

    fn record(category: WasteCategory, weight_kg: f64, at: DateTime<FixedOffset>) -> WasteRecord {
        WasteRecord {
            timestamp: at.with_timezone(&Utc),
            weight_kg,
            category: Some(category),
        }
    }

    fn uncategorised(weight_kg: f64, at: DateTime<FixedOffset>) -> WasteRecord {
        WasteRecord {
            timestamp: at.with_timezone(&Utc),
            weight_kg,
            category: None,
        }
    }

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn todays_totals_exclude_yesterday_and_general() {
        // Wednesday 21 October 2026, noon.
        let now = local(21, 12, 0);
        let records = [
            record(Organic, 2.5, local(21, 9, 0)),
            record(Inorganic, 1.0, local(21, 10, 0)),
            record(Residual, 0.5, local(20, 23, 0)),
            record(General, 9.9, local(21, 8, 0)),
        ];

        let (daily, _) = aggregate(&records, &now);

        assert!(close(daily.organic, 2.5), "organic was {}", daily.organic);
        assert!(close(daily.inorganic, 1.0), "inorganic was {}", daily.inorganic);
        assert!(close(daily.residual, 0.0), "residual was {}", daily.residual);
        assert!(close(daily.total(), 3.5), "total was {}", daily.total());
    }

    #[test]
    fn wednesday_record_lands_in_bucket_two_only() {
        // Friday 23 October; the record is from Wednesday 21 October.
        let now = local(23, 18, 0);
        let records = [record(Organic, 4.0, local(21, 14, 0))];

        let (daily, weekly) = aggregate(&records, &now);

        assert_eq!(weekly.0, [0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(daily.is_empty(), "a Wednesday record is not today's on a Friday");
    }

    #[test]
    fn sunday_maps_to_last_bucket() {
        let now = local(25, 20, 0);
        let records = [record(Residual, 1.5, local(25, 7, 0))];

        let (daily, weekly) = aggregate(&records, &now);

        assert_eq!(weekly.day(6), Some(1.5));
        assert!(close(daily.residual, 1.5), "residual was {}", daily.residual);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let now = local(21, 12, 0);
        let records = [
            record(Organic, 1.0, local(21, 0, 0)),
            record(Inorganic, 2.0, local(19, 0, 0)),
            record(Residual, 4.0, local(18, 23, 59)),
        ];

        let (daily, weekly) = aggregate(&records, &now);

        assert!(close(daily.total(), 1.0), "total was {}", daily.total());
        assert_eq!(weekly.day(0), Some(2.0));
        assert!(close(weekly.total(), 3.0), "last week's Sunday is excluded");
    }

    #[test]
    fn weekday_follows_the_local_calendar() {
        // 23:30 local on Monday is still Monday even though it is 16:30 UTC.
        let now = local(21, 12, 0);
        let records = [record(Organic, 1.0, local(19, 23, 30))];

        let (_, weekly) = aggregate(&records, &now);
        assert_eq!(weekly.day(0), Some(1.0));
    }

    #[test]
    fn sums_match_filtered_inputs() {
        let now = local(22, 16, 0);
        let categories = [Organic, Inorganic, Residual, General];
        let mut records = Vec::new();
        for day in 12..=22 {
            for (slot, category) in categories.iter().enumerate() {
                let hour = u32::try_from(slot * 5).expect("small hour");
                let weight = f64::from(day) / 10.0 + f64::from(hour);
                records.push(record(*category, weight, local(day, hour, 15)));
            }
            records.push(uncategorised(f64::from(day), local(day, 22, 40)));
        }

        let bounds = Boundaries::at(&now);
        let expected_daily: f64 = records
            .iter()
            .filter(|rec| rec.category.is_some() && rec.is_aggregated() && rec.timestamp >= bounds.today)
            .map(|rec| rec.weight_kg)
            .sum();
        let expected_weekly: f64 = records
            .iter()
            .filter(|rec| rec.is_aggregated() && rec.timestamp >= bounds.week)
            .map(|rec| rec.weight_kg)
            .sum();

        let (daily, weekly) = aggregate(&records, &now);

        assert!(close(daily.total(), expected_daily), "daily {} vs {expected_daily}", daily.total());
        assert!(close(weekly.total(), expected_weekly), "weekly {} vs {expected_weekly}", weekly.total());
    }

    #[test]
    fn uncategorised_records_count_for_the_week_only() {
        // Wednesday noon; everything below was weighed on Tuesday.
        let now = local(21, 12, 0);
        let records = [
            uncategorised(3.0, local(20, 9, 0)),
            uncategorised(2.0, local(20, 10, 0)),
            record(Organic, 1.0, local(20, 11, 0)),
        ];

        let (daily, weekly) = aggregate(&records, &now);

        assert_eq!(weekly.0, [0.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(daily.is_empty(), "nothing was weighed today: {daily:?}");
    }

    #[test]
    fn uncategorised_records_today_leave_daily_untouched() {
        let now = local(21, 12, 0);
        let records = [
            uncategorised(3.0, local(21, 8, 0)),
            record(Residual, 0.5, local(21, 9, 0)),
            record(General, 9.9, local(21, 10, 0)),
        ];

        let (daily, weekly) = aggregate(&records, &now);

        assert!(close(daily.total(), 0.5), "total was {}", daily.total());
        assert!(close(daily.residual, 0.5), "residual was {}", daily.residual);
        assert_eq!(weekly.day(2), Some(3.5));
    }

    #[test]
    fn same_snapshot_gives_same_totals() {
        let now = local(21, 12, 0);
        let records = [
            record(Organic, 0.3, local(21, 9, 0)),
            record(Inorganic, 1.7, local(20, 10, 0)),
        ];

        assert_eq!(aggregate(&records, &now), aggregate(&records, &now));
    }

    #[test]
    fn empty_snapshot_gives_zeroes() {
        let records: [WasteRecord; 0] = [];
        let (daily, weekly) = aggregate(&records, &local(21, 12, 0));
        assert_eq!(daily, DailyTotals::default());
        assert_eq!(weekly, WeeklyTotals::default());
    }
}
