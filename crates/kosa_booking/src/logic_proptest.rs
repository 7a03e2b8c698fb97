#[cfg(test)]
mod tests {
    use crate::logic::{calculate_available_slots, resolve_local, WorkingHours};
    use chrono::{DateTime, Duration, NaiveDate, NaiveTime};
    use chrono_tz::Europe::Belgrade;
    use chrono_tz::Tz;
    use proptest::prelude::*;

    // Busy intervals starting on the half hour within the given day.
    fn busy_periods(day: NaiveDate, specs: &[(u32, i64)]) -> Vec<(DateTime<Tz>, DateTime<Tz>)> {
        specs
            .iter()
            .filter_map(|&(half_hours, minutes)| {
                let time = NaiveTime::from_hms_opt(half_hours / 2, (half_hours % 2) * 30, 0)?;
                let start = resolve_local(&Belgrade, day, time)?;
                Some((start, start + Duration::minutes(minutes)))
            })
            .collect()
    }

    proptest! {
        #[test]
        fn slots_never_overlap_busy_periods(
            day_offset in 0..365i64,
            start_hour in 0..12u32,
            extra_hours in 1..12u32,
            duration_minutes in 15..180i64,
            busy in prop::collection::vec((0..48u32, 15..240i64), 0..6),
        ) {
            let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day_offset);
            let booked = busy_periods(day, &busy);
            let slots = calculate_available_slots(
                day,
                WorkingHours::new(start_hour, start_hour + extra_hours),
                Duration::minutes(duration_minutes),
                &booked,
                Duration::minutes(30),
                Belgrade,
            );

            for slot in &slots {
                prop_assert_eq!(slot.end - slot.start, Duration::minutes(duration_minutes));
                for &(busy_start, busy_end) in &booked {
                    prop_assert!(slot.end <= busy_start || slot.start >= busy_end);
                }
            }
        }

        #[test]
        fn slots_start_inside_working_hours_in_order(
            day_offset in 0..365i64,
            start_hour in 0..12u32,
            extra_hours in 1..12u32,
            duration_minutes in 15..180i64,
        ) {
            let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day_offset);
            let end_hour = start_hour + extra_hours;
            let slots = calculate_available_slots(
                day,
                WorkingHours::new(start_hour, end_hour),
                Duration::minutes(duration_minutes),
                &[],
                Duration::minutes(30),
                Belgrade,
            );

            let opening = NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap();
            let closing = NaiveTime::from_hms_opt(end_hour, 0, 0).unwrap();
            for slot in &slots {
                prop_assert_eq!(slot.start.date_naive(), day);
                prop_assert!(slot.start.time() >= opening);
                prop_assert!(slot.start.time() < closing);
            }
            prop_assert!(slots.windows(2).all(|w| w[0].start < w[1].start));
            // At most one candidate per half hour; DST gaps can only remove some.
            prop_assert!(slots.len() <= (extra_hours * 2) as usize);
        }

        #[test]
        fn adding_a_booking_never_adds_slots(
            day_offset in 0..365i64,
            duration_minutes in 15..120i64,
            busy in prop::collection::vec((18..36u32, 15..120i64), 1..4),
        ) {
            let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day_offset);
            let hours = WorkingHours::new(9, 18);
            let duration = Duration::minutes(duration_minutes);
            let step = Duration::minutes(30);

            let before = calculate_available_slots(day, hours, duration, &[], step, Belgrade);
            let booked = busy_periods(day, &busy);
            let after = calculate_available_slots(day, hours, duration, &booked, step, Belgrade);

            prop_assert!(after.len() <= before.len());
            prop_assert!(after.iter().all(|slot| before.contains(slot)));
        }
    }
}
