//! Cadence arithmetic: when a task should run next, and whether it is due.
//!
//! All times are UTC. Cadence runs land on the configured time of day
//! (06:00 by default).

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};

use super::types::{AiTask, TaskFrequency};

/// Computes next-run timestamps for each cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    run_at: NaiveTime,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            run_at: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl Schedule {
    pub fn new(run_at: NaiveTime) -> Self {
        Self { run_at }
    }

    pub fn run_at(&self) -> NaiveTime {
        self.run_at
    }

    /// Next run for `frequency`, counting from `last_run` (or `now` if the
    /// task never ran).
    ///
    /// - daily: the day after at run time; if that already passed, today at
    ///   run time
    /// - weekly: seven days after at run time
    /// - monthly: first day of the following month at run time
    /// - manual: `now` (manual tasks must not be auto-scheduled)
    pub fn next_run(
        &self,
        frequency: TaskFrequency,
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let base = last_run.unwrap_or(now).date_naive();

        match frequency {
            TaskFrequency::Daily => {
                let next = self.at(base + Days::new(1));
                if next < now { self.at(now.date_naive()) } else { next }
            }
            TaskFrequency::Weekly => self.at(base + Days::new(7)),
            TaskFrequency::Monthly => self.at(first_of_next_month(base)),
            TaskFrequency::Manual => now,
        }
    }

    fn at(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(self.run_at).and_utc()
    }
}

/// Whether `task` should run at `now`.
///
/// Disabled and manual tasks are never due. A task without `next_run` is due
/// immediately. Status is not consulted.
pub fn is_due(task: &AiTask, now: DateTime<Utc>) -> bool {
    if !task.is_enabled || task.frequency == TaskFrequency::Manual {
        return false;
    }
    match task.next_run {
        None => true,
        Some(next) => next <= now,
    }
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .unwrap_or(date + Days::new(31))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::types::TaskCategory;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn task(frequency: TaskFrequency) -> AiTask {
        AiTask::new("t", "", TaskCategory::Analytics, frequency).unwrap()
    }

    #[test]
    fn daily_runs_next_morning() {
        let s = Schedule::default();
        let now = at(2024, 6, 10, 8, 0);
        let next = s.next_run(TaskFrequency::Daily, Some(at(2024, 6, 10, 6, 0)), now);
        assert_eq!(next, at(2024, 6, 11, 6, 0));
    }

    #[test]
    fn stale_daily_snaps_to_today() {
        let s = Schedule::default();
        let now = at(2024, 6, 10, 5, 0);
        let next = s.next_run(TaskFrequency::Daily, Some(at(2024, 6, 1, 6, 0)), now);
        assert_eq!(next, at(2024, 6, 10, 6, 0));
    }

    #[test]
    fn never_run_daily_counts_from_now() {
        let s = Schedule::default();
        let now = at(2024, 6, 10, 12, 30);
        assert_eq!(s.next_run(TaskFrequency::Daily, None, now), at(2024, 6, 11, 6, 0));
    }

    #[test]
    fn weekly_adds_seven_days() {
        let s = Schedule::default();
        let last = at(2024, 6, 10, 6, 3);
        assert_eq!(
            s.next_run(TaskFrequency::Weekly, Some(last), last),
            at(2024, 6, 17, 6, 0)
        );
    }

    #[test]
    fn monthly_goes_to_first_of_next_month() {
        let s = Schedule::default();
        let last = at(2024, 1, 31, 6, 0);
        assert_eq!(
            s.next_run(TaskFrequency::Monthly, Some(last), last),
            at(2024, 2, 1, 6, 0)
        );

        let december = at(2024, 12, 15, 6, 0);
        assert_eq!(
            s.next_run(TaskFrequency::Monthly, Some(december), december),
            at(2025, 1, 1, 6, 0)
        );
    }

    #[test]
    fn manual_returns_now() {
        let s = Schedule::default();
        let now = at(2024, 6, 10, 9, 41);
        assert_eq!(s.next_run(TaskFrequency::Manual, None, now), now);
    }

    #[test]
    fn custom_run_time_is_used() {
        let s = Schedule::new(NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        let last = at(2024, 6, 10, 22, 0);
        assert_eq!(
            s.next_run(TaskFrequency::Daily, Some(last), last),
            at(2024, 6, 11, 22, 0)
        );
    }

    #[test]
    fn due_rules() {
        let now = at(2024, 6, 10, 6, 0);

        let mut t = task(TaskFrequency::Daily);
        assert!(is_due(&t, now), "never scheduled is due");

        t.next_run = Some(now);
        assert!(is_due(&t, now), "due exactly at next_run");

        t.next_run = Some(now + Duration::seconds(1));
        assert!(!is_due(&t, now));

        t.next_run = None;
        t.is_enabled = false;
        assert!(!is_due(&t, now), "disabled is never due");

        let manual = task(TaskFrequency::Manual);
        assert!(!is_due(&manual, now), "manual is never due");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn just_ran_task_is_not_due_again(
                secs in 0i64..4_000_000_000,
                hour in 0u32..24,
                freq in prop_oneof![
                    Just(TaskFrequency::Daily),
                    Just(TaskFrequency::Weekly),
                    Just(TaskFrequency::Monthly),
                ],
            ) {
                let now = Utc.timestamp_opt(secs, 0).unwrap();
                let schedule = Schedule::new(NaiveTime::from_hms_opt(hour, 0, 0).unwrap());

                let next = schedule.next_run(freq, Some(now), now);
                prop_assert!(next > now);

                let mut t = task(freq);
                t.last_run = Some(now);
                t.next_run = Some(next);
                prop_assert!(!is_due(&t, now));
            }
        }
    }
}
