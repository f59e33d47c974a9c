//! Clock-driven task scheduling.
//!
//! The [`Scheduler`] never sleeps or spawns anything. The caller reads the
//! time from a [`Clock`], asks [`Scheduler::run_pending`] which tasks are due
//! and runs them one after another. Tasks therefore never overlap, and tests
//! can drive the schedule with hand-picked timestamps.
//!
//! Interval jobs count elapsed UTC time, so DST transitions and wall-clock
//! steps neither stall nor hurry them. Time-of-day jobs follow the local
//! wall clock.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};

use crate::Zone;

// ---

/// One reading of the clock: the absolute instant and the wall-clock time it
/// shows in the configured zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub utc: DateTime<Utc>,
    pub local: NaiveDateTime,
}

impl Moment {
    pub fn in_zone(utc: DateTime<Utc>, zone: Zone) -> Self {
        Self {
            utc,
            local: zone.wall_clock(utc),
        }
    }
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Moment;
}

/// System clock read in a given zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    zone: Zone,
}

impl SystemClock {
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Moment {
        Moment::in_zone(Utc::now(), self.zone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Trigger {
    Every(Duration),
    DailyAt(NaiveTime),
}

/// When a job next becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextRun {
    /// Once this UTC instant is reached.
    At(DateTime<Utc>),
    /// Once the local wall clock shows this time.
    WallClock(NaiveDateTime),
}

impl NextRun {
    fn reached(&self, now: &Moment) -> bool {
        match *self {
            NextRun::At(at) => now.utc >= at,
            NextRun::WallClock(at) => now.local >= at,
        }
    }
}

impl Trigger {
    // ---
    /// First run strictly after `now`.
    fn next_after(&self, now: &Moment) -> NextRun {
        // ---
        match *self {
            Trigger::Every(interval) => NextRun::At(now.utc + interval),
            Trigger::DailyAt(time) => {
                let today = now.local.date().and_time(time);
                if today > now.local {
                    NextRun::WallClock(today)
                } else {
                    NextRun::WallClock(today + Duration::days(1))
                }
            }
        }
    }
}

#[derive(Debug)]
struct Job<T> {
    trigger: Trigger,
    next_run: NextRun,
    task: T,
}

/// Ordered set of recurring tasks.
#[derive(Debug)]
pub struct Scheduler<T> {
    jobs: Vec<Job<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self { jobs: Vec::new() }
    }
}

impl<T: Clone> Scheduler<T> {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` every `interval` of elapsed time, first at `now + interval`.
    ///
    /// Non-positive intervals are clamped to one second.
    pub fn schedule_every(&mut self, interval: Duration, task: T, now: Moment) {
        // ---
        let interval = interval.max(Duration::seconds(1));
        let trigger = Trigger::Every(interval);
        self.jobs.push(Job {
            trigger,
            next_run: trigger.next_after(&now),
            task,
        });
    }

    /// Run `task` once a day when the wall clock shows `time_of_day`, first at
    /// its next occurrence after `now`.
    pub fn schedule_at(&mut self, time_of_day: NaiveTime, task: T, now: Moment) {
        // ---
        let trigger = Trigger::DailyAt(time_of_day);
        self.jobs.push(Job {
            trigger,
            next_run: trigger.next_after(&now),
            task,
        });
    }

    /// Tasks due at `now`, in registration order.
    ///
    /// Each due job is rescheduled relative to `now`, so a job that fell
    /// behind runs once rather than once per missed slot.
    pub fn run_pending(&mut self, now: Moment) -> Vec<T> {
        // ---
        let mut due = Vec::new();
        for job in self.jobs.iter_mut().filter(|job| job.next_run.reached(&now)) {
            due.push(job.task.clone());
            job.next_run = job.trigger.next_after(&now);
        }
        due
    }

    /// Upcoming runs in registration order.
    pub fn next_runs(&self) -> Vec<NextRun> {
        self.jobs.iter().map(|job| job.next_run).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
