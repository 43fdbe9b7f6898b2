#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

use std::{collections::BTreeSet, io, sync::mpsc::Sender};

use chrono::{NaiveDateTime, NaiveTime};

use alarm::{Alarm, AlarmRegistry};
use alert::{AlertCoordinator, AlertKind, AlertState};
use communication::Message;
use config::Config;
use timer::{TickOutcome, Timer};
use trigger::TriggerEngine;

pub mod alarm;
pub mod alert;
pub mod communication;
pub mod config;
pub mod sound;
pub mod timer;
pub mod trigger;

/// the whole clock: settings, alarms, the countdown timer and the single
/// active alert, driven by one tick per second
///
/// everything runs on one logical thread, the only other thread is audio and
/// it only ever receives
pub struct Clock {
    config: Config,
    trigger: TriggerEngine,
    timer: Timer,
    alerts: AlertCoordinator,
}

impl Clock {
    #[must_use]
    pub const fn new(config: Config, sender: Sender<Message>) -> Self {
        Self {
            config,
            trigger: TriggerEngine::new(),
            timer: Timer::new(),
            alerts: AlertCoordinator::new(sender),
        }
    }

    /// one second tick off the wall clock
    pub fn tick(&mut self) {
        self.tick_at(chrono::Local::now().naive_local());
    }

    /// one second tick at an explicit time, the wall clock stays out of the
    /// core so all of this is testable
    pub fn tick_at(&mut self, now: NaiveDateTime) {
        if let Some(id) = self
            .trigger
            .poll(now, &mut self.config.alarms, &mut self.alerts, self.config.volume)
        {
            log::info!("alarm {id} went off");
        }
        if self.timer.is_running() && self.timer.tick() == TickOutcome::Completed {
            // suppressed like any other trigger if an alert is already up
            self.alerts.request(
                AlertKind::Timer,
                "Time is up!".to_string(),
                None,
                self.config.volume,
            );
        }
    }

    // timer actions, each one a guarded transition that refuses instead of
    // breaking the countdown

    pub fn start_timer(&mut self, duration_seconds: u32) -> bool {
        self.timer.start(duration_seconds)
    }

    pub fn pause_timer(&mut self) -> bool {
        self.timer.pause()
    }

    pub fn resume_timer(&mut self) -> bool {
        self.timer.resume()
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
    }

    // alert actions

    pub fn stop_alert(&mut self) {
        self.alerts.stop();
    }

    /// snooze the active alarm alert, scheduling a fresh one-shot alarm
    /// `snooze_minutes` from now
    pub fn snooze(&mut self) -> Option<u64> {
        self.snooze_at(chrono::Local::now().naive_local())
    }

    pub fn snooze_at(&mut self, now: NaiveDateTime) -> Option<u64> {
        self.alerts
            .snooze(&mut self.config.alarms, self.config.snooze_minutes, now)
    }

    // alarm crud

    pub fn add_alarm(&mut self, label: String, time: NaiveTime, days: BTreeSet<u8>) -> u64 {
        self.config.alarms.add(Alarm::new(label, time, days))
    }

    pub fn remove_alarm(&mut self, id: u64) -> Option<Alarm> {
        self.config.alarms.remove(id)
    }

    pub fn toggle_alarm(&mut self, id: u64) -> bool {
        self.config.alarms.toggle(id)
    }

    // state for the presentation side

    #[must_use]
    pub const fn alarms(&self) -> &AlarmRegistry {
        &self.config.alarms
    }

    #[must_use]
    pub const fn timer(&self) -> &Timer {
        &self.timer
    }

    #[must_use]
    pub const fn alert(&self) -> Option<&AlertState> {
        self.alerts.active()
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub fn save(&self) -> io::Result<()> {
        self.config.save(&Config::config_path())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use chrono::NaiveDate;

    use super::*;

    fn clock() -> Clock {
        let (sender, receiver) = mpsc::channel();
        drop(receiver);
        Clock::new(Config::default(), sender)
    }

    // 2024-01-01 is a monday
    fn monday(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn seven_am() -> NaiveTime {
        NaiveTime::from_hms_opt(7, 0, 0).unwrap()
    }

    #[test]
    fn weekday_alarm_fires_monday_morning_and_stays_enabled() {
        let mut clock = clock();
        let id = clock.add_alarm(
            "wake up".to_string(),
            seven_am(),
            BTreeSet::from([1, 2, 3, 4, 5]),
        );

        clock.tick_at(monday(6, 59, 59));
        assert!(clock.alert().is_none());

        clock.tick_at(monday(7, 0, 0));
        let alert = clock.alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Alarm);
        assert_eq!(alert.label, "wake up");
        assert!(clock.alarms().get(id).unwrap().enabled);
    }

    #[test]
    fn one_shot_alarm_fires_once_then_disables() {
        let mut clock = clock();
        let id = clock.add_alarm("nap".to_string(), seven_am(), BTreeSet::new());

        clock.tick_at(monday(7, 0, 0));
        assert!(clock.alert().is_some());
        assert!(!clock.alarms().get(id).unwrap().enabled);
    }

    #[test]
    fn five_second_timer_completes_into_a_timer_alert() {
        let mut clock = clock();
        assert!(clock.start_timer(5));

        for second in 0..5 {
            clock.tick_at(monday(12, 0, second));
        }

        assert_eq!(clock.timer().remaining_seconds(), 0);
        assert!(clock.timer().is_idle());
        let alert = clock.alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Timer);
        assert_eq!(alert.label, "Time is up!");
        assert_eq!(alert.source_alarm_id, None);
    }

    #[test]
    fn snoozing_gym_at_seven_schedules_seven_oh_five() {
        let mut clock = clock();
        let original = clock.add_alarm(
            "Gym".to_string(),
            seven_am(),
            BTreeSet::from([1, 2, 3, 4, 5]),
        );

        clock.tick_at(monday(7, 0, 0));
        assert_eq!(clock.alert().unwrap().label, "Gym");

        let snoozed = clock.snooze_at(monday(7, 0, 30)).unwrap();
        assert!(clock.alert().is_none());

        let alarm = clock.alarms().get(snoozed).unwrap();
        assert_eq!(alarm.label, "Snooze: Gym");
        assert_eq!(alarm.time, NaiveTime::from_hms_opt(7, 5, 0).unwrap());
        assert!(alarm.days.is_empty());
        assert!(alarm.enabled);
        // the recurring original is untouched
        assert!(clock.alarms().get(original).unwrap().enabled);
        assert_eq!(clock.alarms().get(original).unwrap().time, seven_am());

        // and the snooze alarm goes off five minutes later
        clock.tick_at(monday(7, 5, 0));
        assert_eq!(clock.alert().unwrap().label, "Snooze: Gym");
        assert!(!clock.alarms().get(snoozed).unwrap().enabled);
    }

    #[test]
    fn timer_completion_is_suppressed_while_an_alarm_alert_is_up() {
        let mut clock = clock();
        clock.add_alarm("wake up".to_string(), seven_am(), BTreeSet::from([1]));
        assert!(clock.start_timer(2));

        clock.tick_at(monday(7, 0, 0));
        assert_eq!(clock.alert().unwrap().kind, AlertKind::Alarm);

        // the timer finishes during the alarm alert and stays quiet
        clock.tick_at(monday(7, 0, 1));
        clock.tick_at(monday(7, 0, 2));
        assert!(clock.timer().is_idle());
        let alert = clock.alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Alarm);
        assert_eq!(alert.label, "wake up");
    }

    #[test]
    fn alarm_is_suppressed_while_a_timer_alert_is_up() {
        let mut clock = clock();
        let id = clock.add_alarm("nap".to_string(), seven_am(), BTreeSet::new());
        assert!(clock.start_timer(1));

        clock.tick_at(monday(6, 59, 0));
        assert_eq!(clock.alert().unwrap().kind, AlertKind::Timer);

        clock.tick_at(monday(7, 0, 0));
        let alert = clock.alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Timer);
        // dropped entirely: the one-shot was not consumed either
        assert!(clock.alarms().get(id).unwrap().enabled);
    }

    #[test]
    fn stopping_an_alarm_alert_leaves_recurring_alarm_armed_for_next_week() {
        let mut clock = clock();
        let id = clock.add_alarm("wake up".to_string(), seven_am(), BTreeSet::from([1]));

        clock.tick_at(monday(7, 0, 0));
        clock.stop_alert();
        assert!(clock.alert().is_none());
        assert!(clock.alarms().get(id).unwrap().enabled);

        // move past 07:00 so the minute guard lets next week's match through
        clock.tick_at(monday(7, 1, 0));

        // next monday it fires again
        let next_monday = NaiveDate::from_ymd_opt(2024, 1, 8)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        clock.tick_at(next_monday);
        assert_eq!(clock.alert().unwrap().label, "wake up");
    }

    #[test]
    fn timer_actions_are_refused_outside_their_states() {
        let mut clock = clock();
        assert!(!clock.pause_timer());
        assert!(!clock.resume_timer());
        assert!(!clock.start_timer(0));
        assert!(clock.timer().is_idle());
    }
}
