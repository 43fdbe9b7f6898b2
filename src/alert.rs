use std::{collections::BTreeSet, sync::mpsc::Sender};

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

use crate::{
    alarm::{Alarm, AlarmRegistry},
    communication::Message,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Alarm,
    Timer,
}

/// the currently presented trigger notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertState {
    pub kind: AlertKind,
    pub label: String,
    /// which alarm fired, only set for alarm alerts, used by snooze
    pub source_alarm_id: Option<u64>,
}

/// owns the single active alert slot
///
/// both the trigger engine and the timer ask for alerts through
/// [`Self::request`], which only ever lets one through at a time. a trigger
/// that arrives while an alert is up is dropped, there is no queue.
#[derive(Debug)]
pub struct AlertCoordinator {
    active: Option<AlertState>,
    sender: Sender<Message>,
}

impl AlertCoordinator {
    #[must_use]
    pub const fn new(sender: Sender<Message>) -> Self {
        Self {
            active: None,
            sender,
        }
    }

    #[must_use]
    pub const fn active(&self) -> Option<&AlertState> {
        self.active.as_ref()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// present an alert unless one is already up
    ///
    /// returns whether the request was accepted, callers that have follow up
    /// work (like disabling a one-shot alarm) should only do it when it was
    pub fn request(
        &mut self,
        kind: AlertKind,
        label: String,
        source_alarm_id: Option<u64>,
        volume: f32,
    ) -> bool {
        if self.active.is_some() {
            log::debug!("dropping {kind:?} trigger {label:?}, an alert is already up");
            return false;
        }
        log::info!("{kind:?} alert {label:?} is up");
        self.send(Message::AlertTriggered { volume });
        self.active = Some(AlertState {
            kind,
            label,
            source_alarm_id,
        });
        true
    }

    /// clear the alert, whatever kind it is, and quiet the audio thread
    pub fn stop(&mut self) {
        self.active = None;
        self.send(Message::AlertStopped);
    }

    /// snooze the active alarm alert
    ///
    /// stops the alert and schedules a fresh one-shot alarm `snooze_minutes`
    /// from now. the alarm that fired is left alone, if it repeats it will go
    /// off again on its own next scheduled day. returns the new alarm's id,
    /// or `None` when there is no alarm alert to snooze
    pub fn snooze(
        &mut self,
        alarms: &mut AlarmRegistry,
        snooze_minutes: i64,
        now: NaiveDateTime,
    ) -> Option<u64> {
        let label = match self.active.as_ref() {
            Some(alert) if alert.kind == AlertKind::Alarm => format!("Snooze: {}", alert.label),
            _ => return None,
        };
        self.stop();
        let time = snooze_time(now, snooze_minutes);
        let id = alarms.add(Alarm::new(label, time, BTreeSet::new()));
        log::info!("snoozed until {time}");
        Some(id)
    }

    // audio is fire and forget, if the thread is gone we keep scheduling anyway
    fn send(&self, message: Message) {
        if self.sender.send(message).is_err() {
            log::warn!("audio thread is gone, alerts will be silent");
        }
    }
}

/// time of day `minutes` from `now`, truncated to the minute
fn snooze_time(now: NaiveDateTime, minutes: i64) -> NaiveTime {
    let time = (now + Duration::minutes(minutes)).time();
    time.with_second(0).unwrap_or(time)
}
