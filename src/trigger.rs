use chrono::{Datelike, NaiveDateTime};

use crate::{
    alarm::AlarmRegistry,
    alert::{AlertCoordinator, AlertKind},
};

/// polls the wall clock and fires at most one alarm per calendar minute
///
/// ticks arrive once a second but alarms are only checked when the minute
/// changes. the guard is not optional, a late or re-entrant tick would
/// otherwise make the same minute fire twice
#[derive(Debug, Default)]
pub struct TriggerEngine {
    last_checked_minute: Option<String>,
}

impl TriggerEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_checked_minute: None,
        }
    }

    /// one second tick
    ///
    /// when `now` enters a new minute, scan the registry in order and fire
    /// the first alarm whose time and weekday match. returns the id of the
    /// alarm that fired, if any. a system clock jumping around just makes
    /// minutes re-run or get skipped, that is accepted behavior
    pub fn poll(
        &mut self,
        now: NaiveDateTime,
        alarms: &mut AlarmRegistry,
        alerts: &mut AlertCoordinator,
        volume: f32,
    ) -> Option<u64> {
        let minute = now.format("%H:%M").to_string();
        if self.last_checked_minute.as_deref() == Some(minute.as_str()) {
            return None;
        }
        self.last_checked_minute = Some(minute);

        let weekday = now.weekday().num_days_from_sunday() as u8;
        let matched = alarms
            .iter()
            .find(|alarm| alarm.matches(now.time(), weekday))
            .map(|alarm| (alarm.id, alarm.label.clone(), alarm.is_one_shot()))?;

        let (id, label, one_shot) = matched;
        if !alerts.request(AlertKind::Alarm, label, Some(id), volume) {
            // dropped outright, no retry later in the minute
            return None;
        }
        if one_shot {
            alarms.set_enabled(id, false);
            log::info!("one-shot alarm {id} disabled after firing");
        }
        Some(id)
    }
}
