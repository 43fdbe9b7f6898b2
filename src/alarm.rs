use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// ids are only unique within a session, alarms in the config file get fresh
/// ones when they are loaded
pub fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
#[must_use]
pub const fn always_true() -> bool {
    true
}

/// represents an alarm
/// contains the time of day the alarm should go off at (minute resolution)
/// and the weekdays it repeats on
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub label: String,
    #[serde(with = "toml_datetime_compat")]
    pub time: NaiveTime,
    /// weekdays the alarm repeats on, 0 = Sunday through 6 = Saturday
    /// empty means the alarm goes off once and then disables itself
    #[serde(default)]
    pub days: BTreeSet<u8>,
    #[serde(default = "always_true")]
    pub enabled: bool,
    #[serde(skip, default = "next_id")]
    pub id: u64,
}

impl Alarm {
    #[must_use]
    pub fn new(label: String, time: NaiveTime, days: BTreeSet<u8>) -> Self {
        Self {
            label,
            // alarms only have minute resolution
            time: time.with_second(0).unwrap_or(time),
            days,
            enabled: true,
            id: next_id(),
        }
    }

    /// whether the alarm should go off at the given time on the given weekday
    #[must_use]
    pub fn matches(&self, time: NaiveTime, weekday: u8) -> bool {
        self.enabled
            && self.time.hour() == time.hour()
            && self.time.minute() == time.minute()
            && (self.days.is_empty() || self.days.contains(&weekday))
    }

    #[must_use]
    pub fn is_one_shot(&self) -> bool {
        self.days.is_empty()
    }
}

/// owns the alarm list, everything else only reads it and asks for changes
/// through these methods
///
/// insertion order is kept, which is also the order alarms are checked in when
/// two of them share a time
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct AlarmRegistry {
    alarms: Vec<Alarm>,
}

impl AlarmRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self { alarms: Vec::new() }
    }

    /// returns the id of the added alarm
    pub fn add(&mut self, alarm: Alarm) -> u64 {
        let id = alarm.id;
        self.alarms.push(alarm);
        id
    }

    pub fn remove(&mut self, id: u64) -> Option<Alarm> {
        let index = self.alarms.iter().position(|alarm| alarm.id == id)?;
        Some(self.alarms.remove(index))
    }

    /// remove by list position, for the cli where ids are not shown
    pub fn remove_at(&mut self, index: usize) -> Option<Alarm> {
        (index < self.alarms.len()).then(|| self.alarms.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Alarm> {
        self.alarms.iter().find(|alarm| alarm.id == id)
    }

    /// returns false if no alarm has that id
    pub fn set_enabled(&mut self, id: u64, enabled: bool) -> bool {
        match self.alarms.iter_mut().find(|alarm| alarm.id == id) {
            Some(alarm) => {
                alarm.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, id: u64) -> bool {
        match self.alarms.iter_mut().find(|alarm| alarm.id == id) {
            Some(alarm) => {
                alarm.enabled = !alarm.enabled;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Alarm> {
        self.alarms.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }
}
