use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::alarm::AlarmRegistry;

fn default_volume() -> f32 {
    50.0
}

fn default_snooze_minutes() -> i64 {
    5
}

/// settings plus the persisted alarm list, one toml file
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// display preference only, scheduling never looks at it
    pub time_format: String,
    /// 0 to 100, handed to the audio thread when an alert goes up
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: i64,
    #[serde(default)]
    pub sound: Sound,
    #[serde(default)]
    pub alarms: AlarmRegistry,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_format: "%l:%M %p".to_string(),
            volume: default_volume(),
            snooze_minutes: default_snooze_minutes(),
            sound: Sound::default(),
            alarms: AlarmRegistry::new(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// a missing or broken config file is treated as no prior state, the app
    /// has to keep running either way
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("no config file at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                log::warn!("couldn't read config file, using defaults: {e}");
                return Self::default();
            }
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("couldn't parse config file, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let raw = toml::to_string(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, raw)
    }

    #[must_use]
    pub fn config_path() -> PathBuf {
        let mut path = directories::ProjectDirs::from("", "", "chirpy_clock")
            .expect("couldn't get config path")
            .config_dir()
            .to_path_buf();
        path.push("config.toml");
        path
    }

    #[must_use]
    pub fn sounds_path() -> PathBuf {
        let mut path = directories::ProjectDirs::from("", "", "chirpy_clock")
            .expect("couldn't get sounds directory path")
            .data_dir()
            .to_path_buf();
        path.push("sounds");
        path
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().exists()
    }
}

/// the alert sound, any file rodio can decode
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Sound {
    pub name: String,
    pub path: PathBuf,
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

impl Default for Sound {
    fn default() -> Self {
        Self {
            name: "beep beep".to_string(),
            path: Config::sounds_path().join("beep_beep.mp3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;

    #[test]
    fn minimal_config_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            time_format = "%H:%M"

            [[alarms]]
            label = "wake up"
            time = 07:00:00
            days = [1, 2, 3, 4, 5]
            "#,
        )
        .unwrap();

        assert_eq!(config.time_format, "%H:%M");
        assert_eq!(config.volume, default_volume());
        assert_eq!(config.snooze_minutes, 5);
        assert_eq!(config.alarms.len(), 1);

        let alarm = config.alarms.iter().next().unwrap();
        assert_eq!(alarm.label, "wake up");
        assert_eq!(alarm.time, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        // enabled is assumed when missing
        assert!(alarm.enabled);
    }

    #[test]
    fn one_shot_alarm_needs_no_days_key() {
        let config: Config = toml::from_str(
            r#"
            time_format = "%H:%M"

            [[alarms]]
            label = "nap"
            time = 13:30:00
            "#,
        )
        .unwrap();
        assert!(config.alarms.iter().next().unwrap().is_one_shot());
    }

    #[test]
    fn garbage_input_falls_back_to_defaults() {
        // Config::load goes through the same parse path
        assert!(toml::from_str::<Config>("time_format = 3").is_err());
    }
}
