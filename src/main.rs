use std::{error::Error, io::BufRead, sync::mpsc, thread, time::Duration};

use chirpy_clock::{
    alarm::Alarm,
    alert::AlertKind,
    config::Config,
    sound, Clock,
};
use chrono::NaiveTime;
use clap::{command, Parser, Subcommand};

const DAYS_OF_WEEK: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write a default config file
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// add an alarm, time is HH:MM (24 hour)
    Add {
        time: String,
        #[clap(long, short, default_value = "alarm")]
        label: String,
        /// weekday to repeat on, 0 = Sunday through 6 = Saturday, repeatable.
        /// no days makes a one-shot alarm
        #[clap(long, short)]
        day: Vec<u8>,
    },
    /// list the configured alarms
    List,
    /// remove an alarm by its position in `list`
    Remove { index: usize },
}

fn main() -> Result<(), Box<dyn Error>> {
    // initilize the logger
    simple_file_logger::init_logger!("chirpy_clock").expect("couldn't initialize logger");

    let args = Args::parse();
    match args.command {
        Some(Command::Init { force }) => {
            if force || !Config::is_config_present() {
                Config::new().save(&Config::config_path())?;
                println!("wrote default config to {}", Config::config_path().display());
            }
        }
        Some(Command::Add { time, label, day }) => add_alarm(&time, label, day)?,
        Some(Command::List) => list_alarms(),
        Some(Command::Remove { index }) => remove_alarm(index)?,
        None => run()?,
    }
    Ok(())
}

fn add_alarm(time: &str, label: String, days: Vec<u8>) -> Result<(), Box<dyn Error>> {
    // reject bad input here, the engine assumes well formed alarms
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| format!("{time} is not a HH:MM time"))?;
    if days.iter().any(|day| *day > 6) {
        return Err("days go from 0 (Sunday) to 6 (Saturday)".into());
    }
    let mut config = Config::load(&Config::config_path());
    config.alarms.add(Alarm::new(label, time, days.into_iter().collect()));
    config.save(&Config::config_path())?;
    Ok(())
}

fn list_alarms() {
    let config = Config::load(&Config::config_path());
    if config.alarms.is_empty() {
        println!("no alarms");
        return;
    }
    for (i, alarm) in config.alarms.iter().enumerate() {
        let days = if alarm.is_one_shot() {
            "once".to_string()
        } else {
            alarm
                .days
                .iter()
                .map(|day| DAYS_OF_WEEK[usize::from(*day)])
                .collect::<Vec<_>>()
                .join(" ")
        };
        println!(
            "{i}: {} at {} ({days}){}",
            alarm.label,
            alarm.time.format(&config.time_format),
            if alarm.enabled { "" } else { " [disabled]" }
        );
    }
}

fn remove_alarm(index: usize) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load(&Config::config_path());
    match config.alarms.remove_at(index) {
        Some(alarm) => {
            config.save(&Config::config_path())?;
            println!("removed {}", alarm.label);
            Ok(())
        }
        None => Err(format!("no alarm at index {index}").into()),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::load(&Config::config_path());

    let (audio_sender, audio_receiver) = mpsc::channel();
    let sound_path = config.sound.path.clone();
    thread::spawn(move || sound::run_audio(&audio_receiver, sound_path));

    // stdin is blocking, read it on its own thread and feed lines back
    let (line_sender, line_receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_sender.send(line).is_err() {
                break;
            }
        }
    });

    let mut clock = Clock::new(config, audio_sender);
    println!("chirpy clock is running");
    println!("commands: timer <minutes>, pause, resume, reset, stop, snooze, quit");

    let mut alert_announced = false;
    loop {
        match line_receiver.recv_timeout(Duration::from_secs(1)) {
            Ok(line) => {
                if handle_command(&mut clock, line.trim()) {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => tick(&mut clock, &mut alert_announced),
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    clock.save()?;
    Ok(())
}

fn tick(clock: &mut Clock, alert_announced: &mut bool) {
    clock.tick();
    match clock.alert() {
        Some(alert) if !*alert_announced => {
            *alert_announced = true;
            match alert.kind {
                AlertKind::Alarm => println!("ALARM: {} (stop or snooze?)", alert.label),
                AlertKind::Timer => println!("TIMER: {}", alert.label),
            }
            // a one-shot may just have disabled itself, keep the file in step
            if let Err(e) = clock.save() {
                log::error!("couldn't save config: {e}");
            }
        }
        None => *alert_announced = false,
        Some(_) => {}
    }
}

// returns true on quit
fn handle_command(clock: &mut Clock, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("timer"), Some(minutes)) => match minutes.parse::<u32>() {
            Ok(minutes) if minutes > 0 => {
                if clock.start_timer(minutes.saturating_mul(60)) {
                    println!("timer set for {minutes} minute(s)");
                } else {
                    println!("a timer is already going, reset it first");
                }
            }
            _ => println!("timer wants a whole number of minutes, at least 1"),
        },
        (Some("timer"), None) => {
            let timer = clock.timer();
            println!(
                "{:02}:{:02} of {:02}:{:02}",
                timer.remaining_seconds() / 60,
                timer.remaining_seconds() % 60,
                timer.total_seconds() / 60,
                timer.total_seconds() % 60,
            );
        }
        (Some("pause"), _) => {
            if !clock.pause_timer() {
                println!("no running timer to pause");
            }
        }
        (Some("resume"), _) => {
            if !clock.resume_timer() {
                println!("no paused timer to resume");
            }
        }
        (Some("reset"), _) => clock.reset_timer(),
        (Some("stop"), _) => clock.stop_alert(),
        (Some("snooze"), _) => {
            if clock.snooze().is_some() {
                println!("snoozed for {} minute(s)", clock.config().snooze_minutes);
                if let Err(e) = clock.save() {
                    log::error!("couldn't save config: {e}");
                }
            } else {
                println!("nothing to snooze");
            }
        }
        (Some("quit" | "q"), _) => return true,
        (Some(other), _) => println!("unknown command {other}"),
        (None, _) => {}
    }
    false
}
