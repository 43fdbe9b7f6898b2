use std::{fs::File, io::BufReader, path::PathBuf, sync::mpsc::Receiver};

use rodio::{Decoder, Sink, Source};

use crate::communication::Message;

/// audio thread body
///
/// loops the alert sound while an alert is up and goes quiet on stop. runs
/// until every sender is gone. playback trouble (no output device, missing or
/// unreadable sound file) is logged and swallowed, the scheduling side never
/// finds out
pub fn run_audio(receiver: &Receiver<Message>, sound_path: PathBuf) {
    let stream = match rodio::OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(e) => {
            log::error!("couldn't open audio output, alerts will be silent: {e}");
            // keep draining so senders never notice
            for _ in receiver.iter() {}
            return;
        }
    };

    let mut playing: Option<Sink> = None;
    for message in receiver.iter() {
        match message {
            Message::AlertTriggered { volume } => {
                if playing.is_some() {
                    // only one alert at a time, the coordinator already gates this
                    continue;
                }
                let file = match File::open(&sound_path) {
                    Ok(file) => file,
                    Err(e) => {
                        log::error!("couldn't open sound file {}: {e}", sound_path.display());
                        continue;
                    }
                };
                match Decoder::new(BufReader::new(file)) {
                    Ok(source) => {
                        let sink = Sink::connect_new(stream.mixer());
                        sink.set_volume(volume / 100.0);
                        // ring until told to stop
                        sink.append(source.repeat_infinite());
                        sink.play();
                        playing = Some(sink);
                    }
                    Err(e) => {
                        log::error!("couldn't decode sound file {}: {e}", sound_path.display());
                    }
                }
            }
            Message::AlertStopped => {
                if let Some(sink) = playing.take() {
                    sink.stop();
                }
            }
        }
    }
}
