/// messages sent to the audio thread
/// fire and forget, the core never waits on a reply
#[derive(Debug, Clone, Copy)]
pub enum Message {
    AlertTriggered { volume: f32 },
    // sent on stop and snooze, also harmless if nothing is playing
    AlertStopped,
}
