/// One-way sink for coach messages that should be read aloud.
///
/// The engine never waits on narration and works the same without one.
pub trait Narrator: Send + Sync {
    /// Start narrating `text`, replacing whatever is playing.
    fn narrate(&self, text: &str);

    /// Stop any ongoing playback.
    fn stop(&self) {}
}
