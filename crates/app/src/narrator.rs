use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use services::Narrator;

/// Reads coach messages aloud by running an external command
/// (`say`, `espeak`, ...) with the text as its last argument.
///
/// Only one utterance plays at a time; a new one kills the previous process.
pub struct CommandNarrator {
    program: String,
    args: Vec<String>,
    playing: Mutex<Option<Child>>,
}

impl CommandNarrator {
    /// Build from a shell-style command line such as `espeak -s 160`.
    /// Returns `None` for a blank command.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            playing: Mutex::new(None),
        })
    }

    fn kill_current(slot: &mut Option<Child>) {
        if let Some(mut child) = slot.take() {
            // already exited is fine
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Narrator for CommandNarrator {
    fn narrate(&self, text: &str) {
        let text = text.trim();
        let Ok(mut slot) = self.playing.lock() else {
            tracing::warn!("narrator state poisoned");
            return;
        };
        Self::kill_current(&mut slot);
        if text.is_empty() {
            return;
        }

        match Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => *slot = Some(child),
            Err(err) => {
                tracing::warn!(program = %self.program, error = %err, "narration command failed to start");
            }
        }
    }

    fn stop(&self) {
        if let Ok(mut slot) = self.playing.lock() {
            Self::kill_current(&mut slot);
        }
    }
}

impl Drop for CommandNarrator {
    fn drop(&mut self) {
        if let Ok(slot) = self.playing.get_mut() {
            Self::kill_current(slot);
        }
    }
}
