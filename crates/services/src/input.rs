use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// What the learner asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Answer(String),
    Next,
    Previous,
    Quit,
}

/// Source of learner input, whatever the modality (typing, speech-to-text).
#[async_trait]
pub trait InputCapture: Send {
    /// Wait for the next event. `None` means the source is exhausted.
    async fn next_event(&mut self) -> Option<InputEvent>;
}

/// Line-oriented input: one answer or command per line.
pub struct LineInput<R> {
    lines: Lines<R>,
}

impl<R> LineInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R> InputCapture for LineInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_event(&mut self) -> Option<InputEvent> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(event) = parse_line(&line) {
                        return Some(event);
                    }
                }
                Ok(None) => return None,
                Err(err) => {
                    tracing::warn!(error = %err, "input stream failed");
                    return None;
                }
            }
        }
    }
}

/// Map one input line to an event. Blank lines produce nothing.
#[must_use]
pub fn parse_line(line: &str) -> Option<InputEvent> {
    let trimmed = line.trim();
    match trimmed {
        "" => None,
        ":next" | ":n" => Some(InputEvent::Next),
        ":prev" | ":p" => Some(InputEvent::Previous),
        ":quit" | ":q" => Some(InputEvent::Quit),
        answer => Some(InputEvent::Answer(answer.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_answers() {
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line(":n"), Some(InputEvent::Next));
        assert_eq!(parse_line(" :prev "), Some(InputEvent::Previous));
        assert_eq!(parse_line(":q"), Some(InputEvent::Quit));
        assert_eq!(
            parse_line("  use a queue "),
            Some(InputEvent::Answer("use a queue".into()))
        );
    }

    #[tokio::test]
    async fn line_input_skips_blank_lines_and_ends_at_eof() {
        let source: &[u8] = b"first answer\n\n  \n:next\n";
        let mut input = LineInput::new(source);
        assert_eq!(
            input.next_event().await,
            Some(InputEvent::Answer("first answer".into()))
        );
        assert_eq!(input.next_event().await, Some(InputEvent::Next));
        assert_eq!(input.next_event().await, None);
    }
}
