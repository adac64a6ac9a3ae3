use std::io::{self, Write};

use services::{Outcome, SessionView};

/// Print one frame of the session to `out`.
pub fn render_frame(
    out: &mut impl Write,
    view: &SessionView,
    outcome: Option<Outcome>,
) -> io::Result<()> {
    match outcome {
        Some(Outcome::Busy) => {
            writeln!(out, "(still waiting for the coach, answer dropped)")?;
            return Ok(());
        }
        Some(Outcome::Ignored) => {
            writeln!(out, "(nothing there)")?;
            return Ok(());
        }
        Some(Outcome::Discarded) => return Ok(()),
        Some(Outcome::Appended | Outcome::Moved(_) | Outcome::Failed) | None => {}
    }

    writeln!(out)?;
    writeln!(out, "── {}", view.status_line())?;
    writeln!(out, "{}", view.ai_message)?;
    if let Some(code) = &view.code_snippet {
        writeln!(out, "```")?;
        writeln!(out, "{code}")?;
        writeln!(out, "```")?;
    }
    if let Some(feedback) = &view.feedback {
        writeln!(out, "feedback: {feedback}")?;
    }
    if let Some(hint) = &view.hint {
        writeln!(out, "hint: {hint}")?;
    }
    let mut nav = Vec::new();
    if view.can_retreat {
        nav.push(":prev");
    }
    if view.can_advance {
        nav.push(":next");
    }
    nav.push(":quit");
    writeln!(out, "[{}]", nav.join("  "))?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> SessionView {
        SessionView {
            title: "System Design".into(),
            ai_message: "What is a CDN?".into(),
            code_snippet: Some("GET /asset.js".into()),
            hint: Some("edge".into()),
            feedback: None,
            progress_percent: 40,
            position: 2,
            turn_count: 3,
            can_retreat: true,
            can_advance: true,
            loading: false,
            completed: false,
        }
    }

    #[test]
    fn renders_message_code_and_navigation() {
        let mut out = Vec::new();
        render_frame(&mut out, &view(), Some(Outcome::Appended)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("── System Design  [40%]  3/3"));
        assert!(text.contains("What is a CDN?\n```\nGET /asset.js\n```\n"));
        assert!(text.contains("hint: edge"));
        assert!(text.ends_with("[:prev  :next  :quit]\n"));
    }

    #[test]
    fn busy_outcome_prints_notice_only() {
        let mut out = Vec::new();
        render_frame(&mut out, &view(), Some(Outcome::Busy)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("(still waiting"));
        assert!(!text.contains("What is a CDN?"));
    }
}
