use crate::error::SessionError;
use crate::input::{InputCapture, InputEvent};

use super::service::{CoachSession, Outcome};
use super::view::SessionView;

/// Feed input events into a session until the learner quits or input ends.
///
/// `render` is called once before the first event and again after every
/// event that was not a quit. The session is closed on the way out.
///
/// # Errors
///
/// Returns `SessionError` if the session state becomes unusable.
pub async fn drive<I, F>(
    session: &CoachSession,
    input: &mut I,
    mut render: F,
) -> Result<(), SessionError>
where
    I: InputCapture + ?Sized,
    F: FnMut(&SessionView, Option<Outcome>),
{
    session.narrate_current()?;
    render(&session.view()?, None);

    let result = async {
        while let Some(event) = input.next_event().await {
            let outcome = match event {
                InputEvent::Answer(text) => session.submit(&text).await?,
                InputEvent::Next => session.advance().await?,
                InputEvent::Previous => session.retreat().await?,
                InputEvent::Quit => break,
            };
            render(&session.view()?, Some(outcome));
        }
        Ok::<(), SessionError>(())
    }
    .await;

    session.close();
    result
}
