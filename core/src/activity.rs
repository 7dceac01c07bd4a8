use std::sync::mpsc::Sender;

use crate::error::DuskError;

/// A single user-input notification.
///
/// Key presses carry their code so brightness keys can be dispatched;
/// pointer motion and other events carry `None`.
#[derive(Debug, Clone, Copy)]
pub struct InputEvent {
    pub keycode: Option<u16>,
}

/// A source of user-input events.
///
/// `start` hands the source a channel; the source delivers one `InputEvent`
/// per observed user input for as long as the receiving side exists.
pub trait ActivitySource: Send {
    fn start(&mut self, events: Sender<InputEvent>) -> Result<(), DuskError>;
}
