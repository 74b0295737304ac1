//! Message consumer and session lifecycle.
//!
//! Finished [`RadioMessage`]s leave the decoder through a [`RadioSink`]. The
//! sink also owns whatever long-lived resource the analysis needs (a
//! database, an output file); the decoder only tells it when the stream
//! starts and stops.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::message::RadioMessage;

/// Parameters handed to the sink when a session starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Identifier of the capture session
    pub session_id: u32,
    /// Identifier given to the first stored message
    pub first_message_id: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: 0,
            first_message_id: 1,
        }
    }
}

/// Consumer of decoded radio messages.
///
/// `start` is called once before the first record and `stop` once after the
/// last one. `accept` takes ownership of each message and must not block
/// indefinitely.
pub trait RadioSink {
    fn start(&mut self, _config: &SessionConfig) -> Result<(), SessionError> {
        Ok(())
    }

    fn accept(&mut self, message: RadioMessage);

    fn stop(&mut self) {}
}

/// Collects messages in memory
impl RadioSink for Vec<RadioMessage> {
    fn accept(&mut self, message: RadioMessage) {
        self.push(message);
    }
}

impl<T: RadioSink + ?Sized> RadioSink for Box<T> {
    fn start(&mut self, config: &SessionConfig) -> Result<(), SessionError> {
        (**self).start(config)
    }

    fn accept(&mut self, message: RadioMessage) {
        (**self).accept(message)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
