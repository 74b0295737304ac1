//! JSON-lines message store.
//!
//! Every accepted message becomes one JSON object on its own line, tagged
//! with the session id and a running message id:
//!
//! ```text
//! {"sid":0,"id":1,"rat":"Gsm","domain":"Cs","flags":"SDCCH | DECODED",...}
//! ```

use std::io::{self, Write};

use bbdiag_core::{RadioMessage, RadioSink, SessionConfig, SessionError};
use log::{info, warn};
use serde::Serialize;

#[derive(Serialize)]
struct StoredMessage<'a> {
    sid: u32,
    id: u32,
    #[serde(flatten)]
    message: &'a RadioMessage,
}

pub struct JsonLinesStore<W: Write> {
    writer: W,
    session_id: u32,
    /// `None` once the id space is used up
    next_id: Option<u32>,
    written: u64,
    write_failures: u64,
}

impl<W: Write> JsonLinesStore<W> {
    pub fn new(writer: W) -> Self {
        let defaults = SessionConfig::default();
        Self {
            writer,
            session_id: defaults.session_id,
            next_id: Some(defaults.first_message_id),
            written: 0,
            write_failures: 0,
        }
    }

    /// Messages written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Id the next stored message gets, `None` when ids are exhausted
    pub fn next_id(&self) -> Option<u32> {
        self.next_id
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_message(&mut self, id: u32, message: &RadioMessage) -> io::Result<()> {
        let stored = StoredMessage {
            sid: self.session_id,
            id,
            message,
        };
        serde_json::to_writer(&mut self.writer, &stored)?;
        self.writer.write_all(b"\n")
    }
}

impl<W: Write> RadioSink for JsonLinesStore<W> {
    fn start(&mut self, config: &SessionConfig) -> Result<(), SessionError> {
        if config.first_message_id == 0 {
            return Err(SessionError::InvalidConfig(
                "message ids start at 1".to_string(),
            ));
        }
        self.session_id = config.session_id;
        self.next_id = Some(config.first_message_id);
        info!(
            "Storing session {} from message id {}",
            self.session_id, config.first_message_id
        );
        Ok(())
    }

    fn accept(&mut self, message: RadioMessage) {
        let Some(id) = self.next_id else {
            warn!("Message ids exhausted, message not stored");
            self.write_failures += 1;
            return;
        };
        match self.write_message(id, &message) {
            Ok(()) => {
                self.written += 1;
                self.next_id = id.checked_add(1);
            }
            Err(e) => {
                warn!("Failed to store message {}: {}", id, e);
                self.write_failures += 1;
            }
        }
    }

    fn stop(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush message store: {}", e);
            self.write_failures += 1;
        }
        info!("Stored {} messages", self.written);
    }
}
