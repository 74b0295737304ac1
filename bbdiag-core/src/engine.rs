//! DiagInput - per-stream decoding context
//!
//! Owns the consumer and the layer 2 framer for one capture stream and feeds
//! every record through [`decode_record`]. Records must be handed in capture
//! order; frame numbers downstream depend on it.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  DiagInput                                                │
//! │  ├─ process_record ──► decode_record ──► RadioSink        │
//! │  │                        │                               │
//! │  │                        └─► Layer2Framer (L3 records)   │
//! │  └─ DecodeStats                                           │
//! └───────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::error::{DiagError, SessionError};
use crate::framing::Layer2Framer;
use crate::protocol::{decode_record, Outcome};
use crate::session::{RadioSink, SessionConfig};

/// Counters kept while a stream is decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    /// Records handed to `process_record`
    pub records: u64,
    /// Messages passed to the sink
    pub messages: u64,
    /// Well-formed records that produced no message
    pub skipped: u64,
    /// Records shorter than their header or length fields
    pub truncated: u64,
    /// Records whose payload did not fit a message
    pub oversized: u64,
}

impl DecodeStats {
    /// Records dropped because they were malformed
    pub fn malformed(&self) -> u64 {
        self.truncated + self.oversized
    }
}

/// Decoding context for one capture stream.
pub struct DiagInput<S, F> {
    sink: S,
    framer: F,
    stats: DecodeStats,
}

impl<S, F> DiagInput<S, F>
where
    S: RadioSink,
    F: Layer2Framer,
{
    /// Start the sink's session and return a context ready for records.
    pub fn initialize(
        mut sink: S,
        framer: F,
        config: &SessionConfig,
    ) -> Result<Self, SessionError> {
        sink.start(config)?;
        log::info!(
            "Session {} started, first message id {}",
            config.session_id,
            config.first_message_id
        );
        Ok(Self {
            sink,
            framer,
            stats: DecodeStats::default(),
        })
    }

    /// Decode one record and hand any resulting message to the sink.
    ///
    /// Malformed records are logged and counted, never propagated.
    pub fn process_record(&mut self, data: &[u8]) {
        self.stats.records += 1;

        match decode_record(data, &self.framer) {
            Ok(Outcome::Message(message)) => {
                self.stats.messages += 1;
                self.sink.accept(*message);
            }
            Ok(Outcome::Skipped(reason)) => {
                log::trace!("Record {} skipped: {}", self.stats.records, reason);
                self.stats.skipped += 1;
            }
            Err(e) => {
                log::warn!("Record {} dropped: {}", self.stats.records, e);
                match e {
                    DiagError::PayloadTooLarge { .. } => self.stats.oversized += 1,
                    DiagError::TruncatedRecord { .. } => self.stats.truncated += 1,
                }
            }
        }
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Stop the sink's session, returning it with the final counters.
    pub fn shutdown(mut self) -> (S, DecodeStats) {
        self.sink.stop();
        log::info!(
            "Session stopped after {} records, {} messages",
            self.stats.records,
            self.stats.messages
        );
        (self.sink, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RadioMessage;
    use crate::protocol::testing::{echo, record};
    use crate::protocol::{PROTO_DTAP, PROTO_GPRS_GMM, PROTO_GSM_RR, PROTO_UMTS_RRC};

    #[derive(Default)]
    struct Recorder {
        started: Option<SessionConfig>,
        stopped: bool,
        messages: Vec<RadioMessage>,
    }

    impl RadioSink for Recorder {
        fn start(&mut self, config: &SessionConfig) -> Result<(), SessionError> {
            self.started = Some(config.clone());
            Ok(())
        }

        fn accept(&mut self, message: RadioMessage) {
            self.messages.push(message);
        }

        fn stop(&mut self) {
            self.stopped = true;
        }
    }

    struct Refusing;

    impl RadioSink for Refusing {
        fn start(&mut self, _config: &SessionConfig) -> Result<(), SessionError> {
            Err(SessionError::StartFailed("store is read-only".into()))
        }

        fn accept(&mut self, _message: RadioMessage) {}
    }

    #[test]
    fn test_lifecycle() {
        let config = SessionConfig {
            session_id: 3,
            first_message_id: 10,
        };
        let input = DiagInput::initialize(Recorder::default(), echo, &config).unwrap();
        assert_eq!(input.sink().started, Some(config));
        assert!(!input.sink().stopped);

        let (sink, stats) = input.shutdown();
        assert!(sink.stopped);
        assert_eq!(stats, DecodeStats::default());
    }

    #[test]
    fn test_start_failure() {
        let result = DiagInput::initialize(Refusing, echo, &SessionConfig::default());
        assert!(matches!(result, Err(SessionError::StartFailed(_))));
    }

    #[test]
    fn test_process_stream() {
        let config = SessionConfig::default();
        let mut input = DiagInput::initialize(Vec::<RadioMessage>::new(), echo, &config).unwrap();

        // message
        input.process_record(&record(PROTO_GSM_RR, 128, 0x21, 3, &[0x06, 0x21, 0x00]));
        // skipped
        input.process_record(&record(PROTO_GPRS_GMM, 0, 0, 0, &[0x08]));
        input.process_record(&[0x7b, 0x00]);
        // truncated
        input.process_record(&[0x10, 0x00, 0x01]);
        // oversized
        input.process_record(&record(PROTO_UMTS_RRC, 1, 0, 0, &[0u8; 300]));
        // message
        input.process_record(&record(PROTO_DTAP, 1, 2, 0, &[0x00, 0x00, 0x05, 0x08]));

        let (messages, stats) = input.shutdown();
        assert_eq!(
            stats,
            DecodeStats {
                records: 6,
                messages: 2,
                skipped: 2,
                truncated: 1,
                oversized: 1,
            }
        );
        assert_eq!(stats.malformed(), 2);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].payload(), &[0x06, 0x21, 0x00]);
        assert_eq!(messages[1].payload(), &[0x05, 0x08]);
    }

    #[test]
    fn test_every_error_is_counted_once() {
        let config = SessionConfig::default();
        let mut input = DiagInput::initialize(Vec::<RadioMessage>::new(), echo, &config).unwrap();

        let mut overrun = record(PROTO_GSM_RR, 128, 0x21, 3, &[0x06, 0x21, 0x00]);
        overrun[2..4].copy_from_slice(&0xffffu16.to_le_bytes());
        input.process_record(&overrun);
        let mut overrun = record(PROTO_DTAP, 1, 2, 0, &[0x00, 0x00, 0x05, 0x08]);
        overrun[4..6].copy_from_slice(&0xffffu16.to_le_bytes());
        input.process_record(&overrun);
        input.process_record(&record(PROTO_GSM_RR, 128, 0, 0, &[0x2b; 300]));
        input.process_record(&[0x10, 0x00, 0x14, 0x00]);

        let (messages, stats) = input.shutdown();
        assert!(messages.is_empty());
        assert_eq!(stats.truncated, 3);
        assert_eq!(stats.oversized, 1);
        assert_eq!(stats.malformed(), stats.records - stats.messages - stats.skipped);
    }

    #[test]
    fn test_one_message_per_record_in_order() {
        let config = SessionConfig::default();
        let mut input = DiagInput::initialize(Vec::<RadioMessage>::new(), echo, &config).unwrap();
        for subtype in 1..=5u8 {
            input.process_record(&record(PROTO_GSM_RR, 128, subtype, 2, &[0x06, subtype]));
        }
        let (messages, stats) = input.shutdown();
        assert_eq!(stats.messages, 5);
        let order: Vec<u8> = messages.iter().map(|m| m.payload()[1]).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = DecodeStats {
            records: 4,
            messages: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["records"], 4);
        assert_eq!(json["messages"], 1);
        assert_eq!(json["oversized"], 0);
    }
}
