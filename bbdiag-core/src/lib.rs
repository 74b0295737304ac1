//! # bbdiag Core
//!
//! Baseband diagnostic log decoder for mobile signalling analysis.
//!
//! This crate contains pure parsing and protocol logic with **zero I/O dependencies**.
//! It turns the diagnostic log records a cellular chipset emits into normalized
//! [`RadioMessage`]s: GSM layer 2 frames, UMTS RRC messages and their channel,
//! direction and frame number.
//!
//! ## Architecture
//!
//! Everything outside the decoding itself is a collaborator supplied by the
//! caller: the [`Layer2Framer`] that wraps layer 3 payloads into LAPDm frames
//! and the [`RadioSink`] that receives the finished messages.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  bbdiag-core (no I/O)                                       │
//! │  ├── record        (fixed header, payload regions)          │
//! │  ├── frame_number  (timestamp to frame number)              │
//! │  ├── protocol/     (class / protocol id / type dispatch)    │
//! │  ├── message       (RadioMessage builder)                   │
//! │  └── engine        (DiagInput: one stream, stats)           │
//! └─────────────────────────────────────────────────────────────┘
//!                 ▲                           ▲
//!    ┌────────────┴────────────┐   ┌─────────┴─────────┐
//!    │  Layer2Framer           │   │ RadioSink         │
//!    │  (LAPDm, bbdiag-cli)    │   │ (JSON lines, ...) │
//!    └─────────────────────────┘   └───────────────────┘
//! ```
//!
//! ## Supported Records
//!
//! | Protocol  | Log code | Output                                   |
//! |-----------|----------|------------------------------------------|
//! | UMTS RRC  | `0x412f` | raw RRC message                          |
//! | GSM RR    | `0x512f` | LAPDm frame on SDCCH/SACCH, BCCH frame   |
//! | DTAP      | `0x713a` | LAPDm frame on SDCCH                     |
//! | GPRS GMM  | `0x5230` | skipped, duplicate of DTAP               |
//! | LTE       | `0xb0c0`, `0xb0ec`, `0xb0ed` | skipped, not supported yet |
//!
//! ## Example: Decoding a Stream
//!
//! ```rust
//! use bbdiag_core::{DiagInput, RadioMessage, SessionConfig};
//!
//! let echo = |payload: &[u8], _uplink: bool, _sacch: bool| payload.to_vec();
//! let sink: Vec<RadioMessage> = Vec::new();
//! let mut input = DiagInput::initialize(sink, echo, &SessionConfig::default()).unwrap();
//!
//! // GSM RR, SDCCH downlink, five byte layer 3 message and two check bytes
//! let record = hex::decode("1000140014002f51000020030000000080150306210001f0aabb").unwrap();
//! input.process_record(&record);
//!
//! let (messages, stats) = input.shutdown();
//! assert_eq!(stats.messages, 1);
//! assert_eq!(messages[0].payload(), &[0x06, 0x21, 0x00, 0x01, 0xf0]);
//! assert_eq!(messages[0].frame_number, 1);
//! ```

pub mod engine;
pub mod error;
pub mod frame_number;
pub mod framing;
pub mod message;
pub mod protocol;
pub mod record;
pub mod session;

// Re-export commonly used types
pub use engine::{DecodeStats, DiagInput};
pub use error::{DiagError, SessionError};
pub use frame_number::{frame_number, FN_MAX};
pub use framing::Layer2Framer;
pub use message::{ChannelKind, Direction, Domain, MessageFlags, MessageMeta, RadioMessage, Rat};
pub use protocol::{decode_record, Outcome, ProtocolId, SkipReason};
pub use record::DiagRecord;
pub use session::{RadioSink, SessionConfig};
