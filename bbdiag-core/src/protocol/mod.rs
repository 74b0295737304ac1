//! Protocol demultiplexing.
//!
//! Every log record carries a protocol id (the chipset's log code) that
//! decides how its payload is interpreted. This module routes a record to
//! the matching protocol handler:
//!
//! | Protocol id | Handler | Result |
//! |-------------|---------|--------|
//! | `0x412f` UMTS RRC | [`umts`] | raw RRC message, uplink or downlink |
//! | `0x512f` GSM RR | [`gsm`] | L3 framed on SDCCH/SACCH, or L2 BCCH |
//! | `0x5230` GPRS GMM | - | always skipped, duplicates a DTAP record |
//! | `0x713a` DTAP | [`dtap`] | L3 framed on SDCCH |
//! | `0xb0c0`, `0xb0ec`, `0xb0ed` LTE | [`lte`] | not supported yet, skipped |
//!
//! All functions are pure (no I/O). When a record does not match any known
//! branch, the decoder skips it and logs it rather than guessing a decode.
//!
//! # Example
//!
//! ```rust
//! use bbdiag_core::protocol::{decode_record, Outcome, SkipReason};
//!
//! let echo = |payload: &[u8], _uplink: bool, _sacch: bool| payload.to_vec();
//!
//! // A command response, not a log record
//! let record = [0x4b, 0x12, 0x00, 0x00];
//! match decode_record(&record, &echo) {
//!     Ok(Outcome::Skipped(SkipReason::ForeignClass(class))) => assert_eq!(class, 0x124b),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

pub mod dtap;
pub mod gsm;
pub mod lte;
pub mod umts;

use std::fmt;

use crate::error::DiagError;
use crate::framing::Layer2Framer;
use crate::message::RadioMessage;
use crate::record::{DiagRecord, RecordClass};

pub use lte::LteChannel;

// =============================================================================
// Protocol ids
// =============================================================================

/// UMTS RRC signalling message
pub const PROTO_UMTS_RRC: u16 = 0x412f;
/// GSM RR signalling message
pub const PROTO_GSM_RR: u16 = 0x512f;
/// GPRS GMM message
pub const PROTO_GPRS_GMM: u16 = 0x5230;
/// DTAP (GSM/UMTS NAS) message
pub const PROTO_DTAP: u16 = 0x713a;
/// LTE RRC OTA message
pub const PROTO_LTE_RRC: u16 = 0xb0c0;
/// LTE NAS EMM message, downlink
pub const PROTO_LTE_NAS_EMM_DL: u16 = 0xb0ec;
/// LTE NAS EMM message, uplink
pub const PROTO_LTE_NAS_EMM_UL: u16 = 0xb0ed;

/// Air-interface protocol of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolId {
    UmtsRrc,
    GsmRr,
    GprsGmm,
    Dtap,
    Lte(LteChannel),
    Unknown(u16),
}

impl ProtocolId {
    pub fn from_value(v: u16) -> Self {
        match v {
            PROTO_UMTS_RRC => ProtocolId::UmtsRrc,
            PROTO_GSM_RR => ProtocolId::GsmRr,
            PROTO_GPRS_GMM => ProtocolId::GprsGmm,
            PROTO_DTAP => ProtocolId::Dtap,
            PROTO_LTE_RRC => ProtocolId::Lte(LteChannel::Rrc),
            PROTO_LTE_NAS_EMM_DL => ProtocolId::Lte(LteChannel::NasEmmDownlink),
            PROTO_LTE_NAS_EMM_UL => ProtocolId::Lte(LteChannel::NasEmmUplink),
            _ => ProtocolId::Unknown(v),
        }
    }

    pub fn value(self) -> u16 {
        match self {
            ProtocolId::UmtsRrc => PROTO_UMTS_RRC,
            ProtocolId::GsmRr => PROTO_GSM_RR,
            ProtocolId::GprsGmm => PROTO_GPRS_GMM,
            ProtocolId::Dtap => PROTO_DTAP,
            ProtocolId::Lte(channel) => channel.value(),
            ProtocolId::Unknown(v) => v,
        }
    }
}

// =============================================================================
// Decode outcome
// =============================================================================

/// Why a well-formed record produced no message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Record class other than log records
    ForeignClass(u16),
    /// Protocol id not handled by this decoder
    UnknownProtocol(u16),
    /// GPRS GMM records repeat a message logged elsewhere
    DuplicateGmm,
    /// UMTS RRC channel type that is neither uplink nor downlink
    UnknownRrcDirection(u8),
    /// GSM RR message type/subtype outside the handled table
    UnhandledRrMessage { message_type: u8, message_subtype: u8 },
    /// DTAP record declaring an empty message
    EmptyNasMessage,
    /// DTAP record whose declared length runs past the record
    NasLengthOutOfRange { declared: u8, record_len: usize },
    /// LTE decoding is not implemented; `uplink` is the direction hint
    /// found in the record, if any
    LteNotSupported { channel: LteChannel, uplink: Option<bool> },
    /// The layer 3 payload was empty or the framer produced no frame
    NotFramed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ForeignClass(class) => write!(f, "class {:04x} is not supported", class),
            SkipReason::UnknownProtocol(id) => write!(f, "unknown protocol {:04x}", id),
            SkipReason::DuplicateGmm => write!(f, "duplicate GPRS GMM message"),
            SkipReason::UnknownRrcDirection(t) => write!(f, "unknown RRC channel type {}", t),
            SkipReason::UnhandledRrMessage {
                message_type,
                message_subtype,
            } => write!(
                f,
                "unhandled RR message {}/{}",
                message_type, message_subtype
            ),
            SkipReason::EmptyNasMessage => write!(f, "empty NAS message"),
            SkipReason::NasLengthOutOfRange {
                declared,
                record_len,
            } => write!(
                f,
                "NAS length {} exceeds record of {} bytes",
                declared, record_len
            ),
            SkipReason::LteNotSupported { channel, .. } => {
                write!(f, "{:?} decoding not supported", channel)
            }
            SkipReason::NotFramed => write!(f, "nothing to frame"),
        }
    }
}

/// Result of decoding one well-formed record
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Message(Box<RadioMessage>),
    Skipped(SkipReason),
}

impl Outcome {
    fn from_built(message: Option<RadioMessage>) -> Self {
        match message {
            Some(m) => Outcome::Message(Box::new(m)),
            None => Outcome::Skipped(SkipReason::NotFramed),
        }
    }

    pub fn message(self) -> Option<RadioMessage> {
        match self {
            Outcome::Message(m) => Some(*m),
            Outcome::Skipped(_) => None,
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Decode one raw record.
///
/// Errors are returned for malformed records only; anything well-formed that
/// does not turn into a message is `Ok(Outcome::Skipped(_))`.
pub fn decode_record<F>(data: &[u8], framer: &F) -> Result<Outcome, DiagError>
where
    F: Layer2Framer + ?Sized,
{
    if let RecordClass::Other(class) = RecordClass::peek(data)? {
        log::trace!("Class {:04x} is not supported", class);
        return Ok(Outcome::Skipped(SkipReason::ForeignClass(class)));
    }

    let record = DiagRecord::parse(data)?;
    demultiplex(&record, framer)
}

/// Route a parsed log record to its protocol handler.
pub fn demultiplex<F>(record: &DiagRecord<'_>, framer: &F) -> Result<Outcome, DiagError>
where
    F: Layer2Framer + ?Sized,
{
    if let RecordClass::Other(class) = record.class() {
        return Ok(Outcome::Skipped(SkipReason::ForeignClass(class)));
    }

    match record.protocol() {
        ProtocolId::UmtsRrc => umts::handle(record),
        ProtocolId::GsmRr => gsm::handle(record, framer),
        ProtocolId::GprsGmm => Ok(Outcome::Skipped(SkipReason::DuplicateGmm)),
        ProtocolId::Dtap => dtap::handle(record, framer),
        ProtocolId::Lte(channel) => Ok(lte::handle(record, channel)),
        ProtocolId::Unknown(id) => {
            log::debug!("Unknown protocol: {}", record);
            Ok(Outcome::Skipped(SkipReason::UnknownProtocol(id)))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
