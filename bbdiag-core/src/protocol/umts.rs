//! UMTS RRC signalling records (`0x412f`)
//!
//! The payload starts with one byte the chipset uses as a type discriminant,
//! followed by the RRC message. The message type byte of the header is the
//! logical channel type, which tells the direction.

use crate::error::DiagError;
use crate::message::{Direction, Domain, MessageMeta, RadioMessage, Rat, RADIO_MESSAGE_CAPACITY};
use crate::record::DiagRecord;

use super::{Outcome, SkipReason};

/// Header bytes after the length field plus the payload discriminant byte
const RRC_OVERHEAD: usize = 16;

/// Offset of the RRC message inside the payload
const RRC_MESSAGE_OFFSET: usize = 1;

/// RRC logical channel direction, from the record's message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RrcDirection {
    Uplink,
    Downlink,
    Unknown(u8),
}

impl RrcDirection {
    pub fn from_value(v: u8) -> Self {
        match v {
            1 => RrcDirection::Uplink,
            3 => RrcDirection::Downlink,
            _ => RrcDirection::Unknown(v),
        }
    }

    pub fn value(self) -> u8 {
        match self {
            RrcDirection::Uplink => 1,
            RrcDirection::Downlink => 3,
            RrcDirection::Unknown(v) => v,
        }
    }
}

pub(super) fn handle(record: &DiagRecord<'_>) -> Result<Outcome, DiagError> {
    let total_length = record.total_length as usize;
    let payload_len = total_length
        .checked_sub(RRC_OVERHEAD)
        .ok_or(DiagError::TruncatedRecord {
            expected: RRC_OVERHEAD,
            actual: total_length,
        })?;

    if payload_len >= RADIO_MESSAGE_CAPACITY {
        return Err(DiagError::PayloadTooLarge {
            len: payload_len,
            capacity: RADIO_MESSAGE_CAPACITY,
        });
    }

    let direction = match RrcDirection::from_value(record.message_type) {
        RrcDirection::Uplink => Direction::Uplink,
        RrcDirection::Downlink => Direction::Downlink,
        RrcDirection::Unknown(v) => {
            log::trace!("RRC channel type {} dropped: {}", v, record);
            return Ok(Outcome::Skipped(SkipReason::UnknownRrcDirection(v)));
        }
    };

    let message = record.payload_region(RRC_MESSAGE_OFFSET, payload_len)?;
    let meta = MessageMeta {
        rat: Rat::Umts,
        domain: Domain::Cs,
        frame_number: record.frame_number(),
        direction,
    };

    Ok(Outcome::Message(Box::new(RadioMessage::new_raw(message, meta)?)))
}
