//! DTAP records (`0x713a`)
//!
//! GSM/UMTS NAS messages (mobility and call management). The subtype byte of
//! the header holds the message length, the message itself starts two bytes
//! into the payload. A non-zero message type marks an uplink message.

use crate::error::DiagError;
use crate::framing::Layer2Framer;
use crate::message::{ChannelKind, Direction, Domain, MessageMeta, RadioMessage, Rat};
use crate::record::{DiagRecord, CHECK_BYTES, DIAG_HEADER_SIZE};

use super::{Outcome, SkipReason};

/// Offset of the NAS message inside the payload
const NAS_MESSAGE_OFFSET: usize = 2;

pub(super) fn handle<F>(record: &DiagRecord<'_>, framer: &F) -> Result<Outcome, DiagError>
where
    F: Layer2Framer + ?Sized,
{
    let declared = record.message_subtype;
    if declared == 0 {
        log::trace!("Empty DTAP message: {}", record);
        return Ok(Outcome::Skipped(SkipReason::EmptyNasMessage));
    }

    let record_len = record.record_len();
    if declared as usize + DIAG_HEADER_SIZE + CHECK_BYTES > record_len {
        log::warn!(
            "DTAP length {} exceeds record of {} bytes: {}",
            declared,
            record_len,
            record
        );
        return Ok(Outcome::Skipped(SkipReason::NasLengthOutOfRange {
            declared,
            record_len,
        }));
    }

    let message = record.payload_region(NAS_MESSAGE_OFFSET, declared as usize)?;
    let meta = MessageMeta {
        rat: Rat::Gsm,
        domain: Domain::Cs,
        frame_number: record.frame_number(),
        direction: Direction::from_uplink(record.message_type != 0),
    };

    RadioMessage::new_l3(framer, message, meta, ChannelKind::Sdcch).map(Outcome::from_built)
}
