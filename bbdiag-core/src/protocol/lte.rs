//! LTE records (`0xb0c0`, `0xb0ec`, `0xb0ed`)
//!
//! LTE RRC and NAS decoding is not implemented. Records are recognized so
//! they are reported as unsupported rather than unknown, with the direction
//! hint the record carries.

use crate::record::DiagRecord;

use super::{Outcome, SkipReason, PROTO_LTE_NAS_EMM_DL, PROTO_LTE_NAS_EMM_UL, PROTO_LTE_RRC};

/// LTE log channel, one per protocol id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LteChannel {
    /// RRC over the air, direction in the first payload byte
    Rrc,
    NasEmmDownlink,
    NasEmmUplink,
}

impl LteChannel {
    pub fn value(self) -> u16 {
        match self {
            LteChannel::Rrc => PROTO_LTE_RRC,
            LteChannel::NasEmmDownlink => PROTO_LTE_NAS_EMM_DL,
            LteChannel::NasEmmUplink => PROTO_LTE_NAS_EMM_UL,
        }
    }

    fn uplink_hint(self, record: &DiagRecord<'_>) -> Option<bool> {
        match self {
            LteChannel::Rrc => record.payload().first().map(|b| *b != 0),
            LteChannel::NasEmmDownlink => Some(false),
            LteChannel::NasEmmUplink => Some(true),
        }
    }
}

pub(super) fn handle(record: &DiagRecord<'_>, channel: LteChannel) -> Outcome {
    let uplink = channel.uplink_hint(record);
    log::trace!("{:?} (uplink {:?}) not supported: {}", channel, uplink, record);
    Outcome::Skipped(SkipReason::LteNotSupported { channel, uplink })
}
