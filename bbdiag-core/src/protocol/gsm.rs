//! GSM RR signalling records (`0x512f`)
//!
//! The message type byte names the logical channel and direction, the
//! subtype is the RR message type of the carried layer 3 message:
//!
//! | Type | Channel | Handling |
//! |------|---------|----------|
//! | 0 | SDCCH uplink | selected RR messages only, L3 |
//! | 4 | SACCH uplink | measurement reports only, L3 |
//! | 128 | SDCCH downlink | L3 |
//! | 129 | BCCH | L2, `payload_length` bytes |
//! | 131 | CCCH | L2 on BCCH, `payload_length` bytes |
//! | 132 | SACCH downlink | L3 |
//!
//! The uplink channels log many messages that are also reported through
//! DTAP records; only the ones listed in [`RrUplinkMessage`] are taken from
//! here. Everything else is logged and skipped.

use crate::error::DiagError;
use crate::framing::Layer2Framer;
use crate::message::{ChannelKind, Direction, Domain, MessageMeta, RadioMessage, Rat};
use crate::record::{DiagRecord, CHECK_BYTES, DIAG_HEADER_SIZE};

use super::{Outcome, SkipReason};

/// Channel/direction of a GSM RR record, from its message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RrMessageType {
    SdcchUplink,
    SacchUplink,
    SdcchDownlink,
    Bcch,
    Ccch,
    SacchDownlink,
    Unknown(u8),
}

impl RrMessageType {
    pub fn from_value(v: u8) -> Self {
        match v {
            0 => RrMessageType::SdcchUplink,
            4 => RrMessageType::SacchUplink,
            128 => RrMessageType::SdcchDownlink,
            129 => RrMessageType::Bcch,
            131 => RrMessageType::Ccch,
            132 => RrMessageType::SacchDownlink,
            _ => RrMessageType::Unknown(v),
        }
    }

    pub fn value(self) -> u8 {
        match self {
            RrMessageType::SdcchUplink => 0,
            RrMessageType::SacchUplink => 4,
            RrMessageType::SdcchDownlink => 128,
            RrMessageType::Bcch => 129,
            RrMessageType::Ccch => 131,
            RrMessageType::SacchDownlink => 132,
            RrMessageType::Unknown(v) => v,
        }
    }
}

/// Uplink RR messages taken from GSM RR records, by message subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RrUplinkMessage {
    MeasurementReport,
    ClassmarkChange,
    PagingResponse,
    AssignmentComplete,
    CipheringModeComplete,
    GprsSuspensionRequest,
    UtranClassmarkChange,
    Unknown(u8),
}

impl RrUplinkMessage {
    pub fn from_value(v: u8) -> Self {
        match v {
            21 => RrUplinkMessage::MeasurementReport,
            22 => RrUplinkMessage::ClassmarkChange,
            39 => RrUplinkMessage::PagingResponse,
            41 => RrUplinkMessage::AssignmentComplete,
            50 => RrUplinkMessage::CipheringModeComplete,
            52 => RrUplinkMessage::GprsSuspensionRequest,
            96 => RrUplinkMessage::UtranClassmarkChange,
            _ => RrUplinkMessage::Unknown(v),
        }
    }

    pub fn value(self) -> u8 {
        match self {
            RrUplinkMessage::MeasurementReport => 21,
            RrUplinkMessage::ClassmarkChange => 22,
            RrUplinkMessage::PagingResponse => 39,
            RrUplinkMessage::AssignmentComplete => 41,
            RrUplinkMessage::CipheringModeComplete => 50,
            RrUplinkMessage::GprsSuspensionRequest => 52,
            RrUplinkMessage::UtranClassmarkChange => 96,
            RrUplinkMessage::Unknown(v) => v,
        }
    }
}

/// What to build from a GSM RR record
enum RrAction {
    Layer3(ChannelKind, Direction),
    Layer2(ChannelKind),
    Skip,
}

fn classify(message_type: RrMessageType, subtype: RrUplinkMessage) -> RrAction {
    use RrUplinkMessage::*;

    match (message_type, subtype) {
        (
            RrMessageType::SdcchUplink,
            ClassmarkChange
            | PagingResponse
            | AssignmentComplete
            | CipheringModeComplete
            | GprsSuspensionRequest
            | UtranClassmarkChange,
        ) => RrAction::Layer3(ChannelKind::Sdcch, Direction::Uplink),
        (RrMessageType::SdcchUplink, _) => RrAction::Skip,
        (RrMessageType::SacchUplink, MeasurementReport) => {
            RrAction::Layer3(ChannelKind::Sacch, Direction::Uplink)
        }
        (RrMessageType::SacchUplink, _) => RrAction::Skip,
        (RrMessageType::SdcchDownlink, _) => {
            RrAction::Layer3(ChannelKind::Sdcch, Direction::Downlink)
        }
        (RrMessageType::Bcch | RrMessageType::Ccch, _) => RrAction::Layer2(ChannelKind::Bcch),
        (RrMessageType::SacchDownlink, _) => {
            RrAction::Layer3(ChannelKind::Sacch, Direction::Downlink)
        }
        (RrMessageType::Unknown(_), _) => RrAction::Skip,
    }
}

pub(super) fn handle<F>(record: &DiagRecord<'_>, framer: &F) -> Result<Outcome, DiagError>
where
    F: Layer2Framer + ?Sized,
{
    let action = classify(
        RrMessageType::from_value(record.message_type),
        RrUplinkMessage::from_value(record.message_subtype),
    );

    let meta = |direction| MessageMeta {
        rat: Rat::Gsm,
        domain: Domain::Cs,
        frame_number: record.frame_number(),
        direction,
    };

    match action {
        RrAction::Layer3(channel, direction) => {
            let dtap = record.payload_region(0, dtap_len(record)?)?;
            RadioMessage::new_l3(framer, dtap, meta(direction), channel).map(Outcome::from_built)
        }
        RrAction::Layer2(channel) => {
            let frame = record.payload_region(0, record.payload_length as usize)?;
            let message = RadioMessage::new_l2(frame, meta(Direction::Downlink), channel)?;
            Ok(Outcome::Message(Box::new(message)))
        }
        RrAction::Skip => {
            log::debug!("Unhandled GSM RR message: {}", record);
            Ok(Outcome::Skipped(SkipReason::UnhandledRrMessage {
                message_type: record.message_type,
                message_subtype: record.message_subtype,
            }))
        }
    }
}

/// Layer 3 length: everything between the header and the check bytes
fn dtap_len(record: &DiagRecord<'_>) -> Result<usize, DiagError> {
    record
        .record_len()
        .checked_sub(DIAG_HEADER_SIZE + CHECK_BYTES)
        .ok_or(DiagError::TruncatedRecord {
            expected: DIAG_HEADER_SIZE + CHECK_BYTES,
            actual: record.record_len(),
        })
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::{decode_record, PROTO_GSM_RR};
    use super::*;
    use crate::message::{chan_nr, MessageFlags, ARFCN_UPLINK, RADIO_MESSAGE_CAPACITY};

    const PAGING_RESPONSE: [u8; 6] = [0x06, 0x27, 0x07, 0x03, 0x50, 0x18];

    #[test]
    fn test_message_type_values() {
        for v in [0u8, 4, 128, 129, 131, 132, 7] {
            assert_eq!(RrMessageType::from_value(v).value(), v);
        }
        for v in [21u8, 22, 39, 41, 50, 52, 96, 99] {
            assert_eq!(RrUplinkMessage::from_value(v).value(), v);
        }
    }

    #[test]
    fn test_sdcch_uplink_promoted_subtypes() {
        for subtype in [22u8, 39, 41, 50, 52, 96] {
            let data = record(PROTO_GSM_RR, 0, subtype, 6, &PAGING_RESPONSE);
            let m = expect_message(decode_record(&data, &echo).unwrap());
            assert_eq!(m.rat, Rat::Gsm);
            assert_eq!(m.domain, Domain::Cs);
            assert_eq!(m.channel_kind(), ChannelKind::Sdcch);
            assert_eq!(m.direction(), Direction::Uplink);
            assert_eq!(m.arfcn, ARFCN_UPLINK);
            assert_eq!(m.chan_nr, chan_nr::SDCCH);
            assert_eq!(m.payload(), &PAGING_RESPONSE);
        }
    }

    #[test]
    fn test_sdcch_uplink_other_subtypes_dropped() {
        // 21 is a measurement report, only taken from SACCH
        for subtype in [0u8, 21, 23, 40, 99, 255] {
            let data = record(PROTO_GSM_RR, 0, subtype, 6, &PAGING_RESPONSE);
            assert_eq!(
                decode_record(&data, &echo).unwrap(),
                Outcome::Skipped(SkipReason::UnhandledRrMessage {
                    message_type: 0,
                    message_subtype: subtype
                })
            );
        }
    }

    #[test]
    fn test_sacch_uplink_measurement_report() {
        let report = [0x06, 0x15, 0x3e, 0x3e, 0x01, 0xc0];
        let data = record(PROTO_GSM_RR, 4, 21, 6, &report);
        let m = expect_message(decode_record(&data, &echo).unwrap());
        assert_eq!(m.channel_kind(), ChannelKind::Sacch);
        assert_eq!(m.direction(), Direction::Uplink);
        assert_eq!(m.chan_nr, chan_nr::SDCCH);

        for subtype in [22u8, 39, 0] {
            let data = record(PROTO_GSM_RR, 4, subtype, 6, &report);
            assert!(matches!(
                decode_record(&data, &echo).unwrap(),
                Outcome::Skipped(SkipReason::UnhandledRrMessage { .. })
            ));
        }
    }

    #[test]
    fn test_sdcch_downlink_any_subtype() {
        let payload = [0x01, 0x02, 0x03, 0x04];
        for subtype in [0u8, 0x35, 99] {
            let data = record(PROTO_GSM_RR, 128, subtype, 4, &payload);
            let m = expect_message(decode_record(&data, &echo).unwrap());
            assert_eq!(m.channel_kind(), ChannelKind::Sdcch);
            assert_eq!(m.direction(), Direction::Downlink);
            assert_eq!(m.arfcn, 0);
            assert_eq!(m.rat, Rat::Gsm);
            assert_eq!(m.domain, Domain::Cs);
            assert!(m.is_decoded());
            assert_eq!(m.payload(), &payload);
        }
    }

    #[test]
    fn test_sacch_downlink() {
        let data = record(PROTO_GSM_RR, 132, 0x1d, 3, &[0x06, 0x1d, 0x00]);
        let m = expect_message(decode_record(&data, &echo).unwrap());
        assert_eq!(m.channel_kind(), ChannelKind::Sacch);
        assert_eq!(m.direction(), Direction::Downlink);
    }

    #[test]
    fn test_sacch_hint_reaches_framer() {
        let framer = |data: &[u8], uplink: bool, sacch: bool| {
            assert!(sacch);
            assert!(!uplink);
            let mut out = vec![0x00, 0x00];
            out.extend_from_slice(data);
            out
        };
        let data = record(PROTO_GSM_RR, 132, 0x1d, 3, &[0x06, 0x1d, 0x00]);
        let m = expect_message(decode_record(&data, &framer).unwrap());
        assert_eq!(m.payload(), &[0x00, 0x00, 0x06, 0x1d, 0x00]);
    }

    #[test]
    fn test_bcch_and_ccch_are_layer2() {
        // payload_length covers the L2 frame, the rest is ignored
        let mut payload = vec![0x55; 23];
        payload.extend_from_slice(&[0xee, 0xee]);
        let never = |_: &[u8], _: bool, _: bool| -> Vec<u8> { panic!("BCCH must not be framed") };
        for message_type in [129u8, 131] {
            let data = record(PROTO_GSM_RR, message_type, 0x1b, 23, &payload);
            let m = expect_message(decode_record(&data, &never).unwrap());
            assert_eq!(m.channel_kind(), ChannelKind::Bcch);
            assert_eq!(m.flags, MessageFlags::BCCH | MessageFlags::DECODED);
            assert_eq!(m.chan_nr, chan_nr::BCCH);
            assert_eq!(m.direction(), Direction::Downlink);
            assert_eq!(m.payload(), &[0x55; 23]);
        }
    }

    #[test]
    fn test_bcch_length_past_record() {
        let data = record(PROTO_GSM_RR, 129, 0, 40, &[0x55; 23]);
        assert!(matches!(
            decode_record(&data, &echo).unwrap_err(),
            DiagError::TruncatedRecord { .. }
        ));
    }

    #[test]
    fn test_unknown_message_type() {
        for message_type in [1u8, 2, 3, 5, 127, 130, 133, 255] {
            let data = record(PROTO_GSM_RR, message_type, 22, 3, &[1, 2, 3]);
            assert_eq!(
                decode_record(&data, &echo).unwrap(),
                Outcome::Skipped(SkipReason::UnhandledRrMessage {
                    message_type,
                    message_subtype: 22
                })
            );
        }
    }

    #[test]
    fn test_empty_layer3_payload() {
        let data = record(PROTO_GSM_RR, 128, 0, 0, &[]);
        assert_eq!(
            decode_record(&data, &echo).unwrap(),
            Outcome::Skipped(SkipReason::NotFramed)
        );
    }

    #[test]
    fn test_missing_check_bytes() {
        let mut data = record(PROTO_GSM_RR, 128, 0, 0, &[]);
        data.truncate(DIAG_HEADER_SIZE + 1);
        assert_eq!(
            decode_record(&data, &echo).unwrap_err(),
            DiagError::TruncatedRecord {
                expected: 21,
                actual: 20
            }
        );
    }

    #[test]
    fn test_oversized_layer3_payload() {
        let payload = vec![0x2b; RADIO_MESSAGE_CAPACITY + 4];
        let data = record(PROTO_GSM_RR, 128, 0, 0, &payload);
        assert!(decode_record(&data, &echo).unwrap_err().is_oversized());
    }
}
