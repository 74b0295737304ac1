//! Diagnostic record parsing
//!
//! A record is one log entry emitted by the baseband chipset. It starts with
//! a fixed 19 byte header (all multi-byte fields little-endian, no padding):
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0x00    2B    record class (0x0010 for log records)
//! 0x02    2B    total length
//! 0x04    2B    inner length
//! 0x06    2B    protocol id (log code)
//! 0x08    8B    capture timestamp
//! 0x10    1B    message type
//! 0x11    1B    message subtype
//! 0x12    1B    payload length
//! 0x13    ..    payload
//! ```
//!
//! The record slice handed in by the caller still carries the two check
//! bytes of the transport framing, which some length calculations account
//! for.

use std::fmt;

use serde::Deserialize;

use crate::error::DiagError;
use crate::frame_number::frame_number;
use crate::protocol::ProtocolId;

/// Record class of log records; every other class is ignored
pub const RR_LOG_CLASS: u16 = 0x0010;

/// Trailing check bytes included in the caller's record length
pub const CHECK_BYTES: usize = 2;

/// Bytes of a record not counted by its length fields: class, total length
/// and the check bytes
const LENGTH_OVERHEAD: usize = 4 + CHECK_BYTES;

/// Fixed header as laid out on the wire
#[derive(Deserialize, Debug, Copy, Clone)]
#[repr(C, packed)]
struct DiagHeader {
    record_class: [u8; 2],
    total_length: [u8; 2],
    inner_length: [u8; 2],
    protocol_id: [u8; 2],
    timestamp: [u8; 8],
    message_type: u8,
    message_subtype: u8,
    payload_length: u8,
}

/// Header size in bytes
pub const DIAG_HEADER_SIZE: usize = std::mem::size_of::<DiagHeader>();

/// Top-level record category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordClass {
    /// Log record carrying an over-the-air message
    Log,
    /// Anything else the chipset emits (command responses, events, ...)
    Other(u16),
}

impl RecordClass {
    pub fn from_value(v: u16) -> Self {
        match v {
            RR_LOG_CLASS => RecordClass::Log,
            _ => RecordClass::Other(v),
        }
    }

    pub fn value(self) -> u16 {
        match self {
            RecordClass::Log => RR_LOG_CLASS,
            RecordClass::Other(v) => v,
        }
    }

    /// Read only the class field, without touching the rest of the record.
    pub fn peek(data: &[u8]) -> Result<Self, DiagError> {
        match data {
            [lo, hi, ..] => Ok(Self::from_value(u16::from_le_bytes([*lo, *hi]))),
            _ => Err(DiagError::TruncatedRecord {
                expected: 2,
                actual: data.len(),
            }),
        }
    }
}

/// Validated view of one diagnostic record, borrowed from the caller's buffer
#[derive(Debug, Clone, Copy)]
pub struct DiagRecord<'a> {
    pub record_class: u16,
    pub total_length: u16,
    pub inner_length: u16,
    pub protocol_id: u16,
    pub timestamp: u64,
    pub message_type: u8,
    pub message_subtype: u8,
    pub payload_length: u8,
    data: &'a [u8],
}

impl<'a> DiagRecord<'a> {
    /// Parse the fixed header of a record and check its length fields.
    ///
    /// `total_length` and `inner_length` count the bytes after the total
    /// length field, check bytes excluded, so a record is
    /// `length + 4 + CHECK_BYTES` bytes long. Neither
    /// may claim more than the slice holds, and `payload_length` must fit
    /// behind the header. Handler specific regions are still checked through
    /// [`DiagRecord::payload_region`].
    pub fn parse(data: &'a [u8]) -> Result<Self, DiagError> {
        let truncated = |expected| DiagError::TruncatedRecord {
            expected,
            actual: data.len(),
        };
        if data.len() < DIAG_HEADER_SIZE {
            return Err(truncated(DIAG_HEADER_SIZE));
        }

        let header: DiagHeader = bincode::deserialize(&data[..DIAG_HEADER_SIZE])
            .map_err(|_| truncated(DIAG_HEADER_SIZE))?;

        let total_length = u16::from_le_bytes(header.total_length);
        let inner_length = u16::from_le_bytes(header.inner_length);
        for length in [total_length, inner_length] {
            let declared = usize::from(length) + LENGTH_OVERHEAD;
            if declared > data.len() {
                return Err(truncated(declared));
            }
        }
        let payload_end = DIAG_HEADER_SIZE + usize::from(header.payload_length);
        if payload_end > data.len() {
            return Err(truncated(payload_end));
        }

        Ok(DiagRecord {
            record_class: u16::from_le_bytes(header.record_class),
            total_length,
            inner_length,
            protocol_id: u16::from_le_bytes(header.protocol_id),
            timestamp: u64::from_le_bytes(header.timestamp),
            message_type: header.message_type,
            message_subtype: header.message_subtype,
            payload_length: header.payload_length,
            data,
        })
    }

    pub fn class(&self) -> RecordClass {
        RecordClass::from_value(self.record_class)
    }

    pub fn protocol(&self) -> ProtocolId {
        ProtocolId::from_value(self.protocol_id)
    }

    pub fn frame_number(&self) -> u32 {
        frame_number(self.timestamp)
    }

    /// Length of the record as handed in by the caller, check bytes included
    pub fn record_len(&self) -> usize {
        self.data.len()
    }

    /// Everything after the fixed header
    pub fn payload(&self) -> &'a [u8] {
        &self.data[DIAG_HEADER_SIZE..]
    }

    /// `len` payload bytes starting `offset` bytes into the payload.
    pub fn payload_region(&self, offset: usize, len: usize) -> Result<&'a [u8], DiagError> {
        let payload = self.payload();
        let end = offset.checked_add(len).ok_or(DiagError::TruncatedRecord {
            expected: usize::MAX,
            actual: self.data.len(),
        })?;
        if end > payload.len() {
            return Err(DiagError::TruncatedRecord {
                expected: DIAG_HEADER_SIZE + end,
                actual: self.data.len(),
            });
        }
        Ok(&payload[offset..end])
    }
}

/// One-line summary used when logging records that are not turned into messages
impl fmt::Display for DiagRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = self.payload();
        let shown = &payload[..payload.len().saturating_sub(CHECK_BYTES)];
        write!(
            f,
            "{} [{:02}] {:04x}/{:03}/{:03} [{:03}] {}",
            self.frame_number(),
            self.total_length,
            self.protocol_id,
            self.message_type,
            self.message_subtype,
            self.payload_length,
            hex::encode(shown)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut data = vec![
            0x10, 0x00, // class
            0x14, 0x00, // total length = 20
            0x14, 0x00, // inner length
            0x2f, 0x51, // protocol 0x512f
            0x00, 0x00, 0x20, 0x03, 0x00, 0x00, 0x00, 0x00, // timestamp
            0x80, 0x15, 0x03, // type, subtype, payload length
        ];
        data.extend_from_slice(&[0x06, 0x21, 0x00, 0x01, 0xf0]);
        data.extend_from_slice(&[0xaa, 0xbb]);
        data
    }

    #[test]
    fn test_header_size() {
        assert_eq!(DIAG_HEADER_SIZE, 19);
    }

    #[test]
    fn test_parse_header_fields() {
        let data = sample();
        let record = DiagRecord::parse(&data).unwrap();
        assert_eq!(record.record_class, 0x0010);
        assert_eq!(record.class(), RecordClass::Log);
        assert_eq!(record.total_length, 20);
        assert_eq!(record.inner_length, 20);
        assert_eq!(record.protocol_id, 0x512f);
        assert_eq!(record.protocol(), ProtocolId::GsmRr);
        assert_eq!(record.timestamp, 0x0320_0000);
        assert_eq!(record.frame_number(), 1);
        assert_eq!(record.message_type, 0x80);
        assert_eq!(record.message_subtype, 0x15);
        assert_eq!(record.payload_length, 3);
        assert_eq!(record.record_len(), 26);
        assert_eq!(record.payload(), &[0x06, 0x21, 0x00, 0x01, 0xf0, 0xaa, 0xbb]);
    }

    #[test]
    fn test_parse_too_short() {
        let data = sample();
        for len in 0..DIAG_HEADER_SIZE {
            assert_eq!(
                DiagRecord::parse(&data[..len]).unwrap_err(),
                DiagError::TruncatedRecord {
                    expected: DIAG_HEADER_SIZE,
                    actual: len
                }
            );
        }
    }

    #[test]
    fn test_header_only_record() {
        let mut data = sample();
        data.truncate(DIAG_HEADER_SIZE);
        data[2..4].copy_from_slice(&13u16.to_le_bytes());
        data[4..6].copy_from_slice(&13u16.to_le_bytes());
        data[18] = 0;
        let record = DiagRecord::parse(&data).unwrap();
        assert!(record.payload().is_empty());
    }

    #[test]
    fn test_length_fields_past_record() {
        let data = sample();
        for (field, length) in [(2, 21u16), (2, 0xffff), (4, 21), (4, 0xffff)] {
            let mut data = data.clone();
            data[field..field + 2].copy_from_slice(&length.to_le_bytes());
            assert_eq!(
                DiagRecord::parse(&data).unwrap_err(),
                DiagError::TruncatedRecord {
                    expected: usize::from(length) + 6,
                    actual: 26
                },
                "length field at {}",
                field
            );
        }

        // Shorter lengths are accepted, the slice may carry more
        let mut data = data;
        data[2..4].copy_from_slice(&8u16.to_le_bytes());
        assert!(DiagRecord::parse(&data).is_ok());
    }

    #[test]
    fn test_payload_length_past_record() {
        let mut data = sample();
        data[18] = 7;
        assert!(DiagRecord::parse(&data).is_ok());
        data[18] = 8;
        assert_eq!(
            DiagRecord::parse(&data).unwrap_err(),
            DiagError::TruncatedRecord {
                expected: 27,
                actual: 26
            }
        );
        data[18] = 0xff;
        assert!(DiagRecord::parse(&data).is_err());
    }

    #[test]
    fn test_payload_region_bounds() {
        let data = sample();
        let record = DiagRecord::parse(&data).unwrap();
        assert_eq!(record.payload_region(1, 2).unwrap(), &[0x21, 0x00]);
        assert_eq!(record.payload_region(0, 7).unwrap().len(), 7);
        assert_eq!(
            record.payload_region(2, 6).unwrap_err(),
            DiagError::TruncatedRecord {
                expected: 27,
                actual: 26
            }
        );
        assert!(record.payload_region(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_peek_class() {
        assert_eq!(RecordClass::peek(&[0x10, 0x00]).unwrap(), RecordClass::Log);
        assert_eq!(
            RecordClass::peek(&[0x7d, 0x5d, 0x01]).unwrap(),
            RecordClass::Other(0x5d7d)
        );
        assert!(RecordClass::peek(&[0x10]).is_err());
        assert!(RecordClass::peek(&[]).is_err());
        assert_eq!(RecordClass::Other(0x0b).value(), 0x0b);
        assert_eq!(RecordClass::Log.value(), RR_LOG_CLASS);
    }

    #[test]
    fn test_display_summary() {
        let data = sample();
        let record = DiagRecord::parse(&data).unwrap();
        assert_eq!(
            record.to_string(),
            "1 [20] 512f/128/021 [003] 06210001f0"
        );
    }
}
