//! Normalized radio messages
//!
//! A [`RadioMessage`] is what the decoder hands to its consumer: the
//! air-interface payload plus the metadata (radio access technology,
//! channel, direction, frame number) needed to analyse it.
//!
//! Direction is carried the way consumers expect it, in the ARFCN slot:
//! uplink messages have [`ARFCN_UPLINK`] set, downlink messages carry the
//! downlink channel number (always 0 here, the log does not report it).

use std::fmt;

use bitflags::bitflags;
use serde::{Serialize, Serializer};

use crate::error::DiagError;
use crate::framing::Layer2Framer;

/// Capacity of the message payload buffer
pub const RADIO_MESSAGE_CAPACITY: usize = 256;

/// Flag bit in the ARFCN slot marking a message sent by the mobile
pub const ARFCN_UPLINK: u16 = 0x4000;

/// Channel number tags derived from the channel kind
pub mod chan_nr {
    /// SDCCH/4 sub-channel 0 (also used for its SACCH)
    pub const SDCCH: u8 = 0x41;
    /// TCH/F
    pub const FACCH: u8 = 0x08;
    /// BCCH
    pub const BCCH: u8 = 0x80;
}

/// Radio access technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rat {
    Gsm,
    Umts,
    Lte,
}

/// Core network domain of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Domain {
    /// Circuit switched
    #[default]
    Cs,
    /// Packet switched. Carried for consumers; no record decoded here is
    /// in this domain, GMM records are skipped.
    Ps,
}

/// Transmission direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Uplink,
    Downlink,
}

impl Direction {
    pub fn from_uplink(uplink: bool) -> Self {
        if uplink {
            Direction::Uplink
        } else {
            Direction::Downlink
        }
    }

    pub fn is_uplink(self) -> bool {
        self == Direction::Uplink
    }

    /// Value stored in the ARFCN slot for this direction
    pub fn arfcn(self) -> u16 {
        match self {
            Direction::Uplink => ARFCN_UPLINK,
            Direction::Downlink => 0,
        }
    }
}

bitflags! {
    /// Message flags as understood by downstream consumers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    #[serde(transparent)]
    pub struct MessageFlags: u8 {
        const SDCCH = 0x01;
        const SACCH = 0x02;
        const FACCH = 0x04;
        const BCCH = 0x08;
        /// Payload is a complete layer 2 frame
        const DECODED = 0x10;
    }
}

/// GSM logical channel a message was carried on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChannelKind {
    Sdcch,
    Sacch,
    Facch,
    Bcch,
    /// No channel information, payload is raw
    Undecoded,
}

impl ChannelKind {
    pub fn flag(self) -> MessageFlags {
        match self {
            ChannelKind::Sdcch => MessageFlags::SDCCH,
            ChannelKind::Sacch => MessageFlags::SACCH,
            ChannelKind::Facch => MessageFlags::FACCH,
            ChannelKind::Bcch => MessageFlags::BCCH,
            ChannelKind::Undecoded => MessageFlags::empty(),
        }
    }

    /// Channel number tag, 0 when the kind carries none
    pub fn chan_nr(self) -> u8 {
        match self {
            ChannelKind::Sdcch | ChannelKind::Sacch => chan_nr::SDCCH,
            ChannelKind::Facch => chan_nr::FACCH,
            ChannelKind::Bcch => chan_nr::BCCH,
            ChannelKind::Undecoded => 0,
        }
    }

    pub fn from_flags(flags: MessageFlags) -> Self {
        if flags.contains(MessageFlags::SDCCH) {
            ChannelKind::Sdcch
        } else if flags.contains(MessageFlags::SACCH) {
            ChannelKind::Sacch
        } else if flags.contains(MessageFlags::FACCH) {
            ChannelKind::Facch
        } else if flags.contains(MessageFlags::BCCH) {
            ChannelKind::Bcch
        } else {
            ChannelKind::Undecoded
        }
    }
}

/// Fixed capacity payload buffer
///
/// Holds at most `RADIO_MESSAGE_CAPACITY - 1` bytes; construction from a
/// longer slice fails with [`DiagError::PayloadTooLarge`].
#[derive(Clone)]
pub struct MessageBuffer {
    data: [u8; RADIO_MESSAGE_CAPACITY],
    len: usize,
}

impl MessageBuffer {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DiagError> {
        if bytes.len() >= RADIO_MESSAGE_CAPACITY {
            return Err(DiagError::PayloadTooLarge {
                len: bytes.len(),
                capacity: RADIO_MESSAGE_CAPACITY,
            });
        }
        let mut data = [0u8; RADIO_MESSAGE_CAPACITY];
        data[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            data,
            len: bytes.len(),
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl PartialEq for MessageBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for MessageBuffer {}

impl fmt::Debug for MessageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageBuffer({})", hex::encode(self.as_slice()))
    }
}

impl Serialize for MessageBuffer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(self.as_slice()))
    }
}

/// Metadata shared by all messages built from one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageMeta {
    pub rat: Rat,
    pub domain: Domain,
    pub frame_number: u32,
    pub direction: Direction,
}

/// A decoded air-interface message, ready for analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioMessage {
    pub rat: Rat,
    pub domain: Domain,
    pub flags: MessageFlags,
    pub chan_nr: u8,
    pub arfcn: u16,
    pub frame_number: u32,
    pub payload: MessageBuffer,
}

impl RadioMessage {
    /// Build a message from a complete layer 2 frame.
    pub fn new_l2(data: &[u8], meta: MessageMeta, channel: ChannelKind) -> Result<Self, DiagError> {
        let payload = MessageBuffer::from_slice(data)?;
        Ok(Self {
            rat: meta.rat,
            domain: meta.domain,
            flags: channel.flag() | MessageFlags::DECODED,
            chan_nr: channel.chan_nr(),
            arfcn: meta.direction.arfcn(),
            frame_number: meta.frame_number,
            payload,
        })
    }

    /// Build a message from a layer 3 payload, framing it through `framer`.
    ///
    /// Returns `Ok(None)` when there is nothing to frame or the framer
    /// produced no frame.
    pub fn new_l3<F>(
        framer: &F,
        data: &[u8],
        meta: MessageMeta,
        channel: ChannelKind,
    ) -> Result<Option<Self>, DiagError>
    where
        F: Layer2Framer + ?Sized,
    {
        if data.is_empty() {
            return Ok(None);
        }

        let sacch = channel == ChannelKind::Sacch;
        let frame = framer.frame(data, meta.direction.is_uplink(), sacch);
        if frame.is_empty() {
            return Ok(None);
        }

        Self::new_l2(&frame, meta, channel).map(Some)
    }

    /// Build a message whose payload is not a layer 2 frame.
    pub fn new_raw(data: &[u8], meta: MessageMeta) -> Result<Self, DiagError> {
        let payload = MessageBuffer::from_slice(data)?;
        Ok(Self {
            rat: meta.rat,
            domain: meta.domain,
            flags: MessageFlags::empty(),
            chan_nr: 0,
            arfcn: meta.direction.arfcn(),
            frame_number: meta.frame_number,
            payload,
        })
    }

    pub fn channel_kind(&self) -> ChannelKind {
        ChannelKind::from_flags(self.flags)
    }

    pub fn direction(&self) -> Direction {
        Direction::from_uplink(self.arfcn & ARFCN_UPLINK != 0)
    }

    pub fn is_decoded(&self) -> bool {
        self.flags.contains(MessageFlags::DECODED)
    }

    pub fn payload(&self) -> &[u8] {
        self.payload.as_slice()
    }
}
