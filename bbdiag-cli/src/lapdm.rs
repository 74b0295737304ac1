//! LAPDm framing for layer 3 messages.
//!
//! Builds a single unnumbered information frame on SAPI 0, the way the
//! network and the mobile exchange signalling on SDCCH and SACCH. Payloads
//! that need more than one frame are not segmented; the framer returns no
//! frame for them.

use bbdiag_core::Layer2Framer;

/// Length of a LAPDm frame on a dedicated channel, SACCH L1 header included
pub const LAPDM_FRAME_LEN: usize = 23;

/// SACCH frames start with the timing advance and power level octets
const SACCH_L1_HEADER_LEN: usize = 2;

/// Address, control and length octets
const LAPDM_HEADER_LEN: usize = 3;

/// SAPI 0, C/R 0, EA 1
const ADDRESS_UPLINK: u8 = 0x01;
/// SAPI 0, C/R 1, EA 1
const ADDRESS_DOWNLINK: u8 = 0x03;
/// UI frame, P/F 0
const CONTROL_UI: u8 = 0x03;
const FILL_OCTET: u8 = 0x2b;

#[derive(Debug, Clone, Copy, Default)]
pub struct LapdmFramer;

impl LapdmFramer {
    /// Largest layer 3 payload a single frame carries
    pub fn max_payload(sacch: bool) -> usize {
        LAPDM_FRAME_LEN - LAPDM_HEADER_LEN - l1_header_len(sacch)
    }
}

fn l1_header_len(sacch: bool) -> usize {
    if sacch {
        SACCH_L1_HEADER_LEN
    } else {
        0
    }
}

impl Layer2Framer for LapdmFramer {
    fn frame(&self, payload: &[u8], uplink: bool, sacch: bool) -> Vec<u8> {
        if payload.is_empty() || payload.len() > Self::max_payload(sacch) {
            log::debug!(
                "{} byte message needs segmentation, not framed",
                payload.len()
            );
            return Vec::new();
        }

        let mut frame = vec![0u8; l1_header_len(sacch)];
        frame.reserve(LAPDM_FRAME_LEN - frame.len());
        frame.push(if uplink {
            ADDRESS_UPLINK
        } else {
            ADDRESS_DOWNLINK
        });
        frame.push(CONTROL_UI);
        // length indicator, M 0, EL 1
        frame.push(((payload.len() as u8) << 2) | 0x01);
        frame.extend_from_slice(payload);
        frame.resize(LAPDM_FRAME_LEN, FILL_OCTET);
        frame
    }
}
