//! Air-interface frame number derivation
//!
//! The chipset stamps every log record with a free-running clock. Downstream
//! consumers key GSM-family messages on the TDMA frame number instead, so the
//! timestamp is scaled down and wrapped at the hyperframe length.

/// TDMA frame number modulus (one GSM hyperframe: 2048 * 26 * 51 frames)
pub const FN_MAX: u32 = 2048 * 26 * 51;

/// Clock ticks per frame after the low 8 bits of the timestamp are dropped
const TICKS_PER_FRAME: u64 = 204_800;

/// Map a raw capture timestamp to a frame number in `[0, FN_MAX)`.
pub fn frame_number(timestamp: u64) -> u32 {
    (((timestamp >> 8) / TICKS_PER_FRAME) % FN_MAX as u64) as u32
}
