//! Layer 2 framing abstraction.
//!
//! Layer 3 messages taken from GSM RR and DTAP records have to be wrapped
//! into a LAPDm frame before consumers can treat them like captured air
//! traffic. The framing itself lives outside this crate; the decoder only
//! needs something implementing [`Layer2Framer`].
//!
//! Any `Fn(&[u8], bool, bool) -> Vec<u8>` closure is a framer, which keeps
//! test doubles short:
//!
//! ```rust
//! use bbdiag_core::Layer2Framer;
//!
//! let echo = |payload: &[u8], _uplink: bool, _sacch: bool| payload.to_vec();
//! assert_eq!(echo.frame(&[1, 2, 3], true, false), vec![1, 2, 3]);
//! ```

/// Wraps a layer 3 payload into a single layer 2 frame.
pub trait Layer2Framer {
    /// Frame `payload` for the given direction and channel.
    ///
    /// `sacch` selects the SACCH frame layout. An empty result means the
    /// payload could not be framed and no message should be produced. The
    /// returned buffer is owned by the caller and dropped once the message
    /// has been built from it.
    fn frame(&self, payload: &[u8], uplink: bool, sacch: bool) -> Vec<u8>;
}

impl<F> Layer2Framer for F
where
    F: Fn(&[u8], bool, bool) -> Vec<u8>,
{
    fn frame(&self, payload: &[u8], uplink: bool, sacch: bool) -> Vec<u8> {
        self(payload, uplink, sacch)
    }
}
