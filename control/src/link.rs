//! Serial framing for the gateway link
//!
//! The paddle node receives the joystick node's CAN traffic through a CAN-to-UART gateway.
//! Every [`Message`] travels postcard-encoded and COBS-stuffed, terminated by a single `0x00`
//! byte. A zero never occurs inside a stuffed message, so the receiver resynchronises on the
//! next delimiter after line noise or a lost byte.

use crate::command::Message;

/// End-of-message marker of the COBS framing
pub const DELIMITER: u8 = 0x00;

/// Receive and transmit buffer size, delimiter included
pub const MAX_ENCODED_LEN: usize = 16;

/// Framing errors
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// More bytes than [`MAX_ENCODED_LEN`] arrived before a delimiter
    Overflow,
    /// The bytes between two delimiters are not a valid message
    Codec(postcard::Error),
}

impl From<postcard::Error> for LinkError {
    fn from(e: postcard::Error) -> Self {
        LinkError::Codec(e)
    }
}

/// Encodes a message into `buf`, delimiter included, and returns the used part
pub fn encode<'a>(message: &Message, buf: &'a mut [u8]) -> Result<&'a mut [u8], LinkError> {
    Ok(postcard::to_slice_cobs(message, buf)?)
}

/// Accumulates received bytes until a delimiter completes a message
pub struct MessageDecoder {
    buf: [u8; MAX_ENCODED_LEN],
    filled: usize,
    overflowed: bool,
}

impl Default for MessageDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageDecoder {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_ENCODED_LEN],
            filled: 0,
            overflowed: false,
        }
    }

    /// Feeds one received byte
    ///
    /// Returns `Ok(Some(message))` when the byte is the delimiter of a valid message. Empty
    /// messages between consecutive delimiters are skipped.
    pub fn push_byte(&mut self, byte: u8) -> Result<Option<Message>, LinkError> {
        if byte != DELIMITER {
            if self.filled < MAX_ENCODED_LEN - 1 {
                self.buf[self.filled] = byte;
                self.filled += 1;
            } else {
                self.overflowed = true;
            }
            return Ok(None);
        }

        let filled = core::mem::take(&mut self.filled);
        if core::mem::take(&mut self.overflowed) {
            return Err(LinkError::Overflow);
        }
        if filled == 0 {
            return Ok(None);
        }

        self.buf[filled] = DELIMITER;
        let message: Message = postcard::from_bytes_cobs(&mut self.buf[..=filled])?;
        Ok(Some(match message {
            Message::Joystick(joystick) => Message::Joystick(joystick.normalized()),
            other => other,
        }))
    }

    /// Drops any partially received message
    pub fn reset(&mut self) {
        self.filled = 0;
        self.overflowed = false;
    }
}
